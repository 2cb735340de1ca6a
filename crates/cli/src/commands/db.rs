//! Database connectivity diagnostics.
//!
//! # Usage
//!
//! ```bash
//! ua-cli db check
//! ```
//!
//! Connects once, reports the server version and database name, then
//! writes, reads and deletes a row in a session-scoped temporary table.
//! Nothing persistent is touched.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::{Connection, PgConnection};
use thiserror::Error;
use url::Url;

use user_apis_server::config;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur during the check.
#[derive(Debug, Error)]
pub enum DbCheckError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Connection timed out after {}s", CONNECT_TIMEOUT.as_secs())]
    Timeout,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Round trip mismatch: {0}")]
    RoundTrip(&'static str),
}

/// Run the connectivity check.
///
/// # Errors
///
/// Returns `DbCheckError` on the first failing step. Troubleshooting hints
/// are logged before returning.
pub async fn check() -> Result<(), DbCheckError> {
    dotenvy::dotenv().ok();
    let database_url = config::database_url()
        .map_err(|_| DbCheckError::MissingEnvVar("API_DATABASE_URL"))?;

    tracing::info!(
        "Connection string: {}",
        mask_credentials(database_url.expose_secret())
    );

    let result = run_checks(database_url.expose_secret()).await;

    if let Err(e) = &result {
        tracing::error!("Database check failed: {e}");
        tracing::info!("Troubleshooting tips:");
        for (i, hint) in troubleshooting_hints(e).iter().enumerate() {
            tracing::info!("  {}. {}", i + 1, hint);
        }
    }

    result
}

async fn run_checks(url: &str) -> Result<(), DbCheckError> {
    let mut conn = tokio::time::timeout(CONNECT_TIMEOUT, PgConnection::connect(url))
        .await
        .map_err(|_| DbCheckError::Timeout)??;

    let (version, database): (String, String) =
        sqlx::query_as("SELECT current_setting('server_version'), current_database()")
            .fetch_one(&mut conn)
            .await?;
    tracing::info!("Connected: PostgreSQL {version}, database {database}");

    sqlx::query("CREATE TEMP TABLE ua_connection_probe (id SERIAL PRIMARY KEY, note TEXT NOT NULL)")
        .execute(&mut conn)
        .await?;

    let id: i32 =
        sqlx::query_scalar("INSERT INTO ua_connection_probe (note) VALUES ($1) RETURNING id")
            .bind("probe")
            .fetch_one(&mut conn)
            .await?;
    tracing::info!("Write operation successful");

    let note: Option<String> =
        sqlx::query_scalar("SELECT note FROM ua_connection_probe WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut conn)
            .await?;
    if note.as_deref() != Some("probe") {
        return Err(DbCheckError::RoundTrip("read back a different row"));
    }
    tracing::info!("Read operation successful");

    let deleted = sqlx::query("DELETE FROM ua_connection_probe WHERE id = $1")
        .bind(id)
        .execute(&mut conn)
        .await?
        .rows_affected();
    if deleted != 1 {
        return Err(DbCheckError::RoundTrip("delete affected no rows"));
    }
    tracing::info!("Delete operation successful");

    conn.close().await?;
    tracing::info!("All database checks passed");
    Ok(())
}

/// Replace user and password in a connection URL with `***`.
#[must_use]
pub fn mask_credentials(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return "<unparseable connection string>".to_owned();
    };

    if !url.username().is_empty() {
        let _ = url.set_username("***");
    }
    if url.password().is_some() {
        let _ = url.set_password(Some("***"));
    }
    url.to_string()
}

/// Hints for a failed check, most specific first.
#[must_use]
pub fn troubleshooting_hints(err: &DbCheckError) -> Vec<&'static str> {
    let mut hints = Vec::new();

    match err {
        DbCheckError::MissingEnvVar(_) => {
            hints.push("Set API_DATABASE_URL (or DATABASE_URL) in your environment or .env file");
        }
        DbCheckError::Timeout => {
            hints.push("Timeout: check network connectivity and that the server is reachable");
        }
        DbCheckError::Database(sqlx::Error::Database(db)) => match db.code().as_deref() {
            Some("28P01" | "28000") => {
                hints.push("Authentication failed: check the username and password in the URL");
            }
            Some("3D000") => {
                hints.push("Database does not exist: create it or fix the database name");
            }
            _ => {}
        },
        DbCheckError::Database(sqlx::Error::Io(_) | sqlx::Error::Tls(_)) => {
            hints.push("Network error: check host, port and firewall/allow-list rules");
        }
        DbCheckError::Database(_) | DbCheckError::RoundTrip(_) => {}
    }

    hints.extend([
        "Verify the PostgreSQL server is running",
        "Check the host and port in the connection string",
        "Check the username and password in the connection string",
        "Verify network connectivity to the database host",
    ]);
    hints
}
