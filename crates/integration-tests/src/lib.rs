//! Integration tests for user-apis.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process server on the memory store
//! cargo test -p user-apis-integration-tests
//!
//! # Also the PostgreSQL store tests (requires a migrated database)
//! API_DATABASE_URL=postgres://... cargo test -p user-apis-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `users_api` - User registration, login and directory over HTTP
//! - `admin_api` - Admin signup and login over HTTP
//! - `postgres_store` - `PgAccountStore` against a real database

use std::net::SocketAddr;
use std::sync::Arc;

use argon2::Params;
use reqwest::Client;
use secrecy::SecretString;
use serde_json::Value;

use user_apis_server::config::{Environment, JwtConfig, LogFormat, ServerConfig};
use user_apis_server::db::{AccountStore, MemoryAccountStore};
use user_apis_server::routes;
use user_apis_server::services::auth::PasswordCodec;
use user_apis_server::state::AppState;

/// Signing secret shared by test servers.
pub const TEST_JWT_SECRET: &str = "k3Jd9!qPz7@vLm2#xR5$wT8^nB4&cY6*";

/// A server running in-process on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub state: AppState,
    pub store: Arc<MemoryAccountStore>,
}

impl TestServer {
    /// Spawn a production-mode server backed by a fresh memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with(Environment::Production).await
    }

    /// Spawn a server in the given environment.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind.
    pub async fn spawn_with(environment: Environment) -> Self {
        let store = Arc::new(MemoryAccountStore::new());
        let dyn_store: Arc<dyn AccountStore> = store.clone();
        let state = AppState::with_codec(test_config(environment), dyn_store, cheap_codec());

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = routes::router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
            state,
            store,
        }
    }

    /// Absolute URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and return status plus raw body text.
    ///
    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn post(&self, path: &str, body: &Value) -> (reqwest::StatusCode, String) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed");
        let status = response.status();
        (status, response.text().await.expect("Failed to read body"))
    }

    /// GET a path and return status plus parsed JSON body.
    ///
    /// # Panics
    ///
    /// Panics on transport errors or a non-JSON body.
    pub async fn get(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        let status = response.status();
        (status, response.json().await.expect("Body is not JSON"))
    }
}

/// Server configuration for tests. The database URL is never used.
#[must_use]
pub fn test_config(environment: Environment) -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://unused"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        jwt: JwtConfig {
            secret: SecretString::from(TEST_JWT_SECRET),
            expiry_hours: 24,
        },
        environment,
        log_format: LogFormat::Pretty,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Argon2id codec with minimal cost, for fast tests.
///
/// # Panics
///
/// Never in practice; the parameters are valid.
#[must_use]
pub fn cheap_codec() -> PasswordCodec {
    PasswordCodec::new(Params::new(1024, 1, 1, None).expect("Valid Argon2 params"))
}
