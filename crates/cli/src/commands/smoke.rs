//! End-to-end smoke checks against a running server.
//!
//! # Usage
//!
//! ```bash
//! # Built-in checks with a freshly generated user
//! ua-cli smoke --base-url http://localhost:3000
//!
//! # Also register fixture users and replay fixture validation cases
//! ua-cli smoke --data crates/cli/fixtures/smoke-data.json
//! ```
//!
//! Every check runs even if an earlier one fails; the command fails if any
//! check did.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use url::Url;

/// Errors that can occur during smoke checks.
#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("Could not read fixture {0}: {1}")]
    Fixture(String, std::io::Error),

    #[error("Invalid fixture: {0}")]
    FixtureFormat(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed token: {0}")]
    Token(&'static str),

    #[error("{failed} of {total} checks failed")]
    ChecksFailed { failed: usize, total: usize },
}

/// Fixture file shape.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SmokeData {
    /// Registration bodies that should succeed (or already exist).
    pub sample_test_users: Vec<Value>,
    pub user_registration: RegistrationExamples,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationExamples {
    /// Registration bodies that must be rejected with 400.
    pub validation_error_examples: Vec<ValidationExample>,
}

#[derive(Debug, Deserialize)]
pub struct ValidationExample {
    pub description: String,
    pub request_body: Value,
}

impl SmokeData {
    /// Load a fixture file.
    ///
    /// # Errors
    ///
    /// Returns `SmokeError` if the file is unreadable or not valid fixture JSON.
    pub fn load(path: &Path) -> Result<Self, SmokeError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SmokeError::Fixture(path.display().to_string(), e))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Decode the (unverified) claims segment of a JWT.
///
/// # Errors
///
/// Returns `SmokeError::Token` if the token does not have three segments or
/// the payload is not base64url JSON.
pub fn decode_token_payload(token: &str) -> Result<Value, SmokeError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(SmokeError::Token("expected three segments")),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| SmokeError::Token("payload is not base64url"))?;
    serde_json::from_slice(&bytes).map_err(|_| SmokeError::Token("payload is not JSON"))
}

struct Smoke {
    client: Client,
    base: String,
    passed: usize,
    failed: Vec<String>,
}

impl Smoke {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn check(&mut self, name: &str, ok: bool, detail: &str) {
        if ok {
            self.passed += 1;
            tracing::info!("PASS {name}");
        } else {
            tracing::warn!("FAIL {name}: {detail}");
            self.failed.push(name.to_owned());
        }
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, Value), SmokeError> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        Ok((status, response.json().await.unwrap_or(Value::Null)))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<(StatusCode, String), SmokeError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        Ok((status, response.text().await?))
    }
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or(Value::Null)
}

/// Run the smoke checks.
///
/// # Errors
///
/// Returns `SmokeError::ChecksFailed` if any check failed, or a transport or
/// fixture error that prevented the checks from running.
pub async fn run(base_url: &Url, data: Option<&Path>) -> Result<(), SmokeError> {
    let fixture = data.map(SmokeData::load).transpose()?;

    let mut smoke = Smoke {
        client: Client::new(),
        base: base_url.as_str().trim_end_matches('/').to_owned(),
        passed: 0,
        failed: Vec::new(),
    };
    tracing::info!("Smoke testing {}", smoke.base);

    // Health
    let (status, body) = smoke.get("/health").await?;
    smoke.check(
        "health",
        status == StatusCode::OK && body["success"] == true,
        &format!("status {status}"),
    );

    // Register a fresh user
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let tag = tag.get(..8).unwrap_or("smoke");
    let email = format!("smoke_{tag}@example.com");
    let password = "Password123";
    let registration = json!({
        "fullName": "Smoke Test",
        "username": format!("smoke_{tag}"),
        "email": email.to_uppercase(),
        "password": password,
    });

    let (status, raw) = smoke.post("/api/users/register", &registration).await?;
    let body = parse(&raw);
    smoke.check(
        "register",
        status == StatusCode::CREATED,
        &format!("status {status}: {raw}"),
    );
    let user_id = body["data"]["user"]["id"].as_i64();

    match body["data"]["token"].as_str().map(decode_token_payload) {
        Some(Ok(claims)) => smoke.check(
            "token payload",
            claims["email"] == email.as_str() && claims["role"] == "user",
            &format!("claims {claims}"),
        ),
        Some(Err(e)) => smoke.check("token payload", false, &e.to_string()),
        None => smoke.check("token payload", false, "no token in response"),
    }

    let (status, _) = smoke.post("/api/users/register", &registration).await?;
    smoke.check(
        "duplicate registration",
        status == StatusCode::CONFLICT,
        &format!("status {status}"),
    );

    // Login
    let (status, _) = smoke
        .post(
            "/api/users/login",
            &json!({"email": email, "password": password}),
        )
        .await?;
    smoke.check("login", status == StatusCode::OK, &format!("status {status}"));

    let (wrong_status, wrong_body) = smoke
        .post(
            "/api/users/login",
            &json!({"email": email, "password": "Wrong12345"}),
        )
        .await?;
    let (unknown_status, unknown_body) = smoke
        .post(
            "/api/users/login",
            &json!({"email": format!("missing_{tag}@example.com"), "password": "Wrong12345"}),
        )
        .await?;
    smoke.check(
        "login failures indistinguishable",
        wrong_status == StatusCode::UNAUTHORIZED
            && unknown_status == StatusCode::UNAUTHORIZED
            && wrong_body == unknown_body,
        &format!("{wrong_status} {wrong_body} vs {unknown_status} {unknown_body}"),
    );

    // Directory
    let (status, body) = smoke.get("/api/users").await?;
    smoke.check(
        "list users",
        status == StatusCode::OK && body["count"].as_u64().is_some_and(|n| n >= 1),
        &format!("status {status}"),
    );

    if let Some(id) = user_id {
        let (status, body) = smoke.get(&format!("/api/users/{id}")).await?;
        smoke.check(
            "get user",
            status == StatusCode::OK && body["data"]["email"] == email.as_str(),
            &format!("status {status}"),
        );
    }

    let (status, _) = smoke.get("/api/users/not-an-id").await?;
    smoke.check(
        "malformed user id",
        status == StatusCode::BAD_REQUEST,
        &format!("status {status}"),
    );

    // Validation
    let (status, raw) = smoke
        .post(
            "/api/users/register",
            &json!({"fullName": "T", "username": "a-", "email": "invalid-email", "password": "weak"}),
        )
        .await?;
    let body = parse(&raw);
    smoke.check(
        "validation errors",
        status == StatusCode::BAD_REQUEST
            && body["errors"].as_array().is_some_and(|e| e.len() >= 4),
        &format!("status {status}: {raw}"),
    );

    if let Some(fixture) = fixture {
        run_fixture(&mut smoke, &fixture).await?;
    }

    let total = smoke.passed + smoke.failed.len();
    if smoke.failed.is_empty() {
        tracing::info!("All {total} smoke checks passed");
        Ok(())
    } else {
        Err(SmokeError::ChecksFailed {
            failed: smoke.failed.len(),
            total,
        })
    }
}

async fn run_fixture(smoke: &mut Smoke, fixture: &SmokeData) -> Result<(), SmokeError> {
    for (i, user) in fixture.sample_test_users.iter().enumerate() {
        let (status, raw) = smoke.post("/api/users/register", user).await?;
        if status == StatusCode::CONFLICT {
            tracing::info!("Sample user {} already exists", i + 1);
        }
        smoke.check(
            &format!("sample user {}", i + 1),
            status == StatusCode::CREATED || status == StatusCode::CONFLICT,
            &format!("status {status}: {raw}"),
        );
    }

    for example in &fixture.user_registration.validation_error_examples {
        let (status, _) = smoke
            .post("/api/users/register", &example.request_body)
            .await?;
        smoke.check(
            &format!("rejects: {}", example.description),
            status == StatusCode::BAD_REQUEST,
            &format!("status {status}"),
        );
    }

    Ok(())
}
