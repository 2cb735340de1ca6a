//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (store ping)
//!
//! # Users
//! POST /api/users/register     - Register a user
//! POST /api/users/login        - Login as a user
//! GET  /api/users              - List users
//! GET  /api/users/{id}         - Get a user
//!
//! # Admin
//! POST /admin/signup           - Register an admin
//! POST /admin/login            - Login as an admin
//! ```

pub mod admin;
pub mod extract;
pub mod health;
pub mod users;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{expose_error_detail, request_id_middleware};
use crate::models::{Admin, User};
use crate::state::AppState;

// =============================================================================
// Response envelopes
// =============================================================================

/// `{success, message?, data}` envelope for a single result.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    #[must_use]
    pub const fn with_message(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message),
            data,
        }
    }
}

/// `{success, count, data}` envelope for a collection.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    #[must_use]
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// `{success, message}` body with no payload.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: &'static str,
}

impl StatusResponse {
    #[must_use]
    pub const fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }

    #[must_use]
    pub const fn failed(message: &'static str) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserSession {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AdminSession {
    pub admin: Admin,
    pub token: String,
}

// =============================================================================
// Router
// =============================================================================

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(users::list))
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/users/{id}", get(users::get))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/signup", post(admin::signup))
        .route("/admin/login", post(admin::login))
}

/// Build the full application router with its middleware stack.
///
/// Sentry layers are added by the binary on top of this.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(user_routes())
        .merge(admin_routes())
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            expose_error_detail,
        ))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

async fn not_found() -> (StatusCode, Json<StatusResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(StatusResponse::failed("Route not found")),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, Bytes, to_bytes};
    use axum::http::{HeaderMap, Method, Request, header};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Environment, JwtConfig, LogFormat, ServerConfig};
    use crate::db::{AccountStore, MemoryAccountStore};
    use crate::middleware::REQUEST_ID_HEADER;
    use crate::services::auth::password::tests::cheap_codec;

    struct TestApp {
        router: Router,
        state: AppState,
        store: Arc<MemoryAccountStore>,
    }

    fn test_app(environment: Environment) -> TestApp {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://unused"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            jwt: JwtConfig {
                secret: SecretString::from("k3Jd9!qPz7@vLm2#xR5$wT8^nB4&cY6*"),
                expiry_hours: 24,
            },
            environment,
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
            sentry_environment: None,
        };
        let store = Arc::new(MemoryAccountStore::new());
        let state = AppState::with_codec(config, store.clone(), cheap_codec());

        TestApp {
            router: router(state.clone()),
            state,
            store,
        }
    }

    impl TestApp {
        async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Reply {
            let builder = Request::builder().method(method).uri(uri);
            let request = match body {
                Some(json) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string())),
                None => builder.body(Body::empty()),
            }
            .unwrap();

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            Reply {
                status,
                headers,
                bytes,
            }
        }

        async fn register(&self, email: &str, username: &str) -> Reply {
            self.send(
                Method::POST,
                "/api/users/register",
                Some(json!({
                    "fullName": "Test User",
                    "username": username,
                    "email": email,
                    "password": "Password123"
                })),
            )
            .await
        }
    }

    struct Reply {
        status: StatusCode,
        headers: HeaderMap,
        bytes: Bytes,
    }

    impl Reply {
        fn json(&self) -> Value {
            serde_json::from_slice(&self.bytes).unwrap()
        }
    }

    #[tokio::test]
    async fn test_register_then_duplicate() {
        let app = test_app(Environment::Production);

        let reply = app.register("a@x.com", "alice").await;
        assert_eq!(reply.status, StatusCode::CREATED);
        let body = reply.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["data"]["user"]["email"], "a@x.com");
        assert!(body["data"]["user"].get("passwordHash").is_none());

        let claims = app
            .state
            .tokens()
            .verify(body["data"]["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role.as_str(), "user");

        let again = app.register("a@x.com", "alice2").await;
        assert_eq!(again.status, StatusCode::CONFLICT);
        assert_eq!(
            again.json()["message"],
            "User already exists with this email or username"
        );
        assert_eq!(app.store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_normalizes_email() {
        let app = test_app(Environment::Production);
        let reply = app.register("  Mixed@Example.COM ", "mixed").await;
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.json()["data"]["user"]["email"], "mixed@example.com");
    }

    #[tokio::test]
    async fn test_register_reports_all_violations() {
        let app = test_app(Environment::Production);
        let reply = app
            .send(
                Method::POST,
                "/api/users/register",
                Some(json!({
                    "fullName": "T",
                    "username": "a-",
                    "email": "invalid-email",
                    "password": "weak"
                })),
            )
            .await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        let body = reply.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_failure() {
        let app = test_app(Environment::Production);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/users/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Validation failed");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let app = test_app(Environment::Production);
        app.register("a@x.com", "alice").await;

        let wrong_password = app
            .send(
                Method::POST,
                "/api/users/login",
                Some(json!({"email": "a@x.com", "password": "whatever"})),
            )
            .await;
        let unknown_email = app
            .send(
                Method::POST,
                "/api/users/login",
                Some(json!({"email": "missing@x.com", "password": "whatever"})),
            )
            .await;

        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.bytes, unknown_email.bytes);
        assert_eq!(unknown_email.json()["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_login_success() {
        let app = test_app(Environment::Production);
        app.register("a@x.com", "alice").await;

        let reply = app
            .send(
                Method::POST,
                "/api/users/login",
                Some(json!({"email": "A@X.com", "password": "Password123"})),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        let body = reply.json();
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["data"]["user"]["username"], "alice");
        assert!(body["data"]["token"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_list_and_get_users() {
        let app = test_app(Environment::Production);
        app.register("a@x.com", "alice").await;
        app.register("b@x.com", "bob").await;

        let list = app.send(Method::GET, "/api/users", None).await;
        assert_eq!(list.status, StatusCode::OK);
        let body = list.json();
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["username"], "alice");
        assert_eq!(body["data"][1]["username"], "bob");

        let id = body["data"][1]["id"].as_i64().unwrap();
        let one = app.send(Method::GET, &format!("/api/users/{id}"), None).await;
        assert_eq!(one.status, StatusCode::OK);
        assert_eq!(one.json()["data"]["email"], "b@x.com");

        let missing = app.send(Method::GET, "/api/users/9999", None).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.json()["message"], "User not found");

        let malformed = app.send(Method::GET, "/api/users/not-an-id", None).await;
        assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
        assert_eq!(malformed.json()["message"], "Invalid user ID");
    }

    #[tokio::test]
    async fn test_admin_signup_and_login() {
        let app = test_app(Environment::Production);
        let credentials = json!({"email": "root@x.com", "password": "Password123"});

        let signup = app
            .send(Method::POST, "/admin/signup", Some(credentials.clone()))
            .await;
        assert_eq!(signup.status, StatusCode::CREATED);
        let body = signup.json();
        assert_eq!(body["data"]["admin"]["email"], "root@x.com");
        assert_eq!(body["data"]["admin"]["isActive"], true);

        let claims = app
            .state
            .tokens()
            .verify(body["data"]["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.role.as_str(), "admin");
        assert!(claims.extra.is_empty());

        let again = app
            .send(Method::POST, "/admin/signup", Some(credentials.clone()))
            .await;
        assert_eq!(again.status, StatusCode::CONFLICT);
        assert_eq!(again.json()["message"], "Admin already exists with this email");

        let login = app
            .send(Method::POST, "/admin/login", Some(credentials))
            .await;
        assert_eq!(login.status, StatusCode::OK);
        assert_eq!(login.json()["message"], "Admin login successful");
    }

    #[tokio::test]
    async fn test_admin_cannot_login_as_user() {
        let app = test_app(Environment::Production);
        let credentials = json!({"email": "root@x.com", "password": "Password123"});
        app.send(Method::POST, "/admin/signup", Some(credentials.clone()))
            .await;

        let reply = app
            .send(Method::POST, "/api/users/login", Some(credentials))
            .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_and_readiness() {
        let app = test_app(Environment::Production);

        let health = app.send(Method::GET, "/health", None).await;
        assert_eq!(health.status, StatusCode::OK);
        let body = health.json();
        assert_eq!(body["success"], true);
        assert!(body["timestamp"].as_str().is_some());

        let ready = app.send(Method::GET, "/health/ready", None).await;
        assert_eq!(ready.status, StatusCode::OK);

        app.store.close().await;
        let ready = app.send(Method::GET, "/health/ready", None).await;
        assert_eq!(ready.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ready.json()["success"], false);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = test_app(Environment::Production);
        let reply = app.send(Method::GET, "/api/nope", None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(
            reply.json(),
            json!({"success": false, "message": "Route not found"})
        );
        assert!(reply.headers.contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_request_id_generated_or_echoed() {
        let app = test_app(Environment::Production);

        let generated = app.send(Method::GET, "/health", None).await;
        let id = generated.headers[REQUEST_ID_HEADER].to_str().unwrap();
        assert_eq!(id.len(), 36);

        let request = Request::builder()
            .uri("/health")
            .header(REQUEST_ID_HEADER, "upstream-123")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "upstream-123");
    }

    #[tokio::test]
    async fn test_internal_error_detail_only_in_development() {
        let production = test_app(Environment::Production);
        production.store.close().await;
        let reply = production.register("a@x.com", "alice").await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            reply.json(),
            json!({"success": false, "message": "Internal server error"})
        );

        let development = test_app(Environment::Development);
        development.store.close().await;
        let reply = development.register("a@x.com", "alice").await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = reply.json();
        assert_eq!(body["message"], "Internal server error");
        assert!(body["error"].as_str().unwrap().contains("closed"));
    }
}
