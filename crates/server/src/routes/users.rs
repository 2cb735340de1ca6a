//! User registration, login and directory routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use user_apis_core::UserId;

use super::extract::JsonBody;
use super::{ApiResponse, ListResponse, UserSession};
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::auth::{LoginRequest, RegisterUserRequest};
use crate::state::AppState;

/// Register a new user.
///
/// POST /api/users/register
///
/// # Errors
///
/// 400 on validation failure, 409 if the email or username is taken.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserSession>>)> {
    let session = state.auth().register_user(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User registered successfully",
            UserSession {
                user: session.account,
                token: session.token,
            },
        )),
    ))
}

/// Login as a user.
///
/// POST /api/users/login
///
/// # Errors
///
/// 400 on validation failure, 401 on bad credentials.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<ApiResponse<UserSession>>> {
    let session = state.auth().login_user(request).await?;

    Ok(Json(ApiResponse::with_message(
        "Login successful",
        UserSession {
            user: session.account,
            token: session.token,
        },
    )))
}

/// List all users, oldest first.
///
/// GET /api/users
///
/// # Errors
///
/// 500 if the store fails.
pub async fn list(State(state): State<AppState>) -> Result<Json<ListResponse<User>>> {
    let users = state.store().list_users().await?;
    Ok(Json(ListResponse::new(users)))
}

/// Get one user.
///
/// GET /api/users/{id}
///
/// # Errors
///
/// 400 for a malformed ID, 404 if no such user.
pub async fn get(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<User>>> {
    let id: UserId = raw_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".to_string()))?;

    let user = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::new(user)))
}
