//! Admin signup and login routes.

use axum::{Json, extract::State, http::StatusCode};

use super::extract::JsonBody;
use super::{AdminSession, ApiResponse};
use crate::error::Result;
use crate::services::auth::{LoginRequest, RegisterAdminRequest};
use crate::state::AppState;

/// Register a new admin.
///
/// POST /admin/signup
///
/// # Errors
///
/// 400 on validation failure, 409 if the email is taken.
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterAdminRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AdminSession>>)> {
    let session = state.auth().register_admin(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Admin registered successfully",
            AdminSession {
                admin: session.account,
                token: session.token,
            },
        )),
    ))
}

/// Login as an admin.
///
/// POST /admin/login
///
/// # Errors
///
/// 400 on validation failure, 401 on bad credentials or an inactive account.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<ApiResponse<AdminSession>>> {
    let session = state.auth().login_admin(request).await?;

    Ok(Json(ApiResponse::with_message(
        "Admin login successful",
        AdminSession {
            admin: session.account,
            token: session.token,
        },
    )))
}
