//! Development-only exposure of internal error text.
//!
//! [`AppError`](crate::error::AppError) attaches an [`ErrorDetail`] extension
//! to every 5xx response. This layer always strips it, and in development
//! re-renders the body with the detail under `error`.

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{ErrorBody, ErrorDetail, INTERNAL_SERVER_ERROR};
use crate::state::AppState;

/// Middleware that copies internal error detail into the body in development.
pub async fn expose_error_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(ErrorDetail(detail)) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };

    if !state.config().environment.is_development() {
        return response;
    }

    let body = ErrorBody {
        error: Some(detail),
        ..ErrorBody::message(INTERNAL_SERVER_ERROR)
    };
    (response.status(), Json(body)).into_response()
}
