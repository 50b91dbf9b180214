pub mod health;
pub mod kyc;
pub mod login;
pub mod recovery;
pub mod registration;

use super::state::SharedState;
use axum::{
    body::Body,
    extract::Extension,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

pub type Reply = (StatusCode, Json<Value>);

/// Error body in the shape the portal expects: `{ status, message }`.
pub fn reject(status: StatusCode, message: &str) -> Reply {
    (
        status,
        Json(json!({
            "status": status.as_u16(),
            "message": message,
        })),
    )
}

/// A bearer token is optional on the sandbox, but one it never issued is
/// answered with 401.
pub async fn require_known_token(
    Extension(state): Extension<SharedState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    if let Some(token) = token {
        if !state.lock().await.knows_token(&token) {
            warn!("rejected unknown bearer token");
            return reject(StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response();
        }
    }

    next.run(request).await
}
