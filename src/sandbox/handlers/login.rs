use super::{reject, Reply};
use crate::sandbox::state::SharedState;
use axum::{extract::Extension, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

#[derive(Deserialize)]
pub struct Credentials {
    username: String,
    password: String,
}

#[instrument(skip_all)]
pub async fn login(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<Credentials>>,
) -> Reply {
    let Some(Json(credentials)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let mut state = state.lock().await;
    let Some(account) = state
        .account_by_username(credentials.username.trim())
        .cloned()
    else {
        return reject(StatusCode::BAD_REQUEST, "Invalid username or password");
    };

    // Accounts opened through registration have no password until the
    // first reset.
    let password_ok = account
        .password
        .as_deref()
        .map_or(account.reset_required, |password| {
            password == credentials.password
        });
    if !password_ok {
        return reject(StatusCode::BAD_REQUEST, "Invalid username or password");
    }

    if account.reset_required {
        info!("login answered with reset required");
        return (
            StatusCode::OK,
            Json(json!({
                "status": 1001,
                "message": "Password reset required",
                "user_id": account.user_id,
            })),
        );
    }

    let token = state.issue_token();
    info!("login successful");

    (
        StatusCode::OK,
        Json(json!({
            "status": 200,
            "message": "Login successful",
            "user_id": account.user_id,
            "access_token": token,
            "device": "sandbox",
        })),
    )
}
