use super::{reject, Reply};
use crate::{
    portal::validators,
    sandbox::state::{Challenge, SharedState, SANDBOX_OTP},
};
use axum::{extract::Extension, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

#[derive(Deserialize)]
pub struct ResetPassword {
    user_id: String,
}

#[derive(Deserialize)]
pub struct ConfirmReset {
    ref_id: String,
    user_id: String,
    password: String,
    otp: String,
}

#[derive(Deserialize)]
pub struct ForgotPassword {
    username: String,
}

#[derive(Deserialize)]
pub struct ForgotUsername {
    mobile: String,
}

#[instrument(skip_all)]
pub async fn reset_password(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<ResetPassword>>,
) -> Reply {
    let Some(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let mut state = state.lock().await;
    if state.account_by_id_mut(&request.user_id).is_none() {
        return reject(StatusCode::NOT_FOUND, "User not found");
    }
    let ref_id = state.issue(Challenge::PasswordReset {
        user_id: request.user_id,
    });

    (
        StatusCode::OK,
        Json(json!({
            "status": 200,
            "message": "OTP sent to registered mobile",
            "ref_id": ref_id,
            "otp_code": SANDBOX_OTP,
        })),
    )
}

#[instrument(skip_all)]
pub async fn verify_otp_password(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<ConfirmReset>>,
) -> Reply {
    let Some(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };
    if let Err(err) = validators::new_password(&request.password) {
        return reject(StatusCode::BAD_REQUEST, err.message);
    }

    let mut state = state.lock().await;
    let expected = Challenge::PasswordReset {
        user_id: request.user_id.clone(),
    };
    match state.ticket(&request.ref_id) {
        Some(ticket) if ticket.challenge == expected => {
            if ticket.code != request.otp.trim() {
                return reject(StatusCode::BAD_REQUEST, "Invalid OTP");
            }
        }
        _ => return reject(StatusCode::NOT_FOUND, "Unknown reference"),
    }

    let Some(account) = state.account_by_id_mut(&request.user_id) else {
        return reject(StatusCode::NOT_FOUND, "User not found");
    };
    account.password = Some(request.password);
    account.reset_required = false;
    state.consume(&request.ref_id);
    info!("password updated");

    (
        StatusCode::OK,
        Json(json!({"status": 200, "message": "Password updated successfully"})),
    )
}

#[instrument(skip_all)]
pub async fn forgot_password(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<ForgotPassword>>,
) -> Reply {
    let Some(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };

    if state
        .lock()
        .await
        .account_by_username(request.username.trim())
        .is_none()
    {
        return reject(StatusCode::NOT_FOUND, "User not found");
    }

    (
        StatusCode::OK,
        Json(json!({
            "status": 200,
            "message": "Reset link sent to registered mobile and email",
        })),
    )
}

#[instrument(skip_all)]
pub async fn username_forgot(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<ForgotUsername>>,
) -> Reply {
    let Some(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let state = state.lock().await;
    let Some(account) = state.account_by_mobile(request.mobile.trim()) else {
        return reject(StatusCode::NOT_FOUND, "No account registered with this mobile");
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": 200,
            "message": "Username sent to registered mobile",
            "username": account.username,
        })),
    )
}
