use super::{reject, Reply};
use crate::{
    portal::validators,
    sandbox::state::{Challenge, SharedState, SANDBOX_OTP},
};
use axum::{extract::Extension, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

#[derive(Deserialize)]
pub struct CreateRegistration {
    mobile: String,
    #[serde(default)]
    purpose: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyOtp {
    ref_id: String,
    otp: String,
}

#[derive(Deserialize)]
pub struct EmailOtp {
    email: String,
    urn: String,
}

#[derive(Deserialize)]
pub struct Finalize {
    urn: String,
    #[serde(default)]
    accepted_terms: bool,
}

#[instrument(skip_all)]
pub async fn create(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<CreateRegistration>>,
) -> Reply {
    let Some(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };
    let mobile = match validators::mobile(&request.mobile) {
        Ok(mobile) => mobile,
        Err(err) => return reject(StatusCode::BAD_REQUEST, err.message),
    };
    debug!(purpose = request.purpose.as_deref(), "registration requested");

    let ref_id = state.lock().await.issue(Challenge::Mobile { mobile });

    (
        StatusCode::OK,
        Json(json!({
            "status": 200,
            "message": "OTP sent to mobile",
            "ref_id": ref_id,
            "otp_code": SANDBOX_OTP,
        })),
    )
}

/// Verify a mobile or email OTP. A wrong code is a business failure, answered
/// with HTTP 200 and `status: 400`.
#[instrument(skip_all)]
pub async fn verify_otp(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<VerifyOtp>>,
) -> Reply {
    let Some(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let mut state = state.lock().await;
    let Some(ticket) = state.ticket(&request.ref_id).cloned() else {
        return reject(StatusCode::NOT_FOUND, "Unknown reference");
    };

    if ticket.code != request.otp.trim() {
        return (
            StatusCode::OK,
            Json(json!({"status": 400, "message": "Invalid OTP"})),
        );
    }

    let (urn, message) = match ticket.challenge {
        Challenge::Mobile { mobile } => (state.open_registration(mobile), "Mobile verified"),
        Challenge::Email { urn, email } => {
            let Some(registration) = state.registration_mut(&urn) else {
                return reject(StatusCode::NOT_FOUND, "Unknown URN");
            };
            registration.email = Some(email);
            registration.email_verified = true;
            (urn, "Email verified")
        }
        Challenge::Aadhaar { .. } | Challenge::PasswordReset { .. } => {
            return reject(
                StatusCode::BAD_REQUEST,
                "Reference does not belong to this verification",
            );
        }
    };
    state.consume(&request.ref_id);
    info!(message, "otp verified");

    (
        StatusCode::OK,
        Json(json!({"status": 200, "message": message, "urn": urn})),
    )
}

#[instrument(skip_all)]
pub async fn generate_email_otp(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<EmailOtp>>,
) -> Reply {
    let Some(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };
    let email = match validators::email(&request.email) {
        Ok(email) => email,
        Err(err) => return reject(StatusCode::BAD_REQUEST, err.message),
    };

    let mut state = state.lock().await;
    if state.registration(&request.urn).is_none() {
        return reject(StatusCode::NOT_FOUND, "Unknown URN");
    }
    let ref_id = state.issue(Challenge::Email {
        urn: request.urn,
        email,
    });

    (
        StatusCode::OK,
        Json(json!({
            "status": 200,
            "message": "OTP sent to email",
            "ref_id": ref_id,
            "otp_code": SANDBOX_OTP,
        })),
    )
}

#[instrument(skip_all)]
pub async fn register(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<Finalize>>,
) -> Reply {
    let Some(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };
    if !request.accepted_terms {
        return reject(StatusCode::BAD_REQUEST, "Terms must be accepted");
    }

    let mut state = state.lock().await;
    let Some(registration) = state.registration(&request.urn) else {
        return reject(StatusCode::NOT_FOUND, "Unknown URN");
    };
    if registration.username.is_some() {
        return reject(StatusCode::CONFLICT, "Registration already completed");
    }
    if !registration.kyc_complete() {
        return reject(StatusCode::UNPROCESSABLE_ENTITY, "KYC incomplete");
    }

    let Some(account) = state.create_account(&request.urn) else {
        return reject(StatusCode::NOT_FOUND, "Unknown URN");
    };
    info!(username = %account.username, "registration completed");

    (
        StatusCode::OK,
        Json(json!({
            "status": 200,
            "message": format!("Registration successful, your username is {}", account.username),
            "username": account.username,
        })),
    )
}
