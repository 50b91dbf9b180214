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
pub struct AadhaarOtp {
    urn: String,
    aadhaar_number: String,
}

#[derive(Deserialize)]
pub struct AadhaarVerify {
    urn: String,
    otp: String,
    ref_id: String,
}

#[derive(Deserialize)]
pub struct PanVerify {
    urn: String,
    pan_number: String,
}

#[instrument(skip_all)]
pub async fn aadhaar_otp_generate(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<AadhaarOtp>>,
) -> Reply {
    let Some(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };
    if let Err(err) = validators::aadhaar(&request.aadhaar_number) {
        return reject(StatusCode::BAD_REQUEST, err.message);
    }

    let mut state = state.lock().await;
    if state.registration(&request.urn).is_none() {
        return reject(StatusCode::NOT_FOUND, "Unknown URN");
    }
    let ref_id = state.issue(Challenge::Aadhaar { urn: request.urn });

    (
        StatusCode::OK,
        Json(json!({
            "status": 200,
            "message": "OTP sent to Aadhaar linked mobile",
            "ref_id": ref_id,
            "otp_code": SANDBOX_OTP,
        })),
    )
}

#[instrument(skip_all)]
pub async fn aadhaar_otp_verify(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<AadhaarVerify>>,
) -> Reply {
    let Some(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let mut state = state.lock().await;
    let matches_urn = state.ticket(&request.ref_id).map(|ticket| {
        (
            ticket.challenge
                == Challenge::Aadhaar {
                    urn: request.urn.clone(),
                },
            ticket.code == request.otp.trim(),
        )
    });

    match matches_urn {
        None | Some((false, _)) => reject(StatusCode::NOT_FOUND, "Unknown reference"),
        Some((true, false)) => (
            StatusCode::OK,
            Json(json!({"status": 400, "verified": false, "message": "Invalid OTP"})),
        ),
        Some((true, true)) => {
            let Some(registration) = state.registration_mut(&request.urn) else {
                return reject(StatusCode::NOT_FOUND, "Unknown URN");
            };
            registration.aadhaar_verified = true;
            state.consume(&request.ref_id);
            info!("aadhaar verified");

            (
                StatusCode::OK,
                Json(json!({"status": 200, "verified": true, "message": "Aadhaar verified"})),
            )
        }
    }
}

#[instrument(skip_all)]
pub async fn pan_verify(
    Extension(state): Extension<SharedState>,
    payload: Option<Json<PanVerify>>,
) -> Reply {
    let Some(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "Missing payload");
    };
    let pan = match validators::pan(&request.pan_number) {
        Ok(pan) => pan,
        Err(err) => return reject(StatusCode::BAD_REQUEST, err.message),
    };

    let mut state = state.lock().await;
    let Some(registration) = state.registration_mut(&request.urn) else {
        return reject(StatusCode::NOT_FOUND, "Unknown URN");
    };
    registration.pan = Some(pan);
    info!("pan verified");

    (
        StatusCode::OK,
        Json(json!({
            "status": 200,
            "verified": true,
            "message": "PAN verified",
            "preview_data": {
                "registered_name": "SANDBOX RETAILER",
                "address": "221 MG Road, Bengaluru 560001",
                "urn": request.urn,
            },
        })),
    )
}
