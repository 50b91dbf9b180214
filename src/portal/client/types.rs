//! Wire types for the remote identity API and the uniform result shape handed
//! to front ends.

use super::ClientError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body status the API uses for a plain success.
pub const STATUS_OK: u32 = 200;
/// Body status a login returns when the account must reset its password.
pub const STATUS_PASSWORD_RESET_REQUIRED: u32 = 1001;

pub(crate) const PURPOSE_REGISTRATION: &str = "REGISTRATION";
pub(crate) const PURPOSE_USERNAME_FORGOT: &str = "USERNAME_FORGOT";
pub(crate) const PURPOSE_FORGOT_PASSWORD: &str = "FORGOT_PASSWORD";
pub(crate) const PURPOSE_PASSWORD_RESET: &str = "password_reset";
pub(crate) const USER_TYPE_RETAILER: &str = "RETAILER";

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct CreateRegistrationRequest<'a> {
    pub mobile: &'a str,
    pub purpose: &'static str,
    pub user_type: &'static str,
}

#[derive(Serialize)]
pub(crate) struct VerifyOtpRequest<'a> {
    pub ref_id: &'a str,
    pub otp: &'a str,
}

#[derive(Serialize)]
pub(crate) struct EmailOtpRequest<'a> {
    pub email: &'a str,
    pub urn: &'a str,
}

#[derive(Serialize)]
pub(crate) struct AadhaarOtpRequest<'a> {
    pub urn: &'a str,
    pub aadhaar_number: &'a str,
}

#[derive(Serialize)]
pub(crate) struct AadhaarVerifyRequest<'a> {
    pub urn: &'a str,
    pub otp: &'a str,
    pub ref_id: &'a str,
}

#[derive(Serialize)]
pub(crate) struct PanVerifyRequest<'a> {
    pub urn: &'a str,
    pub pan_number: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub urn: &'a str,
    pub accepted_terms: bool,
}

#[derive(Serialize)]
pub(crate) struct ResetPasswordRequest<'a> {
    pub user_id: &'a str,
    pub purpose: &'static str,
}

#[derive(Serialize)]
pub(crate) struct ConfirmResetRequest<'a> {
    pub ref_id: &'a str,
    pub user_id: &'a str,
    pub password: &'a str,
    pub otp: &'a str,
}

#[derive(Serialize)]
pub(crate) struct ForgotPasswordRequest<'a> {
    pub username: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub purpose: &'static str,
}

#[derive(Serialize)]
pub(crate) struct ForgotUsernameRequest<'a> {
    pub mobile: &'a str,
    pub purpose: &'static str,
    pub user_type: &'static str,
}

#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub status: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub last_login_time: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub permissions: Option<Value>,
}

#[derive(Deserialize)]
pub(crate) struct VerifyOtpResponse {
    #[serde(default)]
    pub status: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub urn: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct KycVerifyResponse {
    #[serde(default)]
    pub status: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub preview_data: Option<PanPreview>,
}

/// Account details returned by a login. The access token itself goes into the
/// session and is never part of this value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginSuccess {
    pub user_id: Option<String>,
    pub message: Option<String>,
    pub last_login_time: Option<String>,
    pub device: Option<String>,
    pub ip: Option<String>,
    pub permissions: Option<Value>,
}

impl From<LoginResponse> for LoginSuccess {
    fn from(response: LoginResponse) -> Self {
        Self {
            user_id: response.user_id,
            message: response.message,
            last_login_time: response.last_login_time,
            device: response.device,
            ip: response.ip,
            permissions: response.permissions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoginOutcome {
    Authenticated(LoginSuccess),
    PasswordResetRequired {
        user_id: Option<String>,
        message: Option<String>,
    },
}

/// Reply to any "send OTP" style call. Demo back ends echo the OTP in `otp_code`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpIssued {
    #[serde(default)]
    pub status: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub otp_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpVerification {
    pub verified: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanPreview {
    #[serde(default)]
    pub registered_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Result of an Aadhaar OTP or PAN check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KycVerification {
    pub verified: bool,
    pub status: Option<u32>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PanPreview>,
}

impl From<KycVerifyResponse> for KycVerification {
    fn from(response: KycVerifyResponse) -> Self {
        Self {
            verified: response
                .verified
                .unwrap_or(response.status == Some(STATUS_OK)),
            status: response.status,
            message: response.message,
            preview: response.preview_data,
        }
    }
}

/// Plain acknowledgement carrying the API's message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameRecovery {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Uniform `{ success, data?, error? }` shape for front ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<Result<T, ClientError>> for ApiResponse<T> {
    fn from(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(err) => Self {
                success: false,
                data: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kyc_verified_falls_back_to_status() -> Result<(), serde_json::Error> {
        let explicit: KycVerifyResponse =
            serde_json::from_value(json!({"status": 200, "verified": false}))?;
        assert!(!KycVerification::from(explicit).verified);

        let by_status: KycVerifyResponse = serde_json::from_value(json!({"status": 200}))?;
        assert!(KycVerification::from(by_status).verified);

        let failed: KycVerifyResponse = serde_json::from_value(json!({"status": 422}))?;
        assert!(!KycVerification::from(failed).verified);
        Ok(())
    }

    #[test]
    fn api_response_from_result() -> Result<(), serde_json::Error> {
        let ok: ApiResponse<Ack> = Ok::<Ack, ClientError>(Ack::default()).into();
        assert!(ok.success);

        let err: ApiResponse<Ack> = Err(ClientError::Timeout).into();
        assert_eq!(
            serde_json::to_value(&err)?,
            json!({"success": false, "error": "Request timed out. Please try again."})
        );
        Ok(())
    }

    #[test]
    fn forgot_password_request_uses_type_key() -> Result<(), serde_json::Error> {
        let request = ForgotPasswordRequest {
            username: "RA176900435",
            kind: "both",
            purpose: PURPOSE_FORGOT_PASSWORD,
        };
        assert_eq!(
            serde_json::to_value(&request)?,
            json!({"username": "RA176900435", "type": "both", "purpose": "FORGOT_PASSWORD"})
        );
        Ok(())
    }
}
