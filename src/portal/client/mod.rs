//! Client for the remote identity-verification API.
//!
//! Every operation validates its input, checks the correlation ids it depends
//! on, and only then talks to the API. Ids issued by the API are written into
//! the [`VerificationSession`] passed in by the caller. OTPs, passwords and
//! tokens are never logged.

mod api;
mod errors;
mod types;

pub use errors::ClientError;
pub use types::{
    Ack, ApiResponse, KycVerification, LoginOutcome, LoginSuccess, OtpIssued, OtpVerification,
    PanPreview, UsernameRecovery, STATUS_OK, STATUS_PASSWORD_RESET_REQUIRED,
};

use crate::portal::{
    session::{Channel, VerificationSession},
    validators,
};
use anyhow::Result;
use api::ApiTransport;
use secrecy::SecretString;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use types::{
    AadhaarOtpRequest, AadhaarVerifyRequest, ConfirmResetRequest, CreateRegistrationRequest,
    EmailOtpRequest, ForgotPasswordRequest, ForgotUsernameRequest, KycVerifyResponse,
    LoginRequest, LoginResponse, PanVerifyRequest, RegisterRequest, ResetPasswordRequest,
    VerifyOtpRequest, VerifyOtpResponse, PURPOSE_FORGOT_PASSWORD, PURPOSE_PASSWORD_RESET,
    PURPOSE_REGISTRATION, PURPOSE_USERNAME_FORGOT, USER_TYPE_RETAILER,
};

/// Default request timeout applied to all calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const URN_KEY: &str = "registration_urn";
const URN_HINT: &str = "complete SMS verification first";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: crate::APP_USER_AGENT.to_string(),
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct VerificationClient {
    api: ApiTransport,
}

impl VerificationClient {
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let api = ApiTransport::new(&config.api_base_url, config.timeout, &config.user_agent)?;
        Ok(Self { api })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    /// Sign in. A body status of `1001` means the account must reset its
    /// password before it can be used.
    ///
    /// # Errors
    /// Returns a [`ClientError`] on invalid credentials format or a failed call.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        session: &mut VerificationSession,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, ClientError> {
        let username = validators::login_username(username)?;
        validators::login_password(password)?;

        let request = LoginRequest {
            username: &username,
            password,
        };
        let mut response: LoginResponse = self
            .api
            .post_json(session, "/secure/login", &request, "Login failed")
            .await?;

        if let Some(token) = response.access_token.take() {
            session.set_auth_token(SecretString::from(token));
        }

        if response.status == Some(STATUS_PASSWORD_RESET_REQUIRED) {
            info!("password reset required");
            if let Some(user_id) = &response.user_id {
                session.set_user_id(user_id.clone());
            }
            return Ok(LoginOutcome::PasswordResetRequired {
                user_id: response.user_id,
                message: response.message,
            });
        }

        if let Some(user_id) = &response.user_id {
            session.set_user_id(user_id.clone());
        }

        Ok(LoginOutcome::Authenticated(response.into()))
    }

    /// Start a registration for `mobile` and keep the reference id for the
    /// mobile OTP verify call.
    ///
    /// # Errors
    /// Returns a [`ClientError`] on invalid input or a failed call.
    #[instrument(skip_all)]
    pub async fn send_mobile_otp(
        &self,
        session: &mut VerificationSession,
        mobile: &str,
    ) -> Result<OtpIssued, ClientError> {
        let mobile = validators::mobile(mobile)?;

        let request = CreateRegistrationRequest {
            mobile: &mobile,
            purpose: PURPOSE_REGISTRATION,
            user_type: USER_TYPE_RETAILER,
        };
        let issued: OtpIssued = self
            .api
            .post_json(session, "/secure/create", &request, "Failed to create registration")
            .await?;

        match &issued.ref_id {
            Some(reference) => session.set_otp_reference(Channel::Mobile, reference.clone()),
            None => warn!("registration created without a reference id"),
        }

        Ok(issued)
    }

    /// Verify an OTP sent to `channel`. The call counts as verified only when
    /// the API answers with status 200 and a URN, which is then stored.
    ///
    /// # Errors
    /// Returns [`ClientError::MissingReference`] when no OTP was sent through
    /// `channel`, or another [`ClientError`] on invalid input or a failed call.
    #[instrument(skip_all, fields(%channel))]
    pub async fn verify_otp(
        &self,
        session: &mut VerificationSession,
        otp: &str,
        channel: Channel,
    ) -> Result<OtpVerification, ClientError> {
        let otp = validators::otp(otp)?;
        let ref_id = session
            .otp_reference(channel)
            .ok_or(ClientError::missing(
                channel.reference_key(),
                "request an OTP for this channel first",
            ))?
            .to_string();

        let request = VerifyOtpRequest {
            ref_id: &ref_id,
            otp: &otp,
        };
        let response: VerifyOtpResponse = self
            .api
            .post_json(session, "/secure/verify-otp", &request, "OTP verification failed")
            .await?;

        let verified = response.status == Some(STATUS_OK) && response.urn.is_some();
        if let Some(urn) = response.urn {
            session.set_urn(urn);
        }

        debug!(verified, "otp verification finished");

        Ok(OtpVerification {
            verified,
            message: response.message,
        })
    }

    /// # Errors
    /// Returns [`ClientError::MissingReference`] before the mobile OTP is
    /// verified, or another [`ClientError`] on invalid input or a failed call.
    #[instrument(skip_all)]
    pub async fn send_email_otp(
        &self,
        session: &mut VerificationSession,
        email: &str,
    ) -> Result<OtpIssued, ClientError> {
        let email = validators::email(email)?;
        let urn = require_urn(session)?;

        let request = EmailOtpRequest {
            email: &email,
            urn: &urn,
        };
        let issued: OtpIssued = self
            .api
            .post_json(
                session,
                "/secure/generate-email-otp",
                &request,
                "Failed to generate email OTP",
            )
            .await?;

        if let Some(reference) = &issued.ref_id {
            session.set_otp_reference(Channel::Email, reference.clone());
        }

        Ok(issued)
    }

    /// # Errors
    /// Returns [`ClientError::MissingReference`] without a URN, or another
    /// [`ClientError`] on invalid input or a failed call.
    #[instrument(skip_all)]
    pub async fn send_aadhaar_otp(
        &self,
        session: &mut VerificationSession,
        aadhaar: &str,
    ) -> Result<OtpIssued, ClientError> {
        let aadhaar = validators::aadhaar(aadhaar)?;
        let urn = require_urn(session)?;

        let request = AadhaarOtpRequest {
            urn: &urn,
            aadhaar_number: &aadhaar,
        };
        let issued: OtpIssued = self
            .api
            .post_json(
                session,
                "/secure/aadhar-otp-generate",
                &request,
                "Failed to generate Aadhaar OTP",
            )
            .await?;

        if let Some(reference) = &issued.ref_id {
            session.set_aadhaar_ref(reference.clone());
        }

        Ok(issued)
    }

    /// # Errors
    /// Returns [`ClientError::MissingReference`] without a URN or an Aadhaar
    /// reference, or another [`ClientError`] on invalid input or a failed call.
    #[instrument(skip_all)]
    pub async fn verify_aadhaar_otp(
        &self,
        session: &mut VerificationSession,
        otp: &str,
    ) -> Result<KycVerification, ClientError> {
        let otp = validators::otp(otp)?;
        let urn = require_urn(session)?;
        let ref_id = session
            .aadhaar_ref()
            .ok_or(ClientError::missing(
                "aadhar_ref",
                "request an Aadhaar OTP first",
            ))?
            .to_string();

        let request = AadhaarVerifyRequest {
            urn: &urn,
            otp: &otp,
            ref_id: &ref_id,
        };
        let response: KycVerifyResponse = self
            .api
            .post_json(
                session,
                "/secure/aadhar-otp-verify",
                &request,
                "Aadhaar OTP verification failed",
            )
            .await?;

        Ok(response.into())
    }

    /// Verify a PAN and keep the registered name and address for the profile
    /// step.
    ///
    /// # Errors
    /// Returns [`ClientError::MissingReference`] without a URN, or another
    /// [`ClientError`] on invalid input or a failed call.
    #[instrument(skip_all)]
    pub async fn verify_pan(
        &self,
        session: &mut VerificationSession,
        pan: &str,
    ) -> Result<KycVerification, ClientError> {
        let pan = validators::pan(pan)?;
        let urn = require_urn(session)?;

        let request = PanVerifyRequest {
            urn: &urn,
            pan_number: &pan,
        };
        let response: KycVerifyResponse = self
            .api
            .post_json(session, "/secure/pan-verify", &request, "PAN verification failed")
            .await?;

        if let Some(preview) = &response.preview_data {
            session.set_pan_preview(preview.registered_name.clone(), preview.address.clone());
        }

        Ok(response.into())
    }

    /// # Errors
    /// Returns a validation error unless `terms_accepted`, or
    /// [`ClientError::MissingReference`] without a URN.
    #[instrument(skip_all)]
    pub async fn finalize_registration(
        &self,
        session: &mut VerificationSession,
        terms_accepted: bool,
    ) -> Result<Ack, ClientError> {
        validators::terms(terms_accepted)?;
        let urn = require_urn(session)?;

        let request = RegisterRequest {
            urn: &urn,
            accepted_terms: terms_accepted,
        };
        self.api
            .post_json(session, "/secure/register", &request, "Registration failed")
            .await
    }

    /// Ask for a reset OTP for the account identified by the login that
    /// demanded it.
    ///
    /// # Errors
    /// Returns [`ClientError::MissingReference`] when no user id is known.
    #[instrument(skip_all)]
    pub async fn initiate_password_reset(
        &self,
        session: &mut VerificationSession,
    ) -> Result<OtpIssued, ClientError> {
        let user_id = require_user_id(session)?;

        let request = ResetPasswordRequest {
            user_id: &user_id,
            purpose: PURPOSE_PASSWORD_RESET,
        };
        let issued: OtpIssued = self
            .api
            .post_json(
                session,
                "/secure/reset-password",
                &request,
                "Reset password failed",
            )
            .await?;

        if let Some(reference) = &issued.ref_id {
            session.set_reset_ref(reference.clone());
        }

        Ok(issued)
    }

    /// # Errors
    /// Returns [`ClientError::MissingReference`] before
    /// [`Self::initiate_password_reset`] succeeded, or another [`ClientError`]
    /// on invalid input or a failed call.
    #[instrument(skip_all)]
    pub async fn confirm_password_reset(
        &self,
        session: &mut VerificationSession,
        otp: &str,
        password: &str,
    ) -> Result<Ack, ClientError> {
        let otp = validators::otp(otp)?;
        validators::new_password(password)?;
        let ref_id = session
            .reset_ref()
            .ok_or(ClientError::missing(
                "registration_ref_id_reset",
                "request a password reset OTP first",
            ))?
            .to_string();
        let user_id = require_user_id(session)?;

        let request = ConfirmResetRequest {
            ref_id: &ref_id,
            user_id: &user_id,
            password,
            otp: &otp,
        };
        self.api
            .post_json(
                session,
                "/secure/verify-otp-password",
                &request,
                "Password reset verification failed",
            )
            .await
    }

    /// Send a reset link to the account's registered contacts.
    ///
    /// # Errors
    /// Returns a [`ClientError`] on invalid input or a failed call.
    #[instrument(skip_all)]
    pub async fn request_password_reset_link(
        &self,
        session: &mut VerificationSession,
        username: &str,
    ) -> Result<Ack, ClientError> {
        let username = validators::recovery_username(username)?;

        let request = ForgotPasswordRequest {
            username: &username,
            kind: "both",
            purpose: PURPOSE_FORGOT_PASSWORD,
        };
        self.api
            .post_json(
                session,
                "/secure/forgot-password",
                &request,
                "Failed to send reset link",
            )
            .await
    }

    /// # Errors
    /// Returns a [`ClientError`] on invalid input or a failed call.
    #[instrument(skip_all)]
    pub async fn recover_username(
        &self,
        session: &mut VerificationSession,
        mobile: &str,
    ) -> Result<UsernameRecovery, ClientError> {
        let mobile = validators::mobile(mobile)?;

        let request = ForgotUsernameRequest {
            mobile: &mobile,
            purpose: PURPOSE_USERNAME_FORGOT,
            user_type: USER_TYPE_RETAILER,
        };
        self.api
            .post_json(
                session,
                "/secure/username-forgot",
                &request,
                "Failed to retrieve username",
            )
            .await
    }
}

fn require_urn(session: &VerificationSession) -> Result<String, ClientError> {
    session
        .urn()
        .map(str::to_string)
        .ok_or(ClientError::missing(URN_KEY, URN_HINT))
}

fn require_user_id(session: &VerificationSession) -> Result<String, ClientError> {
    session.user_id().map(str::to_string).ok_or(ClientError::missing(
        "user_id",
        "sign in first so the account can be identified",
    ))
}
