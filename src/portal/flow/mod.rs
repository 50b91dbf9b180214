//! Page state machines. They sit between a front end and the
//! [`VerificationClient`](crate::portal::client::VerificationClient), decide
//! which actions are allowed, and report the route to show next.

mod login;
mod recovery;
mod registration;

pub use login::LoginFlow;
pub use recovery::{PasswordRecoveryFlow, ResetPasswordFlow, UsernameRecoveryFlow};
pub use registration::{ProfileForm, RegistrationFlow, StepFlags};

use crate::portal::{
    client::{ApiResponse, ClientError},
    routes::{RegistrationStep, Route},
};
use serde::Serialize;
use std::{fmt, future::Future};

/// Lifecycle of a single form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Submission<T> {
    Idle,
    Submitting,
    Success(T),
    Failure(String),
}

impl<T> Default for Submission<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> Submission<T> {
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    #[must_use]
    pub const fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }
}

/// An action a page exposes as a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Control {
    SendMobileOtp,
    VerifyMobileOtp,
    SendEmailOtp,
    VerifyEmailOtp,
    SendAadhaarOtp,
    VerifyAadhaarOtp,
    VerifyPan,
    Submit,
    Login,
    RecoverUsername,
    RecoverPassword,
    InitiateReset,
    ConfirmReset,
}

impl Control {
    /// Registration step the action belongs to, if any.
    #[must_use]
    pub const fn step(self) -> Option<RegistrationStep> {
        match self {
            Self::SendMobileOtp | Self::VerifyMobileOtp | Self::SendEmailOtp | Self::VerifyEmailOtp => {
                Some(RegistrationStep::Contact)
            }
            Self::SendAadhaarOtp | Self::VerifyAadhaarOtp | Self::VerifyPan => {
                Some(RegistrationStep::Kyc)
            }
            Self::Submit => Some(RegistrationStep::Profile),
            Self::Login
            | Self::RecoverUsername
            | Self::RecoverPassword
            | Self::InitiateReset
            | Self::ConfirmReset => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SendMobileOtp => "send-mobile-otp",
            Self::VerifyMobileOtp => "verify-mobile-otp",
            Self::SendEmailOtp => "send-email-otp",
            Self::VerifyEmailOtp => "verify-email-otp",
            Self::SendAadhaarOtp => "send-aadhaar-otp",
            Self::VerifyAadhaarOtp => "verify-aadhaar-otp",
            Self::VerifyPan => "verify-pan",
            Self::Submit => "submit",
            Self::Login => "login",
            Self::RecoverUsername => "recover-username",
            Self::RecoverPassword => "recover-password",
            Self::InitiateReset => "reset-initiate",
            Self::ConfirmReset => "reset-confirm",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("{control} is not available while on {current}")]
    StepLocked {
        control: Control,
        current: RegistrationStep,
    },
    #[error("{step} is not complete, missing: {}", missing.join(", "))]
    Gate {
        step: RegistrationStep,
        missing: Vec<&'static str>,
    },
    #[error("{0} is already in progress")]
    Busy(Control),
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl FlowError {
    /// See [`ClientError::redirect`].
    #[must_use]
    pub const fn redirect(&self) -> Option<Route> {
        match self {
            Self::Client(err) => err.redirect(),
            _ => None,
        }
    }
}

impl<T> From<Result<T, FlowError>> for ApiResponse<T> {
    fn from(result: Result<T, FlowError>) -> Self {
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

/// Marks a control as in flight and clears it on drop, including when the
/// request future is cancelled.
///
/// Flow actions hold `&mut self` until their request settles, so the borrow
/// checker already rules out a second action on the same flow. The slot is
/// the in-process record of that; [`FlowError::Busy`] answers a slot found
/// occupied, which only a leaked guard can cause.
pub(crate) struct BusyGuard<'a> {
    slot: &'a mut Option<Control>,
}

impl<'a> BusyGuard<'a> {
    pub(crate) fn enter(slot: &'a mut Option<Control>, control: Control) -> Result<Self, FlowError> {
        if let Some(active) = *slot {
            return Err(FlowError::Busy(active));
        }
        *slot = Some(control);
        Ok(Self { slot })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.slot = None;
    }
}

/// Run `call` as one submission, mirroring its outcome into `state`.
pub(super) async fn track<T, F>(
    state: &mut Submission<T>,
    in_flight: &mut Option<Control>,
    control: Control,
    call: F,
) -> Result<T, FlowError>
where
    T: Clone,
    F: Future<Output = Result<T, ClientError>>,
{
    let _busy = BusyGuard::enter(in_flight, control)?;
    *state = Submission::Submitting;

    match call.await {
        Ok(value) => {
            *state = Submission::Success(value.clone());
            Ok(value)
        }
        Err(err) => {
            *state = Submission::Failure(err.to_string());
            Err(err.into())
        }
    }
}
