//! Pages of the portal. Flows never render anything; they return the route the
//! front end has to show next.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Registration step, in the order the user walks through them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStep {
    /// STEP1: mobile and email OTP.
    #[default]
    Contact,
    /// STEP2: Aadhaar OTP and PAN.
    Kyc,
    /// STEP3: profile review and terms.
    Profile,
    Complete,
}

impl RegistrationStep {
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Contact => Some(Self::Kyc),
            Self::Kyc => Some(Self::Profile),
            Self::Profile => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "step-1",
            Self::Kyc => "step-2",
            Self::Profile => "step-3",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "page", content = "step")]
pub enum Route {
    /// Entry point, also the target of the 401 policy.
    #[default]
    Login,
    ForgotUsername,
    ForgotPassword,
    ResetPassword,
    Register(RegistrationStep),
    Success,
}

impl Route {
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::Login => "/auth/login".to_string(),
            Self::ForgotUsername => "/auth/recover/username".to_string(),
            Self::ForgotPassword => "/auth/recover/password".to_string(),
            Self::ResetPassword => "/auth/resetPassword".to_string(),
            Self::Register(RegistrationStep::Complete) | Self::Success => {
                "/auth/success".to_string()
            }
            Self::Register(step) => format!("/auth/register/{step}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
