use super::{BusyGuard, Control, FlowError};
use crate::portal::{
    client::{Ack, ClientError, KycVerification, OtpIssued, OtpVerification, VerificationClient},
    routes::{RegistrationStep, Route},
    session::{Channel, VerificationSession},
    validators::{self, ValidationError},
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{info, warn};

/// Verification flags collected across the registration steps. Flags only
/// ever go from `false` to `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFlags {
    #[serde(default)]
    pub sms_verified: bool,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub aadhaar_verified: bool,
    #[serde(default)]
    pub pan_verified: bool,
    #[serde(default)]
    pub terms_accepted: bool,
}

impl StepFlags {
    /// Names of the flags still blocking `step`.
    #[must_use]
    pub fn missing(&self, step: RegistrationStep) -> Vec<&'static str> {
        let required = match step {
            RegistrationStep::Contact => vec![
                ("sms_verified", self.sms_verified),
                ("email_verified", self.email_verified),
            ],
            RegistrationStep::Kyc => vec![
                ("aadhaar_verified", self.aadhaar_verified),
                ("pan_verified", self.pan_verified),
            ],
            RegistrationStep::Profile => vec![("terms_accepted", self.terms_accepted)],
            RegistrationStep::Complete => Vec::new(),
        };

        required
            .into_iter()
            .filter(|(_, set)| !set)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Profile page form. Name and address start from the PAN preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
}

impl ProfileForm {
    #[must_use]
    pub fn prefilled(session: &VerificationSession) -> Self {
        Self {
            name: session.pan_registered_name().unwrap_or_default().to_string(),
            address: session.pan_address().unwrap_or_default().to_string(),
            ..Self::default()
        }
    }

    /// # Errors
    /// Returns the first failing field, in form order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validators::profile_name(&self.name)?;
        validators::address(&self.address)?;
        validators::city(&self.city)?;
        validators::pincode(&self.pincode)?;
        Ok(())
    }
}

/// Three-step registration: `Contact -> Kyc -> Profile -> Complete`.
///
/// Actions of a step are accepted once the flow has reached that step and
/// until registration is complete. Moving forward requires the current
/// step's flags; the profile step is left only by a successful submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationFlow {
    #[serde(default)]
    step: RegistrationStep,
    #[serde(default)]
    flags: StepFlags,
    #[serde(skip)]
    in_flight: Option<Control>,
}

impl RegistrationFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> RegistrationStep {
        self.step
    }

    #[must_use]
    pub const fn flags(&self) -> StepFlags {
        self.flags
    }

    #[must_use]
    pub const fn route(&self) -> Route {
        match self.step {
            RegistrationStep::Complete => Route::Success,
            step => Route::Register(step),
        }
    }

    /// The step the "next" link points at, present only when the current
    /// step's gate is satisfied. The profile step has no link; it completes
    /// through [`Self::submit`].
    #[must_use]
    pub fn next_step_link(&self) -> Option<RegistrationStep> {
        match self.step {
            RegistrationStep::Contact | RegistrationStep::Kyc
                if self.flags.missing(self.step).is_empty() =>
            {
                self.step.next()
            }
            _ => None,
        }
    }

    /// Follow the next-step link.
    ///
    /// # Errors
    /// Returns [`FlowError::Gate`] naming the flags still missing.
    pub fn advance(&mut self) -> Result<Route, FlowError> {
        if self.step == RegistrationStep::Complete {
            return Ok(self.route());
        }

        let Some(next) = self.next_step_link() else {
            let mut missing = self.flags.missing(self.step);
            if self.step == RegistrationStep::Profile {
                missing.push("registration_submitted");
            }
            return Err(FlowError::Gate {
                step: self.step,
                missing,
            });
        };

        info!(from = %self.step, to = %next, "registration step advanced");
        self.step = next;
        Ok(self.route())
    }

    /// Back link of the KYC and profile pages.
    pub fn back(&mut self) -> Route {
        self.step = match self.step {
            RegistrationStep::Kyc => RegistrationStep::Contact,
            RegistrationStep::Profile => RegistrationStep::Kyc,
            step => step,
        };
        self.route()
    }

    /// # Errors
    /// Returns a [`FlowError`] when the action is locked, busy or the call fails.
    pub async fn send_mobile_otp(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        mobile: &str,
    ) -> Result<OtpIssued, FlowError> {
        self.perform(Control::SendMobileOtp, client.send_mobile_otp(session, mobile))
            .await
    }

    /// # Errors
    /// Returns a [`FlowError`] when the action is locked, busy or the call fails.
    pub async fn verify_mobile_otp(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        otp: &str,
    ) -> Result<OtpVerification, FlowError> {
        let verification = self
            .perform(
                Control::VerifyMobileOtp,
                client.verify_otp(session, otp, Channel::Mobile),
            )
            .await?;
        if verification.verified {
            self.flags.sms_verified = true;
        }
        Ok(verification)
    }

    /// # Errors
    /// Returns a [`FlowError`] when the action is locked, busy or the call fails.
    pub async fn send_email_otp(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        email: &str,
    ) -> Result<OtpIssued, FlowError> {
        self.perform(Control::SendEmailOtp, client.send_email_otp(session, email))
            .await
    }

    /// # Errors
    /// Returns a [`FlowError`] when the action is locked, busy or the call fails.
    pub async fn verify_email_otp(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        otp: &str,
    ) -> Result<OtpVerification, FlowError> {
        let verification = self
            .perform(
                Control::VerifyEmailOtp,
                client.verify_otp(session, otp, Channel::Email),
            )
            .await?;
        if verification.verified {
            self.flags.email_verified = true;
        }
        Ok(verification)
    }

    /// # Errors
    /// Returns a [`FlowError`] when the action is locked, busy or the call fails.
    pub async fn send_aadhaar_otp(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        aadhaar: &str,
    ) -> Result<OtpIssued, FlowError> {
        self.perform(
            Control::SendAadhaarOtp,
            client.send_aadhaar_otp(session, aadhaar),
        )
        .await
    }

    /// # Errors
    /// Returns a [`FlowError`] when the action is locked, busy or the call fails.
    pub async fn verify_aadhaar_otp(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        otp: &str,
    ) -> Result<KycVerification, FlowError> {
        let verification = self
            .perform(
                Control::VerifyAadhaarOtp,
                client.verify_aadhaar_otp(session, otp),
            )
            .await?;
        if verification.verified {
            self.flags.aadhaar_verified = true;
        }
        Ok(verification)
    }

    /// # Errors
    /// Returns a [`FlowError`] when the action is locked, busy or the call fails.
    pub async fn verify_pan(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        pan: &str,
    ) -> Result<KycVerification, FlowError> {
        let verification = self
            .perform(Control::VerifyPan, client.verify_pan(session, pan))
            .await?;
        if verification.verified {
            self.flags.pan_verified = true;
        }
        Ok(verification)
    }

    /// Final submission of the profile form. The terms must be accepted on
    /// every submission. Success completes the registration; any failure,
    /// including a locked step, leaves the flags and step untouched.
    ///
    /// # Errors
    /// Returns a [`FlowError`] when the action is locked, busy, the profile
    /// is invalid, the terms are not accepted or the call fails.
    pub async fn submit(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        profile: &ProfileForm,
        accept_terms: bool,
    ) -> Result<Ack, FlowError> {
        let call = async {
            match profile.validate() {
                Ok(()) => client.finalize_registration(session, accept_terms).await,
                Err(err) => Err(ClientError::from(err)),
            }
        };
        let ack = self.perform(Control::Submit, call).await?;

        info!("registration complete");
        self.flags.terms_accepted = true;
        self.step = RegistrationStep::Complete;
        Ok(ack)
    }

    fn ensure_unlocked(&self, control: Control) -> Result<(), FlowError> {
        let Some(required) = control.step() else {
            return Ok(());
        };
        if self.step < required || self.step == RegistrationStep::Complete {
            return Err(FlowError::StepLocked {
                control,
                current: self.step,
            });
        }
        Ok(())
    }

    async fn perform<T, F>(&mut self, control: Control, call: F) -> Result<T, FlowError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.ensure_unlocked(control)?;
        let _busy = BusyGuard::enter(&mut self.in_flight, control)?;

        call.await.map_err(|err| {
            warn!(%control, error = %err, "registration action failed");
            FlowError::from(err)
        })
    }
}
