use crate::{
    cli::{actions::context::PortalContext, globals::GlobalArgs},
    portal::{
        client::{Ack, KycVerification, OtpIssued, OtpVerification},
        flow::{FlowError, ProfileForm, RegistrationFlow, StepFlags},
        routes::RegistrationStep,
    },
};
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug)]
pub enum Step {
    Status,
    Advance,
    Back,
    SendMobileOtp { mobile: String },
    VerifyMobileOtp { otp: String },
    SendEmailOtp { email: String },
    VerifyEmailOtp { otp: String },
    SendAadhaarOtp { aadhaar: String },
    VerifyAadhaarOtp { otp: String },
    VerifyPan { pan: String },
    Submit {
        profile: ProfileArgs,
        accept_terms: bool,
    },
}

/// Profile fields from the command line. Name and address fall back to the
/// PAN preview saved in the session.
#[derive(Debug, Default)]
pub struct ProfileArgs {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: String,
    pub pincode: String,
}

impl ProfileArgs {
    fn into_form(self, prefill: ProfileForm) -> ProfileForm {
        ProfileForm {
            name: self.name.unwrap_or(prefill.name),
            address: self.address.unwrap_or(prefill.address),
            city: self.city,
            pincode: self.pincode,
        }
    }
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub step: Step,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Outcome {
    Issued(OtpIssued),
    Otp(OtpVerification),
    Kyc(KycVerification),
    Submitted(Ack),
}

#[derive(Debug, Serialize)]
struct Progress {
    step: RegistrationStep,
    flags: StepFlags,
    next: Option<RegistrationStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<Outcome>,
}

impl Progress {
    fn new(flow: &RegistrationFlow, outcome: Option<Outcome>) -> Self {
        Self {
            step: flow.step(),
            flags: flow.flags(),
            next: flow.next_step_link(),
            outcome,
        }
    }
}

/// Execute a registration step.
/// # Errors
/// Returns an error if the action is not available on the current step, the
/// call fails or the state cannot be saved.
pub async fn execute(args: Args) -> Result<()> {
    let mut portal = PortalContext::open(&args.globals)?;

    let result = perform(&mut portal, args.step)
        .await
        .map(|outcome| Progress::new(&portal.state.registration, outcome));
    portal.state.route = portal.state.registration.route();

    portal.finish(result, describe)
}

async fn perform(portal: &mut PortalContext, step: Step) -> Result<Option<Outcome>, FlowError> {
    let client = &portal.client;
    let session = &mut portal.state.session;
    let flow = &mut portal.state.registration;

    let outcome = match step {
        Step::Status => return Ok(None),
        Step::Advance => {
            flow.advance()?;
            return Ok(None);
        }
        Step::Back => {
            flow.back();
            return Ok(None);
        }
        Step::SendMobileOtp { mobile } => {
            Outcome::Issued(flow.send_mobile_otp(client, session, &mobile).await?)
        }
        Step::VerifyMobileOtp { otp } => {
            Outcome::Otp(flow.verify_mobile_otp(client, session, &otp).await?)
        }
        Step::SendEmailOtp { email } => {
            Outcome::Issued(flow.send_email_otp(client, session, &email).await?)
        }
        Step::VerifyEmailOtp { otp } => {
            Outcome::Otp(flow.verify_email_otp(client, session, &otp).await?)
        }
        Step::SendAadhaarOtp { aadhaar } => {
            Outcome::Issued(flow.send_aadhaar_otp(client, session, &aadhaar).await?)
        }
        Step::VerifyAadhaarOtp { otp } => {
            Outcome::Kyc(flow.verify_aadhaar_otp(client, session, &otp).await?)
        }
        Step::VerifyPan { pan } => Outcome::Kyc(flow.verify_pan(client, session, &pan).await?),
        Step::Submit {
            profile,
            accept_terms,
        } => {
            let form = profile.into_form(ProfileForm::prefilled(session));
            Outcome::Submitted(flow.submit(client, session, &form, accept_terms).await?)
        }
    };

    Ok(Some(outcome))
}

fn describe(progress: &Progress) -> String {
    let mut text = String::new();

    match &progress.outcome {
        Some(Outcome::Issued(issued)) => {
            text.push_str(issued.message.as_deref().unwrap_or("OTP sent"));
            if let Some(code) = &issued.otp_code {
                let _ = write!(text, " (OTP {code})");
            }
            text.push('\n');
        }
        Some(Outcome::Otp(verification)) => {
            text.push_str(&verdict(verification.verified, verification.message.as_deref()));
            text.push('\n');
        }
        Some(Outcome::Kyc(verification)) => {
            text.push_str(&verdict(verification.verified, verification.message.as_deref()));
            text.push('\n');
            if let Some(preview) = &verification.preview {
                if let Some(name) = &preview.registered_name {
                    let _ = writeln!(text, "Registered name: {name}");
                }
                if let Some(address) = &preview.address {
                    let _ = writeln!(text, "Address: {address}");
                }
            }
        }
        Some(Outcome::Submitted(ack)) => {
            text.push_str(ack.message.as_deref().unwrap_or("Registration submitted"));
            text.push('\n');
        }
        None => {}
    }

    let flags = progress.flags;
    let _ = write!(
        text,
        "Step: {}\n  mobile verified:  {}\n  email verified:   {}\n  aadhaar verified: {}\n  pan verified:     {}\n  terms accepted:   {}",
        progress.step,
        mark(flags.sms_verified),
        mark(flags.email_verified),
        mark(flags.aadhaar_verified),
        mark(flags.pan_verified),
        mark(flags.terms_accepted),
    );

    if let Some(next) = progress.next {
        let _ = write!(text, "\nNext step available: {next} (run `kycflow register advance`)");
    }

    text
}

fn verdict(verified: bool, message: Option<&str>) -> String {
    match (verified, message) {
        (true, _) => "Verified".to_string(),
        (false, Some(message)) => format!("Not verified: {message}"),
        (false, None) => "Not verified".to_string(),
    }
}

const fn mark(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_progress() {
        let flow = RegistrationFlow::new();
        let progress = Progress::new(
            &flow,
            Some(Outcome::Otp(OtpVerification {
                verified: false,
                message: Some("Invalid OTP".to_string()),
            })),
        );

        let text = describe(&progress);
        assert!(text.starts_with("Not verified: Invalid OTP\nStep: step-1"));
        assert!(text.contains("mobile verified:  no"));
        assert!(!text.contains("Next step available"));
    }

    #[test]
    fn test_profile_args_fall_back_to_prefill() {
        let prefill = ProfileForm {
            name: "ASHA RAO".to_string(),
            address: "221 MG Road".to_string(),
            ..ProfileForm::default()
        };
        let args = ProfileArgs {
            address: Some("12 Residency Road".to_string()),
            city: "Bengaluru".to_string(),
            pincode: "560025".to_string(),
            ..ProfileArgs::default()
        };

        let form = args.into_form(prefill);
        assert_eq!(form.name, "ASHA RAO");
        assert_eq!(form.address, "12 Residency Road");
        assert_eq!(form.city, "Bengaluru");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_progress_json() -> Result<(), serde_json::Error> {
        let progress = Progress::new(&RegistrationFlow::new(), None);
        let value = serde_json::to_value(&progress)?;
        assert_eq!(value["step"], "contact");
        assert_eq!(value["flags"]["sms_verified"], false);
        assert!(value["next"].is_null());
        assert!(value.get("outcome").is_none());
        Ok(())
    }
}
