//! End-to-end portal workflows against the in-process sandbox API.
//!
//! Each test:
//! 1. Binds a sandbox on an ephemeral localhost port.
//! 2. Drives the portal flows through a real `VerificationClient`.
//! 3. Checks the session, the verification flags and the route handed back.

use anyhow::{bail, Context, Result};
use kycflow::{
    portal::{
        client::{ClientConfig, ClientError, LoginOutcome, VerificationClient},
        flow::{FlowError, LoginFlow, ProfileForm, RegistrationFlow, ResetPasswordFlow},
        routes::{RegistrationStep, Route},
        session::VerificationSession,
    },
    sandbox::{self, SANDBOX_OTP},
};
use std::{future::pending, net::TcpListener as StdTcpListener, time::Duration};
use tokio::{net::TcpListener, task::JoinHandle};

const MOBILE: &str = "9876543210";
const EMAIL: &str = "retailer@example.com";
const AADHAAR: &str = "234567890123";
const PAN: &str = "ABCDE1234F";

struct Sandbox {
    url: String,
    handle: JoinHandle<Result<()>>,
}

impl Sandbox {
    async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind sandbox listener")?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(sandbox::serve(listener, pending()));

        Ok(Self {
            url: format!("http://{addr}"),
            handle,
        })
    }

    fn client(&self) -> Result<VerificationClient> {
        VerificationClient::new(&ClientConfig::new(self.url.clone()).with_timeout(Duration::from_secs(5)))
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn can_bind_localhost() -> bool {
    StdTcpListener::bind("127.0.0.1:0").is_ok()
}

/// Walk the contact step up to a verified mobile and email.
async fn complete_contact(
    flow: &mut RegistrationFlow,
    client: &VerificationClient,
    session: &mut VerificationSession,
) -> Result<()> {
    flow.send_mobile_otp(client, session, MOBILE).await?;
    let mobile = flow.verify_mobile_otp(client, session, SANDBOX_OTP).await?;
    if !mobile.verified {
        bail!("mobile OTP was not verified: {:?}", mobile.message);
    }

    flow.send_email_otp(client, session, EMAIL).await?;
    let email = flow.verify_email_otp(client, session, SANDBOX_OTP).await?;
    if !email.verified {
        bail!("email OTP was not verified: {:?}", email.message);
    }
    Ok(())
}

#[tokio::test]
async fn mobile_otp_yields_urn_and_unlocks_email() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping sandbox test: cannot bind to localhost in this environment.");
        return Ok(());
    }

    let sandbox = Sandbox::start().await?;
    let client = sandbox.client()?;
    let mut session = VerificationSession::new();
    let mut flow = RegistrationFlow::new();

    let issued = flow.send_mobile_otp(&client, &mut session, MOBILE).await?;
    assert_eq!(issued.otp_code.as_deref(), Some(SANDBOX_OTP));
    assert!(session.registration_ref().is_some());
    assert!(session.urn().is_none());

    let verification = flow
        .verify_mobile_otp(&client, &mut session, SANDBOX_OTP)
        .await?;
    assert!(verification.verified);
    assert!(flow.flags().sms_verified);
    assert!(session.urn().is_some_and(|urn| urn.starts_with("URN")));

    let email = flow.send_email_otp(&client, &mut session, EMAIL).await?;
    assert_eq!(email.otp_code.as_deref(), Some(SANDBOX_OTP));
    assert!(session.email_otp_ref().is_some());
    Ok(())
}

#[tokio::test]
async fn wrong_otp_is_not_verified() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping sandbox test: cannot bind to localhost in this environment.");
        return Ok(());
    }

    let sandbox = Sandbox::start().await?;
    let client = sandbox.client()?;
    let mut session = VerificationSession::new();
    let mut flow = RegistrationFlow::new();

    flow.send_mobile_otp(&client, &mut session, MOBILE).await?;
    let flags = flow.flags();

    let verification = flow
        .verify_mobile_otp(&client, &mut session, "654321")
        .await?;
    assert!(!verification.verified);
    assert_eq!(verification.message.as_deref(), Some("Invalid OTP"));
    assert_eq!(flow.flags(), flags);
    assert!(session.urn().is_none());
    assert_eq!(flow.next_step_link(), None);
    Ok(())
}

#[tokio::test]
async fn full_registration_reaches_success() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping sandbox test: cannot bind to localhost in this environment.");
        return Ok(());
    }

    let sandbox = Sandbox::start().await?;
    let client = sandbox.client()?;
    let mut session = VerificationSession::new();
    let mut flow = RegistrationFlow::new();

    complete_contact(&mut flow, &client, &mut session).await?;
    assert_eq!(flow.next_step_link(), Some(RegistrationStep::Kyc));
    assert_eq!(flow.advance()?, Route::Register(RegistrationStep::Kyc));

    flow.send_aadhaar_otp(&client, &mut session, AADHAAR).await?;
    assert_eq!(flow.next_step_link(), None);
    let aadhaar = flow
        .verify_aadhaar_otp(&client, &mut session, SANDBOX_OTP)
        .await?;
    assert!(aadhaar.verified);
    assert_eq!(flow.next_step_link(), None);

    let pan = flow.verify_pan(&client, &mut session, PAN).await?;
    assert!(pan.verified);
    assert_eq!(session.pan_registered_name(), Some("SANDBOX RETAILER"));
    assert_eq!(flow.next_step_link(), Some(RegistrationStep::Profile));
    assert_eq!(flow.advance()?, Route::Register(RegistrationStep::Profile));

    let mut profile = ProfileForm::prefilled(&session);
    assert_eq!(profile.name, "SANDBOX RETAILER");
    assert_eq!(profile.address, "221 MG Road, Bengaluru 560001");

    let incomplete = flow.submit(&client, &mut session, &profile, true).await;
    assert!(matches!(
        incomplete,
        Err(FlowError::Client(ClientError::Validation(_)))
    ));

    profile.city = "Bengaluru".to_string();
    profile.pincode = "560001".to_string();
    let refused = flow.submit(&client, &mut session, &profile, false).await;
    assert!(matches!(
        refused,
        Err(FlowError::Client(ClientError::Validation(_)))
    ));
    assert_eq!(flow.step(), RegistrationStep::Profile);
    assert!(!flow.flags().terms_accepted);

    let ack = flow.submit(&client, &mut session, &profile, true).await?;
    assert!(ack
        .message
        .as_deref()
        .is_some_and(|message| message.contains("your username is RA")));
    assert_eq!(flow.step(), RegistrationStep::Complete);
    assert_eq!(flow.route(), Route::Success);
    Ok(())
}

#[tokio::test]
async fn kyc_actions_locked_until_contact_done() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping sandbox test: cannot bind to localhost in this environment.");
        return Ok(());
    }

    let sandbox = Sandbox::start().await?;
    let client = sandbox.client()?;
    let mut session = VerificationSession::new();
    let mut flow = RegistrationFlow::new();

    let locked = flow.send_aadhaar_otp(&client, &mut session, AADHAAR).await;
    assert!(matches!(
        locked,
        Err(FlowError::StepLocked {
            current: RegistrationStep::Contact,
            ..
        })
    ));

    let gate = flow.advance();
    assert!(matches!(gate, Err(FlowError::Gate { ref missing, .. }) if missing.len() == 2));
    Ok(())
}

#[tokio::test]
async fn short_username_rejected_before_request() -> Result<()> {
    // Nothing listens on port 1; a request would surface as a transport error.
    let client = VerificationClient::new(&ClientConfig::new("http://127.0.0.1:1"))?;
    let mut session = VerificationSession::new();
    let mut flow = LoginFlow::new();

    let result = flow
        .submit(&client, &mut session, "RA17", "Password@123")
        .await;
    let Err(FlowError::Client(err)) = result else {
        bail!("expected a client error");
    };
    assert!(err.is_local());
    assert!(err.to_string().contains("Enter your username"));
    assert!(flow.state().failure().is_some());
    Ok(())
}

#[tokio::test]
async fn stale_token_redirects_to_login() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping sandbox test: cannot bind to localhost in this environment.");
        return Ok(());
    }

    let issuer = Sandbox::start().await?;
    let mut session = VerificationSession::new();
    let route = LoginFlow::new()
        .submit(&issuer.client()?, &mut session, "RA176900435", "Password@123")
        .await?;
    assert_eq!(route, Route::Login);
    assert!(session.is_authenticated());

    // A second sandbox never issued this token.
    let other = Sandbox::start().await?;
    let mut flow = RegistrationFlow::new();
    let result = flow
        .send_mobile_otp(&other.client()?, &mut session, MOBILE)
        .await;

    let Err(err) = result else {
        bail!("expected the unknown token to be rejected");
    };
    assert!(matches!(err, FlowError::Client(ClientError::Unauthorized)));
    assert_eq!(err.redirect(), Some(Route::Login));
    assert!(!session.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn reset_required_login_then_reset() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping sandbox test: cannot bind to localhost in this environment.");
        return Ok(());
    }

    let sandbox = Sandbox::start().await?;
    let client = sandbox.client()?;
    let mut session = VerificationSession::new();

    let mut login = LoginFlow::new();
    let route = login
        .submit(&client, &mut session, "RA100000001", "Password@123")
        .await?;
    assert_eq!(route, Route::ResetPassword);
    assert!(matches!(
        login.state().success(),
        Some(LoginOutcome::PasswordResetRequired { .. })
    ));
    assert!(session.user_id().is_some());

    let mut reset = ResetPasswordFlow::new();
    let issued = reset.initiate(&client, &mut session).await?;
    assert_eq!(issued.otp_code.as_deref(), Some(SANDBOX_OTP));

    let weak = reset
        .confirm(&client, &mut session, SANDBOX_OTP, "short")
        .await;
    assert!(matches!(
        weak,
        Err(FlowError::Client(ClientError::Validation(_)))
    ));

    let route = reset
        .confirm(&client, &mut session, SANDBOX_OTP, "NewPass@123")
        .await?;
    assert_eq!(route, Route::Login);

    let route = LoginFlow::new()
        .submit(&client, &mut session, "RA100000001", "NewPass@123")
        .await?;
    assert_eq!(route, Route::Login);
    assert!(session.is_authenticated());
    Ok(())
}
