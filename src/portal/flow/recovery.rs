use super::{track, Control, FlowError, Submission};
use crate::portal::{
    client::{Ack, OtpIssued, UsernameRecovery, VerificationClient},
    routes::Route,
    session::VerificationSession,
};
use tracing::info;

/// "Forgot username" page.
#[derive(Debug, Default)]
pub struct UsernameRecoveryFlow {
    state: Submission<UsernameRecovery>,
    in_flight: Option<Control>,
}

impl UsernameRecoveryFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &Submission<UsernameRecovery> {
        &self.state
    }

    /// # Errors
    /// Returns a [`FlowError`] on invalid input or a failed call.
    pub async fn submit(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        mobile: &str,
    ) -> Result<UsernameRecovery, FlowError> {
        track(
            &mut self.state,
            &mut self.in_flight,
            Control::RecoverUsername,
            client.recover_username(session, mobile),
        )
        .await
    }
}

/// "Forgot password" page: sends a reset link to the registered contacts.
#[derive(Debug, Default)]
pub struct PasswordRecoveryFlow {
    state: Submission<Ack>,
    in_flight: Option<Control>,
}

impl PasswordRecoveryFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &Submission<Ack> {
        &self.state
    }

    /// # Errors
    /// Returns a [`FlowError`] on invalid input or a failed call.
    pub async fn submit(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        username: &str,
    ) -> Result<Ack, FlowError> {
        track(
            &mut self.state,
            &mut self.in_flight,
            Control::RecoverPassword,
            client.request_password_reset_link(session, username),
        )
        .await
    }
}

/// Reset page reached after a login demanded a new password. The OTP is
/// requested when the page opens, then confirmed together with the new
/// password.
#[derive(Debug, Default)]
pub struct ResetPasswordFlow {
    initiate: Submission<OtpIssued>,
    confirm: Submission<Ack>,
    in_flight: Option<Control>,
}

impl ResetPasswordFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn initiate_state(&self) -> &Submission<OtpIssued> {
        &self.initiate
    }

    #[must_use]
    pub const fn confirm_state(&self) -> &Submission<Ack> {
        &self.confirm
    }

    /// # Errors
    /// Returns a [`FlowError`] when no account is known or the call fails.
    pub async fn initiate(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
    ) -> Result<OtpIssued, FlowError> {
        track(
            &mut self.initiate,
            &mut self.in_flight,
            Control::InitiateReset,
            client.initiate_password_reset(session),
        )
        .await
    }

    /// Confirm the reset. On success the user is sent back to the login page.
    ///
    /// # Errors
    /// Returns a [`FlowError`] on invalid input, before [`Self::initiate`]
    /// succeeded, or when the call fails.
    pub async fn confirm(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        otp: &str,
        password: &str,
    ) -> Result<Route, FlowError> {
        track(
            &mut self.confirm,
            &mut self.in_flight,
            Control::ConfirmReset,
            client.confirm_password_reset(session, otp, password),
        )
        .await?;
        info!("password reset confirmed");
        Ok(Route::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::client::ClientConfig;
    use anyhow::{anyhow, Result};
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[tokio::test]
    async fn username_recovery_returns_username() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/secure/username-forgot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "username": "RA176900435",
                "message": "Username sent to your mobile"
            })))
            .mount(&server)
            .await;

        let client = VerificationClient::new(&ClientConfig::new(server.uri()))?;
        let mut session = VerificationSession::new();
        let mut flow = UsernameRecoveryFlow::new();

        let recovery = flow.submit(&client, &mut session, "9876543210").await?;
        assert_eq!(recovery.username.as_deref(), Some("RA176900435"));
        Ok(())
    }

    #[tokio::test]
    async fn password_link_failure_is_kept() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/secure/forgot-password"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "User not found"
            })))
            .mount(&server)
            .await;

        let client = VerificationClient::new(&ClientConfig::new(server.uri()))?;
        let mut session = VerificationSession::new();
        let mut flow = PasswordRecoveryFlow::new();

        let result = flow.submit(&client, &mut session, "nobody").await;
        assert!(result.is_err());
        assert_eq!(flow.state().failure(), Some("User not found"));
        Ok(())
    }

    #[tokio::test]
    async fn reset_confirm_routes_to_login() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/secure/reset-password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "ref_id": "ref-reset",
                "otp_code": "123456"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/secure/verify-otp-password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "message": "Password updated"
            })))
            .mount(&server)
            .await;

        let client = VerificationClient::new(&ClientConfig::new(server.uri()))?;
        let mut session = VerificationSession::new();
        session.set_user_id("user-1001".to_string());
        let mut flow = ResetPasswordFlow::new();

        let short = flow
            .confirm(&client, &mut session, "123456", "short")
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;
        assert!(short.to_string().contains("at least 8"));

        let issued = flow.initiate(&client, &mut session).await?;
        assert_eq!(issued.otp_code.as_deref(), Some("123456"));

        let route = flow
            .confirm(&client, &mut session, "123456", "N3wPassword!")
            .await?;
        assert_eq!(route, Route::Login);
        assert!(flow.confirm_state().success().is_some());
        Ok(())
    }
}
