use super::{track, Control, FlowError, Submission};
use crate::portal::{
    client::{LoginOutcome, VerificationClient},
    routes::Route,
    session::VerificationSession,
};
use tracing::info;

#[derive(Debug, Default)]
pub struct LoginFlow {
    state: Submission<LoginOutcome>,
    in_flight: Option<Control>,
}

impl LoginFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &Submission<LoginOutcome> {
        &self.state
    }

    /// Sign in and return the page to show next: the reset page when the
    /// account must change its password, otherwise the login page itself.
    ///
    /// # Errors
    /// Returns a [`FlowError`] on invalid input or a failed call; the
    /// failure message is also kept in [`Self::state`].
    pub async fn submit(
        &mut self,
        client: &VerificationClient,
        session: &mut VerificationSession,
        username: &str,
        password: &str,
    ) -> Result<Route, FlowError> {
        let outcome = track(
            &mut self.state,
            &mut self.in_flight,
            Control::Login,
            client.login(session, username, password),
        )
        .await?;

        Ok(match outcome {
            LoginOutcome::PasswordResetRequired { .. } => {
                info!("login requires a password reset");
                Route::ResetPassword
            }
            LoginOutcome::Authenticated(_) => Route::Login,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::client::{ClientConfig, ClientError};
    use anyhow::{anyhow, Result};
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[tokio::test]
    async fn short_username_fails_without_request() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = VerificationClient::new(&ClientConfig::new(server.uri()))?;
        let mut session = VerificationSession::new();
        let mut flow = LoginFlow::new();

        let err = flow
            .submit(&client, &mut session, "RA17", "Password@123")
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;
        assert!(matches!(err, FlowError::Client(ClientError::Validation(_))));
        assert!(flow.state().failure().is_some_and(|m| m.contains("Enter your username")));
        Ok(())
    }

    #[tokio::test]
    async fn reset_required_routes_to_reset_page() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/secure/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 1001,
                "user_id": "user-1001"
            })))
            .mount(&server)
            .await;

        let client = VerificationClient::new(&ClientConfig::new(server.uri()))?;
        let mut session = VerificationSession::new();
        let mut flow = LoginFlow::new();

        let route = flow
            .submit(&client, &mut session, "RA100000001", "Password@123")
            .await?;
        assert_eq!(route, Route::ResetPassword);
        assert_eq!(session.user_id(), Some("user-1001"));
        assert!(matches!(
            flow.state().success(),
            Some(LoginOutcome::PasswordResetRequired { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn rejected_credentials_keep_message() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/secure/login"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": 400,
                "message": "Invalid username or password"
            })))
            .mount(&server)
            .await;

        let client = VerificationClient::new(&ClientConfig::new(server.uri()))?;
        let mut session = VerificationSession::new();
        let mut flow = LoginFlow::new();

        let result = flow
            .submit(&client, &mut session, "RA176900435", "wrong-pass")
            .await;
        assert!(result.is_err());
        assert_eq!(
            flow.state().failure(),
            Some("Invalid username or password")
        );
        assert!(!session.is_authenticated());
        Ok(())
    }
}
