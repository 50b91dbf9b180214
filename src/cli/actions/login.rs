use crate::{
    cli::{actions::context::PortalContext, globals::GlobalArgs},
    portal::{
        client::LoginOutcome,
        flow::LoginFlow,
        routes::Route,
    },
};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub username: String,
    pub password: SecretString,
}

/// Execute the login action.
/// # Errors
/// Returns an error if the credentials are rejected or the state cannot be saved.
pub async fn execute(args: Args) -> Result<()> {
    let mut portal = PortalContext::open(&args.globals)?;
    portal.state.route = Route::Login;

    let mut flow = LoginFlow::new();
    let result = flow
        .submit(
            &portal.client,
            &mut portal.state.session,
            &args.username,
            args.password.expose_secret(),
        )
        .await
        .map(|route| {
            portal.state.route = route;
            flow.state().success().cloned()
        });

    portal.finish(result, describe)
}

fn describe(outcome: &Option<LoginOutcome>) -> String {
    match outcome {
        Some(LoginOutcome::PasswordResetRequired { message, .. }) => format!(
            "{}. Run `kycflow reset initiate` to set a new password.",
            message.as_deref().unwrap_or("Password reset required")
        ),
        Some(LoginOutcome::Authenticated(success)) => {
            let mut text = format!(
                "Signed in as {}",
                success.user_id.as_deref().unwrap_or("retailer")
            );
            if let Some(last) = &success.last_login_time {
                text.push_str(&format!(", last login {last}"));
            }
            text
        }
        None => "Signed in".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::client::LoginSuccess;

    #[test]
    fn test_describe() {
        let reset = Some(LoginOutcome::PasswordResetRequired {
            user_id: Some("USR1".to_string()),
            message: None,
        });
        assert!(describe(&reset).starts_with("Password reset required."));

        let signed_in = Some(LoginOutcome::Authenticated(LoginSuccess {
            user_id: Some("USR2".to_string()),
            message: None,
            last_login_time: None,
            device: None,
            ip: None,
            permissions: None,
        }));
        assert_eq!(describe(&signed_in), "Signed in as USR2");
    }
}
