use crate::{
    cli::{actions::context::PortalContext, globals::GlobalArgs},
    portal::{
        flow::{PasswordRecoveryFlow, UsernameRecoveryFlow},
        routes::Route,
    },
};
use anyhow::Result;

#[derive(Debug)]
pub enum Target {
    Username { mobile: String },
    Password { username: String },
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub target: Target,
}

/// Execute a recovery action.
/// # Errors
/// Returns an error if the request is rejected or the state cannot be saved.
pub async fn execute(args: Args) -> Result<()> {
    let mut portal = PortalContext::open(&args.globals)?;

    match args.target {
        Target::Username { mobile } => {
            portal.state.route = Route::ForgotUsername;
            let result = UsernameRecoveryFlow::new()
                .submit(&portal.client, &mut portal.state.session, &mobile)
                .await;
            portal.finish(result, |recovery| {
                recovery
                    .message
                    .clone()
                    .unwrap_or_else(|| "Username sent to the registered mobile".to_string())
            })
        }
        Target::Password { username } => {
            portal.state.route = Route::ForgotPassword;
            let result = PasswordRecoveryFlow::new()
                .submit(&portal.client, &mut portal.state.session, &username)
                .await;
            portal.finish(result, |ack| {
                ack.message
                    .clone()
                    .unwrap_or_else(|| "Password reset link sent".to_string())
            })
        }
    }
}
