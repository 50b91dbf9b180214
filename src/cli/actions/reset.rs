use crate::{
    cli::{actions::context::PortalContext, globals::GlobalArgs},
    portal::{flow::ResetPasswordFlow, routes::Route},
};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub enum Step {
    Initiate,
    Confirm { otp: String, password: SecretString },
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub step: Step,
}

/// Execute a password reset step.
/// # Errors
/// Returns an error if no login asked for a reset, the OTP is rejected or the
/// state cannot be saved.
pub async fn execute(args: Args) -> Result<()> {
    let mut portal = PortalContext::open(&args.globals)?;
    portal.state.route = Route::ResetPassword;

    let mut flow = ResetPasswordFlow::new();
    match args.step {
        Step::Initiate => {
            let result = flow
                .initiate(&portal.client, &mut portal.state.session)
                .await;
            portal.finish(result, |issued| {
                let mut text = issued
                    .message
                    .clone()
                    .unwrap_or_else(|| "Reset OTP sent".to_string());
                if let Some(code) = &issued.otp_code {
                    text.push_str(&format!(" (OTP {code})"));
                }
                text
            })
        }
        Step::Confirm { otp, password } => {
            let result = flow
                .confirm(
                    &portal.client,
                    &mut portal.state.session,
                    &otp,
                    password.expose_secret(),
                )
                .await
                .map(|route| {
                    portal.state.route = route;
                    flow.confirm_state().success().cloned().unwrap_or_default()
                });
            portal.finish(result, |ack| {
                ack.message
                    .clone()
                    .unwrap_or_else(|| "Password updated, sign in again".to_string())
            })
        }
    }
}
