use crate::cli::actions::{login, recover, register, reset, sandbox, status, Action};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => login::execute(args).await,
        Action::Recover(args) => recover::execute(args).await,
        Action::Reset(args) => reset::execute(args).await,
        Action::Register(args) => register::execute(args).await,
        Action::Status(args) => status::execute(args),
        Action::Sandbox(args) => sandbox::execute(args).await,
    }
}
