pub mod login;
pub mod recover;
pub mod register;
pub mod reset;
pub mod sandbox;
pub mod status;

mod context;
mod run;

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Recover(recover::Args),
    Reset(reset::Args),
    Register(register::Args),
    Status(status::Args),
    Sandbox(sandbox::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
