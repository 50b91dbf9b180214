use anyhow::Result;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
}

/// Execute the sandbox action.
/// # Errors
/// Returns an error if the listener cannot be bound.
pub async fn execute(args: Args) -> Result<()> {
    info!(port = args.port, "starting sandbox identity API");
    crate::sandbox::new(args.port).await
}
