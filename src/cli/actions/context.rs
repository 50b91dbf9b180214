use crate::{
    cli::globals::GlobalArgs,
    portal::{
        client::{ApiResponse, VerificationClient},
        flow::FlowError,
        store::{FileSessionStore, PortalState, SessionStore},
    },
};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

/// What a command prints: its result plus the page to show next.
#[derive(Debug, Serialize)]
struct Report<T> {
    page: String,
    result: T,
}

/// Saved state and a client, loaded before a command and saved after it.
pub(super) struct PortalContext {
    store: FileSessionStore,
    json: bool,
    pub(super) state: PortalState,
    pub(super) client: VerificationClient,
}

impl PortalContext {
    pub(super) fn open(globals: &GlobalArgs) -> Result<Self> {
        let store = globals.store();
        let state = store.load()?;
        let client = VerificationClient::new(&globals.client_config())?;

        debug!(page = %state.route, api = client.base_url(), "portal state loaded");

        Ok(Self {
            store,
            json: globals.json,
            state,
            client,
        })
    }

    /// Save the state and print the outcome. A failure is printed and then
    /// returned so the process exits non-zero.
    pub(super) fn finish<T, F>(mut self, result: Result<T, FlowError>, render: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        if let Some(route) = result.as_ref().err().and_then(FlowError::redirect) {
            warn!(page = %route, "session expired, redirecting");
            self.state.route = route;
        }

        self.store.save(&self.state)?;

        let page = self.state.route;
        let response = ApiResponse::from(result.map(|result| Report {
            page: page.path(),
            result,
        }));

        if self.json {
            let output =
                serde_json::to_string_pretty(&response).context("Failed to encode response")?;
            println!("{output}");
        } else if let Some(report) = &response.data {
            println!("{}", render(&report.result));
            println!("Next page: {page}");
        }

        response.error.map_or(Ok(()), |error| Err(anyhow!(error)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::{client::ClientError, routes::Route};
    use anyhow::Result;
    use secrecy::SecretString;

    fn globals(dir: &tempfile::TempDir) -> GlobalArgs {
        GlobalArgs::new(
            "http://127.0.0.1:1".to_string(),
            dir.path().join("state.json"),
        )
    }

    #[test]
    fn finish_saves_state() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let globals = globals(&dir);

        let mut portal = PortalContext::open(&globals)?;
        portal.state.route = Route::ForgotUsername;
        portal.finish(Ok::<_, FlowError>("done"), ToString::to_string)?;

        let state = globals.store().load()?;
        assert_eq!(state.route, Route::ForgotUsername);
        Ok(())
    }

    #[test]
    fn unauthorized_redirects_to_login() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let globals = globals(&dir);

        let mut state = PortalState {
            route: Route::ResetPassword,
            ..PortalState::default()
        };
        state.session.set_auth_token(SecretString::from("stale".to_string()));
        globals.store().save(&state)?;

        let portal = PortalContext::open(&globals)?;
        let result: Result<(), FlowError> = Err(ClientError::Unauthorized.into());
        let err = portal.finish(result, |_| String::new()).err();
        assert_eq!(
            err.map(|e| e.to_string()),
            Some("Session expired. Please sign in again.".to_string())
        );

        assert_eq!(globals.store().load()?.route, Route::Login);
        Ok(())
    }
}
