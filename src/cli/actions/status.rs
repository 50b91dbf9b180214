use crate::{
    cli::{actions::context::PortalContext, globals::GlobalArgs},
    portal::{
        flow::{FlowError, StepFlags},
        routes::RegistrationStep,
        store::PortalState,
    },
};
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

/// Saved state as shown to the user. Secrets stay out.
#[derive(Debug, Serialize)]
struct Summary {
    authenticated: bool,
    user_id: Option<String>,
    urn: Option<String>,
    step: RegistrationStep,
    flags: StepFlags,
    next: Option<RegistrationStep>,
    pan_registered_name: Option<String>,
}

impl From<&PortalState> for Summary {
    fn from(state: &PortalState) -> Self {
        Self {
            authenticated: state.session.is_authenticated(),
            user_id: state.session.user_id().map(ToString::to_string),
            urn: state.session.urn().map(ToString::to_string),
            step: state.registration.step(),
            flags: state.registration.flags(),
            next: state.registration.next_step_link(),
            pan_registered_name: state.session.pan_registered_name().map(ToString::to_string),
        }
    }
}

/// Execute the status action. No request is made.
/// # Errors
/// Returns an error if the saved state cannot be read.
pub fn execute(args: Args) -> Result<()> {
    let portal = PortalContext::open(&args.globals)?;
    let summary = Summary::from(&portal.state);
    portal.finish(Ok::<_, FlowError>(summary), describe)
}

fn describe(summary: &Summary) -> String {
    let mut text = format!(
        "Signed in: {}",
        if summary.authenticated { "yes" } else { "no" }
    );
    if let Some(user_id) = &summary.user_id {
        let _ = write!(text, " ({user_id})");
    }
    let _ = write!(text, "\nRegistration: {}", summary.step);
    if let Some(urn) = &summary.urn {
        let _ = write!(text, ", URN {urn}");
    }
    if let Some(name) = &summary.pan_registered_name {
        let _ = write!(text, "\nPAN holder: {name}");
    }
    let missing = summary.flags.missing(summary.step);
    if !missing.is_empty() {
        let _ = write!(text, "\nStill missing: {}", missing.join(", "));
    }
    if let Some(next) = summary.next {
        let _ = write!(text, "\nNext step available: {next}");
    }
    text
}
