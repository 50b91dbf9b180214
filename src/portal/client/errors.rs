use crate::portal::{routes::Route, validators::ValidationError};

/// Everything a remote verification call can fail with.
///
/// `Validation` and `MissingReference` are produced locally before any request
/// is sent.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("missing reference `{reference}`: {hint}")]
    MissingReference {
        reference: &'static str,
        hint: &'static str,
    },
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("Session expired. Please sign in again.")]
    Unauthorized,
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("Unable to reach the server: {0}")]
    Transport(String),
    #[error("Unexpected response: {0}")]
    Parse(String),
}

impl ClientError {
    pub(crate) const fn missing(reference: &'static str, hint: &'static str) -> Self {
        Self::MissingReference { reference, hint }
    }

    /// Page the user must be sent to, overriding local error handling.
    #[must_use]
    pub const fn redirect(&self) -> Option<Route> {
        match self {
            Self::Unauthorized => Some(Route::Login),
            _ => None,
        }
    }

    /// True for errors raised before any request left the process.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::MissingReference { .. })
    }
}
