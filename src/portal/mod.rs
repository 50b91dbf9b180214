//! Client side of the retail portal: validators, the remote verification
//! client, the page state machines and session persistence.

pub mod client;
pub mod flow;
pub mod routes;
pub mod session;
pub mod store;
pub mod validators;

pub use client::{ApiResponse, ClientConfig, ClientError, VerificationClient};
pub use flow::{FlowError, RegistrationFlow};
pub use routes::{RegistrationStep, Route};
pub use session::{Channel, VerificationSession};
pub use store::{FileSessionStore, MemorySessionStore, PortalState, SessionStore};
