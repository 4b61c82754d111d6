//! Credgate Gate
//!
//! Admits callers whose verifiable presentation satisfies a presentation
//! definition and every configured custom handler.

pub mod config;
pub mod error;
pub mod gate;
pub mod handler;
pub mod state;

pub use config::{GateConfig, GateSettings, LoggingConfig, ResolverSettings};
pub use error::GateError;
pub use gate::{CredentialGate, GateResult, LOCAL_RESOLUTION_METHODS};
pub use handler::{CustomHandler, HandlerError, SubmissionHandler};
pub use state::{GateEvent, GateState, GateStateMachine};
