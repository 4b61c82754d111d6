use credgate_did::ResolverError;
use credgate_exchange::ExchangeError;

use crate::handler::HandlerError;
use crate::state::GateState;

/// Gate construction and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to create resolver: {0}")]
    Resolver(#[source] ResolverError),

    #[error("parsing VP from JWT: {0}")]
    InvalidToken(#[source] ExchangeError),

    #[error("duplicate submission data for input descriptor ID {0}")]
    DuplicateSubmissionData(String),

    #[error("missing submission data for input descriptor ID {0}")]
    MissingSubmissionData(String),

    #[error("custom handler for input descriptor ID {descriptor} failed: {source}")]
    Handler {
        descriptor: String,
        #[source]
        source: HandlerError,
    },

    #[error("invalid gate state transition from {from} to {to}")]
    InvalidStateTransition { from: GateState, to: GateState },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("settings serialization error: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),

    #[error("presentation definition parse error: {0}")]
    DefinitionParse(#[from] serde_json::Error),

    #[error("logging initialisation failed: {0}")]
    Logging(String),
}
