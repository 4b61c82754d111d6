use credgate_crypto::CryptoError;
use credgate_did::{KeyError, ResolverError};

/// Presentation exchange errors.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("invalid presentation definition: {0}")]
    InvalidDefinition(String),

    #[error("malformed presentation: {0}")]
    MalformedPresentation(String),

    #[error("presentation has no presentation submission")]
    MissingSubmission,

    #[error("submission is for definition {actual}, expected {expected}")]
    DefinitionMismatch { expected: String, actual: String },

    #[error("submission references unknown input descriptor {0}")]
    UnknownDescriptor(String),

    #[error("input descriptor {0} is not fulfilled by the submission")]
    UnfulfilledDescriptor(String),

    #[error("unsupported claim format for input descriptor {descriptor}: {format}")]
    UnsupportedFormat { descriptor: String, format: String },

    #[error("invalid JSONPath {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("credential for input descriptor {descriptor} failed verification: {reason}")]
    CredentialVerification { descriptor: String, reason: String },

    #[error("credential for input descriptor {descriptor} does not satisfy constraints: {reason}")]
    ConstraintsNotSatisfied { descriptor: String, reason: String },

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("resolver error: {0}")]
    Resolver(#[from] ResolverError),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("serialization error: {0}")]
    Serialization(String),
}
