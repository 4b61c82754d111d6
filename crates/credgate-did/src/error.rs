use credgate_crypto::CryptoError;

/// DID parsing and resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("malformed DID: {0}")]
    MalformedDid(String),

    #[error("unsupported DID method: {0}")]
    UnsupportedMethod(String),

    #[error("no DID methods configured for local resolver")]
    EmptyMethodSet,

    #[error("no resolution source configured: need local methods or a universal resolver URL")]
    NoResolutionSource,

    #[error("invalid universal resolver URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("universal resolver at {url} is unhealthy: {reason}")]
    UnhealthyResolver { url: String, reason: String },

    #[error("unable to resolve DID: {0}")]
    UnresolvableDid(String),

    #[error("invalid DID for method: {0}")]
    InvalidDid(String),

    #[error("resolution of {did} failed: {reason}")]
    Resolution { did: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Errors extracting a public key from a resolved document.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("DID document is empty")]
    EmptyDocument,

    #[error("key reference is empty")]
    MissingKeyReference,

    #[error("DID document {0} has no verification methods")]
    NoVerificationMethods(String),

    #[error("key {key_ref} not found in DID document {did}")]
    KeyNotFound { did: String, key_ref: String },

    #[error("invalid multibase key: {0}")]
    InvalidMultibase(String),

    #[error("verification method {0} has no supported key material")]
    NoKeyMaterial(String),

    #[error("{context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: CryptoError,
    },
}
