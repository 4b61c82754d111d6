/// Cryptographic and encoding errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("invalid multibase value: {0}")]
    InvalidMultibase(String),

    #[error("invalid JWK: {0}")]
    InvalidJwk(String),

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
