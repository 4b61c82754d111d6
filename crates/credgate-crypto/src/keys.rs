use std::fmt;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use crate::error::CryptoError;
use crate::multikey;

/// Multicodec for an Ed25519 public key.
pub const ED25519_PUB_CODEC: u64 = 0xed;
/// Multicodec for an X25519 public key.
pub const X25519_PUB_CODEC: u64 = 0xec;
/// Multicodec for a compressed secp256k1 public key.
pub const SECP256K1_PUB_CODEC: u64 = 0xe7;
/// Multicodec for a compressed P-256 public key.
pub const P256_PUB_CODEC: u64 = 0x1200;

/// Supported public key algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Ed25519 signing key.
    Ed25519,
    /// X25519 key agreement key.
    X25519,
    /// secp256k1 ECDSA signing key.
    Secp256k1,
    /// NIST P-256 ECDSA signing key.
    P256,
}

impl KeyType {
    /// Multicodec identifier used in multikey encodings.
    pub fn multicodec(&self) -> u64 {
        match self {
            Self::Ed25519 => ED25519_PUB_CODEC,
            Self::X25519 => X25519_PUB_CODEC,
            Self::Secp256k1 => SECP256K1_PUB_CODEC,
            Self::P256 => P256_PUB_CODEC,
        }
    }

    /// Key type for a multicodec identifier.
    pub fn from_multicodec(codec: u64) -> Option<Self> {
        match codec {
            ED25519_PUB_CODEC => Some(Self::Ed25519),
            X25519_PUB_CODEC => Some(Self::X25519),
            SECP256K1_PUB_CODEC => Some(Self::Secp256k1),
            P256_PUB_CODEC => Some(Self::P256),
            _ => None,
        }
    }

    /// Key type implied by a verification method `type` tag.
    ///
    /// Generic tags (`Multikey`, `JsonWebKey2020`) carry no key type and
    /// return `None`.
    pub fn from_verification_method_type(method_type: &str) -> Option<Self> {
        match method_type {
            "Ed25519VerificationKey2018" | "Ed25519VerificationKey2020" => Some(Self::Ed25519),
            "X25519KeyAgreementKey2019" | "X25519KeyAgreementKey2020" => Some(Self::X25519),
            "EcdsaSecp256k1VerificationKey2019" | "EcdsaSecp256k1RecoveryMethod2020" => {
                Some(Self::Secp256k1)
            }
            "EcdsaSecp256r1VerificationKey2019" => Some(Self::P256),
            _ => None,
        }
    }

    /// Verification method `type` tag used when building documents.
    pub fn verification_method_type(&self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519VerificationKey2020",
            Self::X25519 => "X25519KeyAgreementKey2020",
            Self::Secp256k1 => "EcdsaSecp256k1VerificationKey2019",
            Self::P256 => "EcdsaSecp256r1VerificationKey2019",
        }
    }

    /// JWS `alg` value for signatures made with this key type.
    pub fn jws_algorithm(&self) -> Option<&'static str> {
        match self {
            Self::Ed25519 => Some("EdDSA"),
            Self::Secp256k1 => Some("ES256K"),
            Self::P256 => Some("ES256"),
            Self::X25519 => None,
        }
    }

    /// Whether keys of this type can verify signatures.
    pub fn is_signing(&self) -> bool {
        self.jws_algorithm().is_some()
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519 => write!(f, "Ed25519"),
            Self::X25519 => write!(f, "X25519"),
            Self::Secp256k1 => write!(f, "secp256k1"),
            Self::P256 => write!(f, "P-256"),
        }
    }
}

/// Ed25519 key pair used to sign tokens.
/// Private key material is zeroized on drop.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::Ed25519(self.signing_key.verifying_key())
    }

    /// Sign a message, returning the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        use ed25519_dalek::Signer;
        self.signing_key.sign(message).to_bytes()
    }

    /// The `did:key` identifier for this key pair.
    pub fn did_key(&self) -> String {
        format!("did:key:{}", self.public_key().to_multibase())
    }
}

/// A public key recovered from key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// Ed25519 verifying key.
    Ed25519(VerifyingKey),
    /// X25519 key agreement key.
    X25519(x25519_dalek::PublicKey),
    /// secp256k1 ECDSA verifying key.
    Secp256k1(k256::ecdsa::VerifyingKey),
    /// P-256 ECDSA verifying key.
    P256(p256::ecdsa::VerifyingKey),
}

impl PublicKey {
    /// Decode raw key bytes of the given type.
    ///
    /// secp256k1 and P-256 keys accept both compressed (33 byte) and
    /// uncompressed (65 byte) SEC1 encodings.
    pub fn from_bytes(key_type: KeyType, bytes: &[u8]) -> Result<Self, CryptoError> {
        match key_type {
            KeyType::Ed25519 => {
                let arr = to_array_32(bytes)?;
                let key = VerifyingKey::from_bytes(&arr)
                    .map_err(|e| CryptoError::InvalidKey(format!("invalid Ed25519 key: {}", e)))?;
                Ok(Self::Ed25519(key))
            }
            KeyType::X25519 => {
                let arr = to_array_32(bytes)?;
                Ok(Self::X25519(x25519_dalek::PublicKey::from(arr)))
            }
            KeyType::Secp256k1 => {
                let key = k256::ecdsa::VerifyingKey::from_sec1_bytes(bytes).map_err(|e| {
                    CryptoError::InvalidKey(format!("invalid secp256k1 key: {}", e))
                })?;
                Ok(Self::Secp256k1(key))
            }
            KeyType::P256 => {
                let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
                    .map_err(|e| CryptoError::InvalidKey(format!("invalid P-256 key: {}", e)))?;
                Ok(Self::P256(key))
            }
        }
    }

    /// Decode a multibase multikey, using its multicodec for the key type.
    pub fn from_multibase(value: &str) -> Result<Self, CryptoError> {
        let (codec, bytes) = multikey::decode_multikey(value)?;
        let key_type = KeyType::from_multicodec(codec).ok_or_else(|| {
            CryptoError::UnsupportedKeyType(format!("multicodec 0x{:x}", codec))
        })?;
        Self::from_bytes(key_type, &bytes)
    }

    /// The key's algorithm.
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Ed25519(_) => KeyType::Ed25519,
            Self::X25519(_) => KeyType::X25519,
            Self::Secp256k1(_) => KeyType::Secp256k1,
            Self::P256(_) => KeyType::P256,
        }
    }

    /// Raw key bytes (ECDSA keys are SEC1 compressed).
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(key) => key.as_bytes().to_vec(),
            Self::X25519(key) => key.as_bytes().to_vec(),
            Self::Secp256k1(key) => key.to_encoded_point(true).as_bytes().to_vec(),
            Self::P256(key) => key.to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    /// Encode as a base58-btc multikey.
    pub fn to_multibase(&self) -> String {
        multikey::encode_multikey(self.key_type().multicodec(), &self.to_bytes())
    }

    /// Encode as base58.
    pub fn to_bs58(&self) -> String {
        bs58::encode(self.to_bytes()).into_string()
    }

    /// Verify a signature made with JWS algorithm `alg` over `message`.
    pub fn verify(&self, alg: &str, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        match (self, alg) {
            (Self::Ed25519(key), "EdDSA") => {
                use ed25519_dalek::Verifier;
                let sig = ed25519_dalek::Signature::from_slice(signature).map_err(|_| {
                    CryptoError::InvalidInput(format!(
                        "Ed25519 signature must be 64 bytes, got {}",
                        signature.len()
                    ))
                })?;
                key.verify(message, &sig)
                    .map_err(|_| CryptoError::SignatureVerificationFailed)
            }
            (Self::Secp256k1(key), "ES256K") => {
                use k256::ecdsa::signature::Verifier;
                let sig = k256::ecdsa::Signature::from_slice(signature).map_err(|e| {
                    CryptoError::InvalidInput(format!("invalid secp256k1 signature: {}", e))
                })?;
                key.verify(message, &sig)
                    .map_err(|_| CryptoError::SignatureVerificationFailed)
            }
            (Self::P256(key), "ES256") => {
                use p256::ecdsa::signature::Verifier;
                let sig = p256::ecdsa::Signature::from_slice(signature).map_err(|e| {
                    CryptoError::InvalidInput(format!("invalid P-256 signature: {}", e))
                })?;
                key.verify(message, &sig)
                    .map_err(|_| CryptoError::SignatureVerificationFailed)
            }
            (key, alg) => Err(CryptoError::UnsupportedAlgorithm(format!(
                "{} cannot be verified with a {} key",
                alg,
                key.key_type()
            ))),
        }
    }
}

fn to_array_32(bytes: &[u8]) -> Result<[u8; 32], CryptoError> {
    bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: 32,
        actual: bytes.len(),
    })
}
