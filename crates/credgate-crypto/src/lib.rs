//! Credgate key material and token primitives
//!
//! - Ed25519, X25519, secp256k1 and P-256 public keys
//! - Base58-btc multibase and multicodec-prefixed keys
//! - JSON Web Keys
//! - Compact JWS signing and audience-bound JWT verification

pub mod error;
pub mod jwk;
pub mod jws;
pub mod keys;
pub mod multikey;

pub use error::CryptoError;
pub use jwk::Jwk;
pub use jws::{check_validity_window, sign, CompactJws, Header, JwtVerifier};
pub use keys::{KeyPair, KeyType, PublicKey};
