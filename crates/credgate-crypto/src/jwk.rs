//! JSON Web Key conversion for public keys.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::keys::{KeyType, PublicKey};

/// A public JSON Web Key (RFC 7517).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type: "OKP" or "EC".
    pub kty: String,
    /// Curve name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// Base64url x coordinate (or the whole OKP key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Base64url y coordinate for EC keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
}

impl Jwk {
    /// Parse the JWK into its raw public key.
    pub fn to_public_key(&self) -> Result<PublicKey, CryptoError> {
        let crv = self.crv.as_deref().unwrap_or_default();
        match (self.kty.as_str(), crv) {
            ("OKP", "Ed25519") => PublicKey::from_bytes(KeyType::Ed25519, &self.coordinate("x")?),
            ("OKP", "X25519") => PublicKey::from_bytes(KeyType::X25519, &self.coordinate("x")?),
            ("EC", "secp256k1") => PublicKey::from_bytes(KeyType::Secp256k1, &self.uncompressed_point(crv)?),
            ("EC", "P-256") => PublicKey::from_bytes(KeyType::P256, &self.uncompressed_point(crv)?),
            (kty, crv) => Err(CryptoError::UnsupportedKeyType(format!(
                "JWK kty={} crv={}",
                kty, crv
            ))),
        }
    }

    /// Build the public JWK for a key.
    pub fn from_public_key(key: &PublicKey) -> Self {
        match key {
            PublicKey::Ed25519(_) | PublicKey::X25519(_) => Self {
                kty: "OKP".into(),
                crv: Some(key.key_type().to_string()),
                x: Some(URL_SAFE_NO_PAD.encode(key.to_bytes())),
                ..Default::default()
            },
            PublicKey::Secp256k1(vk) => {
                let point = vk.to_encoded_point(false);
                Self {
                    kty: "EC".into(),
                    crv: Some("secp256k1".into()),
                    x: point.x().map(|x| URL_SAFE_NO_PAD.encode(x)),
                    y: point.y().map(|y| URL_SAFE_NO_PAD.encode(y)),
                    ..Default::default()
                }
            }
            PublicKey::P256(vk) => {
                let point = vk.to_encoded_point(false);
                Self {
                    kty: "EC".into(),
                    crv: Some("P-256".into()),
                    x: point.x().map(|x| URL_SAFE_NO_PAD.encode(x)),
                    y: point.y().map(|y| URL_SAFE_NO_PAD.encode(y)),
                    ..Default::default()
                }
            }
        }
    }

    /// SEC1 uncompressed point (`0x04 || x || y`) from 32-byte coordinates.
    fn uncompressed_point(&self, crv: &str) -> Result<Vec<u8>, CryptoError> {
        let x = self.coordinate("x")?;
        let y = self.coordinate("y")?;
        if x.len() != 32 || y.len() != 32 {
            return Err(CryptoError::InvalidJwk(format!(
                "{} coordinates must be 32 bytes",
                crv
            )));
        }
        let mut sec1 = Vec::with_capacity(65);
        sec1.push(0x04);
        sec1.extend_from_slice(&x);
        sec1.extend_from_slice(&y);
        Ok(sec1)
    }

    fn coordinate(&self, name: &str) -> Result<Vec<u8>, CryptoError> {
        let value = match name {
            "x" => self.x.as_deref(),
            _ => self.y.as_deref(),
        }
        .ok_or_else(|| CryptoError::InvalidJwk(format!("missing '{}' parameter", name)))?;
        URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|e| CryptoError::InvalidJwk(format!("invalid base64url '{}': {}", name, e)))
    }
}
