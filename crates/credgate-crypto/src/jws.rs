//! Compact JWS encoding and audience-bound JWT verification.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::keys::{KeyPair, PublicKey};

/// Allowed clock skew when checking `exp` and `nbf`, in seconds.
const CLOCK_SKEW_SECS: i64 = 60;

/// Protected JOSE header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Signature algorithm ("EdDSA", "ES256K", "ES256").
    pub alg: String,
    /// Key reference, usually a DID URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl Header {
    /// Read the typed parameters from a raw header.
    ///
    /// `alg` is required; `kid` and `typ` are kept only when they are strings.
    fn from_raw(raw: &serde_json::Map<String, serde_json::Value>) -> Result<Self, CryptoError> {
        let text = |name: &str| raw.get(name).and_then(|v| v.as_str()).map(str::to_string);
        let alg = text("alg")
            .ok_or_else(|| CryptoError::MalformedToken("header has no alg".into()))?;
        Ok(Self {
            alg,
            kid: text("kid"),
            typ: text("typ"),
        })
    }
}

/// A decoded but not yet verified compact JWS.
#[derive(Debug, Clone)]
pub struct CompactJws {
    /// Typed view of the protected header.
    pub header: Header,
    /// The full protected header, including parameters not modelled by [`Header`].
    pub raw_header: serde_json::Map<String, serde_json::Value>,
    /// JSON payload.
    pub payload: serde_json::Value,
    signing_input: String,
    signature: Vec<u8>,
}

impl CompactJws {
    /// Split and decode a compact JWS (`header.payload.signature`).
    pub fn decode(token: &str) -> Result<Self, CryptoError> {
        let mut parts = token.trim().split('.');
        let (Some(h), Some(p), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CryptoError::MalformedToken(
                "compact JWS must have three segments".into(),
            ));
        };

        let raw_header: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(&b64_decode(h, "header")?)
                .map_err(|e| CryptoError::MalformedToken(format!("invalid header JSON: {}", e)))?;
        let header = Header::from_raw(&raw_header)?;
        let payload = serde_json::from_slice(&b64_decode(p, "payload")?)
            .map_err(|e| CryptoError::MalformedToken(format!("invalid payload JSON: {}", e)))?;
        let signature = b64_decode(s, "signature")?;

        Ok(Self {
            header,
            raw_header,
            payload,
            signing_input: format!("{}.{}", h, p),
            signature,
        })
    }

    /// Verify the signature with `key` using the header's algorithm.
    pub fn verify_signature(&self, key: &PublicKey) -> Result<(), CryptoError> {
        key.verify(&self.header.alg, self.signing_input.as_bytes(), &self.signature)
    }

    /// Deserialize the payload into a typed claim set.
    pub fn claims<T: DeserializeOwned>(&self) -> Result<T, CryptoError> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| CryptoError::InvalidClaims(e.to_string()))
    }
}

/// Sign `claims` as an EdDSA compact JWS.
pub fn sign<T: Serialize>(
    kid: Option<&str>,
    typ: Option<&str>,
    claims: &T,
    keypair: &KeyPair,
) -> Result<String, CryptoError> {
    let header = Header {
        alg: "EdDSA".into(),
        kid: kid.map(str::to_string),
        typ: typ.map(str::to_string),
    };
    let header_json = serde_json::to_vec(&header)
        .map_err(|e| CryptoError::InvalidInput(format!("serializing header: {}", e)))?;
    let payload_json = serde_json::to_vec(claims)
        .map_err(|e| CryptoError::InvalidInput(format!("serializing claims: {}", e)))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(payload_json)
    );
    let signature = keypair.sign(signing_input.as_bytes());
    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Verifies JWTs signed by a known key and addressed to a known audience.
#[derive(Debug, Clone)]
pub struct JwtVerifier {
    audience: String,
    key: PublicKey,
}

impl JwtVerifier {
    /// Create a verifier expecting `audience` in the `aud` claim.
    pub fn new(audience: impl Into<String>, key: PublicKey) -> Result<Self, CryptoError> {
        let audience = audience.into();
        if audience.is_empty() {
            return Err(CryptoError::InvalidInput("audience cannot be empty".into()));
        }
        if !key.key_type().is_signing() {
            return Err(CryptoError::UnsupportedKeyType(format!(
                "{} keys cannot verify signatures",
                key.key_type()
            )));
        }
        Ok(Self { audience, key })
    }

    /// The expected audience.
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// The key signatures are checked against.
    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    /// Decode `token`, then check signature, audience and validity window.
    pub fn verify(&self, token: &str) -> Result<CompactJws, CryptoError> {
        let jws = CompactJws::decode(token)?;
        jws.verify_signature(&self.key)?;
        tracing::trace!(alg = %jws.header.alg, kid = ?jws.header.kid, "JWS signature verified");

        if !audience_matches(jws.payload.get("aud"), &self.audience) {
            return Err(CryptoError::InvalidClaims(format!(
                "token audience does not include {}",
                self.audience
            )));
        }
        check_validity_window(&jws.payload)?;
        Ok(jws)
    }
}

/// Check the `exp` and `nbf` claims, if present, against the current time.
pub fn check_validity_window(payload: &serde_json::Value) -> Result<(), CryptoError> {
    let now = Utc::now().timestamp();
    if let Some(exp) = payload.get("exp").and_then(|v| v.as_i64()) {
        if now > exp + CLOCK_SKEW_SECS {
            return Err(CryptoError::InvalidClaims("token has expired".into()));
        }
    }
    if let Some(nbf) = payload.get("nbf").and_then(|v| v.as_i64()) {
        if now + CLOCK_SKEW_SECS < nbf {
            return Err(CryptoError::InvalidClaims("token is not yet valid".into()));
        }
    }
    Ok(())
}

fn audience_matches(aud: Option<&serde_json::Value>, expected: &str) -> bool {
    match aud {
        Some(serde_json::Value::String(s)) => s == expected,
        Some(serde_json::Value::Array(values)) => values.iter().any(|v| v.as_str() == Some(expected)),
        _ => false,
    }
}

fn b64_decode(segment: &str, what: &str) -> Result<Vec<u8>, CryptoError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| CryptoError::MalformedToken(format!("invalid base64url {}: {}", what, e)))
}
