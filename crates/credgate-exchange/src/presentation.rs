//! Verifiable presentation and credential JWT claim sets.

use credgate_crypto::{CompactJws, Header};
use serde::{Deserialize, Serialize};

use crate::error::ExchangeError;
use crate::submission::PresentationSubmission;

/// The `vp` claim of a presentation JWT.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    #[serde(rename = "@context", default, skip_serializing_if = "serde_json::Value::is_null")]
    pub context: serde_json::Value,
    #[serde(rename = "type", default, skip_serializing_if = "serde_json::Value::is_null")]
    pub presentation_type: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verifiable_credential: Vec<serde_json::Value>,
    #[serde(rename = "presentation_submission", default, skip_serializing_if = "Option::is_none")]
    pub presentation_submission: Option<PresentationSubmission>,
}

/// Registered claims of a VP JWT.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VpClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// String or array of strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default)]
    pub vp: VerifiablePresentation,
}

/// Registered claims of a VC JWT.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VcClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// The credential body.
    #[serde(default)]
    pub vc: serde_json::Value,
}

impl VcClaims {
    /// The issuer: `iss`, else `vc.issuer` (a string or an object with an `id`).
    pub fn issuer(&self) -> Option<&str> {
        if let Some(iss) = self.iss.as_deref() {
            return Some(iss);
        }
        match self.vc.get("issuer")? {
            serde_json::Value::String(s) => Some(s.as_str()),
            other => other.get("id")?.as_str(),
        }
    }
}

/// A parsed, not yet verified, presentation JWT.
#[derive(Debug, Clone)]
pub struct ParsedPresentation {
    pub header: Header,
    pub claims: VpClaims,
}

impl ParsedPresentation {
    pub fn submission(&self) -> Option<&PresentationSubmission> {
        self.claims.vp.presentation_submission.as_ref()
    }
}

/// Decode a VP JWT without verifying its signature.
pub fn parse_presentation_jwt(token: &str) -> Result<ParsedPresentation, ExchangeError> {
    let jws = CompactJws::decode(token)?;
    let claims: VpClaims = jws
        .claims()
        .map_err(|e| ExchangeError::MalformedPresentation(e.to_string()))?;
    Ok(ParsedPresentation {
        header: jws.header,
        claims,
    })
}

/// Decode a VC JWT without verifying its signature.
pub fn parse_credential_jwt(token: &str) -> Result<(CompactJws, VcClaims), ExchangeError> {
    let jws = CompactJws::decode(token)?;
    let claims: VcClaims = jws
        .claims()
        .map_err(|e| ExchangeError::MalformedPresentation(format!("credential: {}", e)))?;
    Ok((jws, claims))
}
