//! Producing signed credentials and presentation submissions.

use chrono::{Duration, Utc};
use credgate_crypto::{sign, KeyPair};
use serde_json::{json, Value};

use crate::definition::PresentationDefinition;
use crate::error::ExchangeError;
use crate::submission::{DescriptorMap, PresentationSubmission};
use crate::verifier::JWT_VC_FORMAT;

/// Lifetime of presentations built by [`build_presentation_submission`].
pub const PRESENTATION_LIFETIME_SECS: i64 = 300;

/// A signer identity: the DID and the verification method used as `kid`.
pub struct Signer<'a> {
    pub did: &'a str,
    pub kid: &'a str,
    pub keypair: &'a KeyPair,
}

/// A credential offered for one input descriptor.
#[derive(Debug, Clone)]
pub struct PresentationClaim {
    pub input_descriptor_id: String,
    /// The VC JWT.
    pub token: String,
}

/// Sign `credential` (the `vc` body) as a VC JWT issued by `signer`.
pub fn sign_credential_jwt(
    signer: &Signer<'_>,
    credential: &Value,
    valid_for: Option<Duration>,
) -> Result<String, ExchangeError> {
    let now = Utc::now();
    let mut claims = json!({
        "iss": signer.did,
        "iat": now.timestamp(),
        "nbf": now.timestamp(),
        "jti": credential
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("urn:uuid:{}", uuid::Uuid::now_v7())),
        "vc": credential,
    });
    if let Some(subject) = credential.pointer("/credentialSubject/id").and_then(Value::as_str) {
        claims["sub"] = json!(subject);
    }
    if let Some(valid_for) = valid_for {
        claims["exp"] = json!((now + valid_for).timestamp());
    }
    Ok(sign(Some(signer.kid), Some("JWT"), &claims, signer.keypair)?)
}

/// Build a signed VP JWT for `audience` whose submission maps each claim to
/// its input descriptor in `definition`.
pub fn build_presentation_submission(
    signer: &Signer<'_>,
    audience: &str,
    definition: &PresentationDefinition,
    claims: &[PresentationClaim],
) -> Result<String, ExchangeError> {
    for claim in claims {
        if definition.input_descriptor(&claim.input_descriptor_id).is_none() {
            return Err(ExchangeError::UnknownDescriptor(claim.input_descriptor_id.clone()));
        }
    }

    let submission = PresentationSubmission {
        id: uuid::Uuid::now_v7().to_string(),
        definition_id: definition.id.clone(),
        descriptor_map: claims
            .iter()
            .enumerate()
            .map(|(i, claim)| DescriptorMap {
                id: claim.input_descriptor_id.clone(),
                format: JWT_VC_FORMAT.into(),
                path: format!("$.verifiableCredential[{}]", i),
                path_nested: None,
            })
            .collect(),
    };
    let submission =
        serde_json::to_value(&submission).map_err(|e| ExchangeError::Serialization(e.to_string()))?;

    let now = Utc::now().timestamp();
    let vp_claims = json!({
        "iss": signer.did,
        "aud": audience,
        "jti": format!("urn:uuid:{}", uuid::Uuid::now_v7()),
        "iat": now,
        "nbf": now,
        "exp": now + PRESENTATION_LIFETIME_SECS,
        "vp": {
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiablePresentation"],
            "holder": signer.did,
            "verifiableCredential": claims.iter().map(|c| c.token.clone()).collect::<Vec<_>>(),
            "presentation_submission": submission,
        },
    });
    Ok(sign(Some(signer.kid), Some("JWT"), &vp_claims, signer.keypair)?)
}
