use std::sync::Arc;

use async_trait::async_trait;
use credgate_crypto::{check_validity_window, JwtVerifier};
use credgate_did::{extract_public_key, DidResolver, ResolutionOptions};
use serde_json::Value;
use serde_json_path::JsonPath;

use crate::definition::{ClaimFormat, InputDescriptor, PresentationDefinition};
use crate::error::ExchangeError;
use crate::presentation::{parse_credential_jwt, VpClaims};
use crate::submission::{DescriptorMap, VerifiedSubmissionData};

/// Claim format tag for JWT verifiable credentials.
pub const JWT_VC_FORMAT: &str = "jwt_vc";

/// The envelope a submission arrives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationTarget {
    /// A JWT verifiable presentation carrying JWT credentials.
    JwtVp,
}

/// Verifies a presentation submission against a definition.
#[async_trait]
pub trait SubmissionVerifier: Send + Sync {
    /// Verify `submission` and return the data matched per input descriptor.
    ///
    /// `verifier` checks the presentation's own signature and audience.
    async fn verify_submission(
        &self,
        verifier: &JwtVerifier,
        target: PresentationTarget,
        definition: &PresentationDefinition,
        submission: &[u8],
    ) -> Result<Vec<VerifiedSubmissionData>, ExchangeError>;
}

/// Presentation exchange verifier for JWT presentations.
///
/// Each credential's issuer is resolved with the given resolver to verify
/// the credential signature.
pub struct PresentationExchangeVerifier {
    resolver: Arc<dyn DidResolver>,
}

impl PresentationExchangeVerifier {
    pub fn new(resolver: Arc<dyn DidResolver>) -> Self {
        Self { resolver }
    }

    async fn verify_entry(
        &self,
        entry: &DescriptorMap,
        descriptor: &InputDescriptor,
        definition: &PresentationDefinition,
        vp: &Value,
    ) -> Result<VerifiedSubmissionData, ExchangeError> {
        if entry.format != JWT_VC_FORMAT || entry.path_nested.is_some() {
            return Err(ExchangeError::UnsupportedFormat {
                descriptor: entry.id.clone(),
                format: entry.format.clone(),
            });
        }

        let path = JsonPath::parse(&entry.path).map_err(|e| ExchangeError::InvalidPath {
            path: entry.path.clone(),
            reason: e.to_string(),
        })?;
        let claim = path
            .query(vp)
            .exactly_one()
            .map_err(|e| ExchangeError::MalformedPresentation(format!(
                "descriptor map path {} for {}: {}",
                entry.path, entry.id, e
            )))?
            .clone();
        let Value::String(token) = &claim else {
            return Err(ExchangeError::UnsupportedFormat {
                descriptor: entry.id.clone(),
                format: "claim is not a JWT string".into(),
            });
        };

        let credential = self.verify_credential(&entry.id, token, descriptor, definition).await?;

        let selected = match &descriptor.constraints {
            Some(constraints) => constraints.apply(&entry.id, &credential)?,
            None => Vec::new(),
        };
        let filtered_data = match selected.len() {
            0 => Value::Null,
            1 => selected.into_iter().next().unwrap_or_default(),
            _ => Value::Array(selected),
        };

        Ok(VerifiedSubmissionData {
            input_descriptor_id: entry.id.clone(),
            claim,
            credential,
            filtered_data,
        })
    }

    /// Verify a VC JWT signature and validity, returning its decoded claims.
    async fn verify_credential(
        &self,
        descriptor_id: &str,
        token: &str,
        descriptor: &InputDescriptor,
        definition: &PresentationDefinition,
    ) -> Result<Value, ExchangeError> {
        let failed = |reason: String| ExchangeError::CredentialVerification {
            descriptor: descriptor_id.to_string(),
            reason,
        };

        let (jws, claims) = parse_credential_jwt(token)?;
        if let Some(allowed) = allowed_algorithms(descriptor.format.as_ref().or(definition.format.as_ref())) {
            if !allowed.iter().any(|alg| *alg == jws.header.alg) {
                return Err(failed(format!("algorithm {} not accepted", jws.header.alg)));
            }
        }

        let issuer = claims
            .issuer()
            .ok_or_else(|| failed("credential has no issuer".into()))?;
        let kid = jws
            .header
            .kid
            .as_deref()
            .ok_or_else(|| failed("credential header has no kid".into()))?;

        let resolved = self
            .resolver
            .resolve(issuer, &ResolutionOptions::default())
            .await
            .map_err(|e| failed(format!("resolving issuer {}: {}", issuer, e)))?;
        let key = extract_public_key(&resolved.did_document, kid)
            .map_err(|e| failed(format!("issuer key {}: {}", kid, e)))?;
        jws.verify_signature(&key)
            .map_err(|e| failed(e.to_string()))?;
        check_validity_window(&jws.payload).map_err(|e| failed(e.to_string()))?;

        tracing::debug!(descriptor = descriptor_id, issuer = issuer, "credential verified");
        Ok(jws.payload)
    }
}

fn allowed_algorithms(format: Option<&ClaimFormat>) -> Option<&[String]> {
    format?.jwt_vc.as_ref().map(|f| f.alg.as_slice())
}

#[async_trait]
impl SubmissionVerifier for PresentationExchangeVerifier {
    async fn verify_submission(
        &self,
        verifier: &JwtVerifier,
        target: PresentationTarget,
        definition: &PresentationDefinition,
        submission: &[u8],
    ) -> Result<Vec<VerifiedSubmissionData>, ExchangeError> {
        let PresentationTarget::JwtVp = target;
        definition.is_valid()?;

        let token = std::str::from_utf8(submission)
            .map_err(|e| ExchangeError::MalformedPresentation(format!("not UTF-8: {}", e)))?;
        let jws = verifier.verify(token)?;
        let claims: VpClaims = jws
            .claims()
            .map_err(|e| ExchangeError::MalformedPresentation(e.to_string()))?;
        let presentation_submission = claims
            .vp
            .presentation_submission
            .ok_or(ExchangeError::MissingSubmission)?;

        if presentation_submission.definition_id != definition.id {
            return Err(ExchangeError::DefinitionMismatch {
                expected: definition.id.clone(),
                actual: presentation_submission.definition_id,
            });
        }

        let vp = jws.payload.get("vp").cloned().unwrap_or(Value::Null);
        let mut verified = Vec::with_capacity(presentation_submission.descriptor_map.len());
        for entry in &presentation_submission.descriptor_map {
            let descriptor = definition
                .input_descriptor(&entry.id)
                .ok_or_else(|| ExchangeError::UnknownDescriptor(entry.id.clone()))?;
            verified.push(self.verify_entry(entry, descriptor, definition, &vp).await?);
        }

        for id in definition.input_descriptor_ids() {
            if !verified.iter().any(|v| v.input_descriptor_id == id) {
                return Err(ExchangeError::UnfulfilledDescriptor(id.to_string()));
            }
        }

        tracing::debug!(
            definition = %definition.id,
            submission = %presentation_submission.id,
            descriptors = verified.len(),
            "presentation submission verified"
        );
        Ok(verified)
    }
}
