use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use credgate_crypto::{Jwk, KeyType};

use super::{ensure_method, MethodResolver};
use crate::did::Did;
use crate::document::{Document, ResolutionOptions, ResolutionResult, VerificationMethod};
use crate::error::ResolverError;

/// Resolves `did:jwk`, whose identifier is a base64url-encoded public JWK.
pub struct JwkResolver;

#[async_trait]
impl MethodResolver for JwkResolver {
    fn method(&self) -> &'static str {
        "jwk"
    }

    async fn resolve(
        &self,
        did: &Did,
        _options: &ResolutionOptions,
    ) -> Result<ResolutionResult, ResolverError> {
        ensure_method(did, "jwk")?;

        let bytes = URL_SAFE_NO_PAD
            .decode(did.method_specific_id())
            .map_err(|e| ResolverError::InvalidDid(format!("{}: invalid base64url: {}", did, e)))?;
        let jwk: Jwk = serde_json::from_slice(&bytes)
            .map_err(|e| ResolverError::InvalidDid(format!("{}: invalid JWK: {}", did, e)))?;
        let key = jwk.to_public_key()?;

        let mut document = Document::new(did.as_str());
        let vm = VerificationMethod {
            id: format!("{}#0", did),
            method_type: "JsonWebKey2020".into(),
            controller: did.to_string(),
            public_key_jwk: Some(jwk),
            ..Default::default()
        };
        match key.key_type() {
            KeyType::X25519 => document.add_key_agreement_method(vm),
            KeyType::Ed25519 | KeyType::Secp256k1 | KeyType::P256 => document.add_signing_method(vm),
        }
        Ok(ResolutionResult::from_document(document, "jwk"))
    }
}
