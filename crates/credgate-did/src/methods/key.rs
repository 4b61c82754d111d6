use async_trait::async_trait;
use credgate_crypto::{KeyType, PublicKey};

use super::{ensure_method, MethodResolver};
use crate::did::Did;
use crate::document::{Document, ResolutionOptions, ResolutionResult, VerificationMethod};
use crate::error::ResolverError;

/// Resolves `did:key` by expanding the embedded multikey.
pub struct KeyResolver;

#[async_trait]
impl MethodResolver for KeyResolver {
    fn method(&self) -> &'static str {
        "key"
    }

    async fn resolve(
        &self,
        did: &Did,
        _options: &ResolutionOptions,
    ) -> Result<ResolutionResult, ResolverError> {
        ensure_method(did, "key")?;
        let document = multikey_document(did.as_str(), did.method_specific_id())?;
        Ok(ResolutionResult::from_document(document, "key"))
    }
}

/// Build a single-key document whose method id is `<did>#<multibase>`.
pub(crate) fn multikey_document(did: &str, multibase: &str) -> Result<Document, ResolverError> {
    let key = PublicKey::from_multibase(multibase)
        .map_err(|e| ResolverError::InvalidDid(format!("{}: {}", did, e)))?;

    let mut document = Document::new(did);
    let vm = VerificationMethod {
        id: format!("{}#{}", did, multibase),
        method_type: key.key_type().verification_method_type().to_string(),
        controller: did.to_string(),
        public_key_multibase: Some(multibase.to_string()),
        ..Default::default()
    };
    match key.key_type() {
        KeyType::X25519 => document.add_key_agreement_method(vm),
        KeyType::Ed25519 | KeyType::Secp256k1 | KeyType::P256 => document.add_signing_method(vm),
    }
    Ok(document)
}
