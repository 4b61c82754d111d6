use async_trait::async_trait;

use super::{ensure_method, MethodResolver};
use crate::did::Did;
use crate::document::{Document, ResolutionOptions, ResolutionResult, VerificationMethod};
use crate::error::ResolverError;

/// Resolves `did:pkh:<namespace>:<reference>:<address>` blockchain accounts.
///
/// EVM and Bitcoin accounts carry no public key, only the account id; Solana
/// addresses are Ed25519 public keys.
pub struct PkhResolver;

#[async_trait]
impl MethodResolver for PkhResolver {
    fn method(&self) -> &'static str {
        "pkh"
    }

    async fn resolve(
        &self,
        did: &Did,
        _options: &ResolutionOptions,
    ) -> Result<ResolutionResult, ResolverError> {
        ensure_method(did, "pkh")?;

        let account_id = did.method_specific_id();
        let parts: Vec<&str> = account_id.splitn(3, ':').collect();
        let [namespace, reference, address] = parts.as_slice() else {
            return Err(ResolverError::InvalidDid(format!(
                "{}: expected <namespace>:<reference>:<address>",
                did
            )));
        };
        if namespace.is_empty() || reference.is_empty() || address.is_empty() {
            return Err(ResolverError::InvalidDid(format!("{}: empty account segment", did)));
        }

        let vm = match *namespace {
            "eip155" | "bip122" => VerificationMethod {
                id: format!("{}#blockchainAccountId", did),
                method_type: "EcdsaSecp256k1RecoveryMethod2020".into(),
                controller: did.to_string(),
                blockchain_account_id: Some(account_id.to_string()),
                ..Default::default()
            },
            "solana" => {
                let key = bs58::decode(address).into_vec().map_err(|e| {
                    ResolverError::InvalidDid(format!("{}: invalid solana address: {}", did, e))
                })?;
                if key.len() != 32 {
                    return Err(ResolverError::InvalidDid(format!(
                        "{}: solana address must encode 32 bytes",
                        did
                    )));
                }
                VerificationMethod {
                    id: format!("{}#controller", did),
                    method_type: "Ed25519VerificationKey2018".into(),
                    controller: did.to_string(),
                    public_key_base58: Some(address.to_string()),
                    blockchain_account_id: Some(account_id.to_string()),
                    ..Default::default()
                }
            }
            other => {
                return Err(ResolverError::InvalidDid(format!(
                    "{}: unsupported namespace {}",
                    did, other
                )))
            }
        };

        let mut document = Document::new(did.as_str());
        document.add_signing_method(vm);
        Ok(ResolutionResult::from_document(document, "pkh"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credgate_crypto::KeyPair;

    async fn resolve(did: &str) -> Result<Document, ResolverError> {
        let did = Did::parse(did)?;
        Ok(PkhResolver
            .resolve(&did, &ResolutionOptions::default())
            .await?
            .did_document)
    }

    #[tokio::test]
    async fn test_resolve_eip155() {
        let did = "did:pkh:eip155:1:0xb9c5714089478a327f09197987f16f9e5d936e8a";
        let doc = resolve(did).await.unwrap();
        let vm = &doc.verification_method[0];
        assert_eq!(vm.id, format!("{}#blockchainAccountId", did));
        assert_eq!(vm.method_type, "EcdsaSecp256k1RecoveryMethod2020");
        assert_eq!(
            vm.blockchain_account_id.as_deref(),
            Some("eip155:1:0xb9c5714089478a327f09197987f16f9e5d936e8a")
        );
        assert!(vm.public_key_multibase.is_none());
    }

    #[tokio::test]
    async fn test_resolve_solana() {
        let address = KeyPair::from_seed(&[6u8; 32]).public_key().to_bs58();
        let did = format!("did:pkh:solana:4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZ:{}", address);
        let doc = resolve(&did).await.unwrap();
        assert_eq!(doc.verification_method[0].public_key_base58.as_deref(), Some(address.as_str()));
    }

    #[tokio::test]
    async fn test_resolve_rejects_unknown_namespace() {
        assert!(resolve("did:pkh:cosmos:hub:abc").await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_rejects_short_account() {
        assert!(matches!(
            resolve("did:pkh:eip155:1").await,
            Err(ResolverError::InvalidDid(_))
        ));
    }
}
