//! Public key extraction from resolved DID documents.

use credgate_crypto::multikey;
use credgate_crypto::{CryptoError, KeyType, PublicKey};

use crate::document::{Document, VerificationMethod};
use crate::error::KeyError;

/// Find the verification method referenced by `key_ref` and decode its key.
///
/// `key_ref` may be the full method id, a `#fragment`, a bare fragment, or
/// a suffix appended directly to the document id. Key material is read from
/// `publicKeyMultibase`, then `publicKeyBase58`, then `publicKeyJwk`.
pub fn extract_public_key(document: &Document, key_ref: &str) -> Result<PublicKey, KeyError> {
    if document.is_empty() {
        return Err(KeyError::EmptyDocument);
    }
    if key_ref.is_empty() {
        return Err(KeyError::MissingKeyReference);
    }
    if document.verification_method.is_empty() {
        return Err(KeyError::NoVerificationMethods(document.id.clone()));
    }

    let vm = find_verification_method(document, key_ref).ok_or_else(|| KeyError::KeyNotFound {
        did: document.id.clone(),
        key_ref: key_ref.to_string(),
    })?;
    decode_key(vm)
}

fn find_verification_method<'a>(
    document: &'a Document,
    key_ref: &str,
) -> Option<&'a VerificationMethod> {
    let candidates = [
        key_ref.to_string(),
        format!("#{}", key_ref),
        format!("{}#{}", document.id, key_ref),
        format!("{}{}", document.id, key_ref),
    ];
    document
        .verification_method
        .iter()
        .find(|vm| candidates.iter().any(|c| *c == vm.id))
}

fn decode_key(vm: &VerificationMethod) -> Result<PublicKey, KeyError> {
    let declared = KeyType::from_verification_method_type(&vm.method_type);

    if let Some(value) = &vm.public_key_multibase {
        let (codec, bytes) = multikey::decode_multikey(value).map_err(|e| match e {
            CryptoError::InvalidMultibase(reason) => KeyError::InvalidMultibase(reason),
            other => decode_error(vm, "publicKeyMultibase", other),
        })?;
        let key_type = match declared {
            Some(key_type) => key_type,
            None => KeyType::from_multicodec(codec).ok_or_else(|| {
                decode_error(
                    vm,
                    "publicKeyMultibase",
                    CryptoError::UnsupportedKeyType(format!("multicodec 0x{:x}", codec)),
                )
            })?,
        };
        return PublicKey::from_bytes(key_type, &bytes)
            .map_err(|e| decode_error(vm, "publicKeyMultibase", e));
    }

    if let Some(value) = &vm.public_key_base58 {
        let key_type = declared.ok_or_else(|| {
            decode_error(
                vm,
                "publicKeyBase58",
                CryptoError::UnsupportedKeyType(vm.method_type.clone()),
            )
        })?;
        let bytes = bs58::decode(value).into_vec().map_err(|e| {
            decode_error(vm, "publicKeyBase58", CryptoError::InvalidInput(e.to_string()))
        })?;
        return PublicKey::from_bytes(key_type, &bytes)
            .map_err(|e| decode_error(vm, "publicKeyBase58", e));
    }

    if let Some(jwk) = &vm.public_key_jwk {
        return jwk
            .to_public_key()
            .map_err(|e| decode_error(vm, "publicKeyJwk", e));
    }

    Err(KeyError::NoKeyMaterial(vm.id.clone()))
}

fn decode_error(vm: &VerificationMethod, field: &str, source: CryptoError) -> KeyError {
    KeyError::Decode {
        context: format!("decoding {} of {}", field, vm.id),
        source,
    }
}
