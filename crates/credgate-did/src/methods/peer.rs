use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use credgate_crypto::PublicKey;
use serde_json::{Map, Value};

use super::key::multikey_document;
use super::{ensure_method, MethodResolver};
use crate::did::Did;
use crate::document::{
    Document, ResolutionOptions, ResolutionResult, Service, VerificationMethod,
    VerificationRelationship,
};
use crate::error::ResolverError;

/// Resolves `did:peer` numalgo 0 (inception key) and 2 (multiple keys and services).
pub struct PeerResolver;

#[async_trait]
impl MethodResolver for PeerResolver {
    fn method(&self) -> &'static str {
        "peer"
    }

    async fn resolve(
        &self,
        did: &Did,
        _options: &ResolutionOptions,
    ) -> Result<ResolutionResult, ResolverError> {
        ensure_method(did, "peer")?;
        let id = did.method_specific_id();

        let document = match id.chars().next() {
            Some('0') => multikey_document(did.as_str(), &id[1..])?,
            Some('2') => numalgo2_document(did, &id[1..])?,
            _ => {
                return Err(ResolverError::InvalidDid(format!(
                    "{}: unsupported did:peer numalgo",
                    did
                )))
            }
        };
        Ok(ResolutionResult::from_document(document, "peer"))
    }
}

fn numalgo2_document(did: &Did, elements: &str) -> Result<Document, ResolverError> {
    let Some(elements) = elements.strip_prefix('.') else {
        return Err(ResolverError::InvalidDid(format!("{}: missing element separator", did)));
    };

    let mut document = Document::new(did.as_str());
    let mut key_index = 0;
    let mut services = Vec::new();

    for element in elements.split('.') {
        let mut chars = element.chars();
        let purpose = chars.next();
        let value = chars.as_str();
        if value.is_empty() {
            return Err(ResolverError::InvalidDid(format!("{}: empty element", did)));
        }

        if purpose == Some('S') {
            services.push(decode_service(did, value)?);
            continue;
        }

        let key = PublicKey::from_multibase(value)
            .map_err(|e| ResolverError::InvalidDid(format!("{}: {}", did, e)))?;
        key_index += 1;
        let vm = VerificationMethod {
            id: format!("{}#key-{}", did, key_index),
            method_type: key.key_type().verification_method_type().to_string(),
            controller: did.to_string(),
            public_key_multibase: Some(value.to_string()),
            ..Default::default()
        };
        let reference = VerificationRelationship::Reference(vm.id.clone());
        match purpose {
            Some('V') => document.authentication.push(reference),
            Some('A') => document.assertion_method.push(reference),
            Some('E') => document.key_agreement.push(reference),
            Some('I') => document.capability_invocation.push(reference),
            Some('D') => document.capability_delegation.push(reference),
            _ => {
                return Err(ResolverError::InvalidDid(format!(
                    "{}: unknown element purpose in {}",
                    did, element
                )))
            }
        }
        document.verification_method.push(vm);
    }

    for (i, service) in services.into_iter().enumerate() {
        let suffix = if i == 0 { String::new() } else { format!("-{}", i) };
        document.service.push(Service {
            id: format!("{}#service{}", did, suffix),
            ..service
        });
    }
    Ok(document)
}

/// Decode an abbreviated base64url JSON service block.
fn decode_service(did: &Did, encoded: &str) -> Result<Service, ResolverError> {
    let invalid = |reason: String| ResolverError::InvalidDid(format!("{}: service {}", did, reason));

    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| invalid(format!("is not base64url: {}", e)))?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| invalid(format!("is not JSON: {}", e)))?;
    let Value::Object(abbreviated) = expand_abbreviations(value) else {
        return Err(invalid("must be a JSON object".into()));
    };

    let service_type = match abbreviated.get("type") {
        Some(Value::String(t)) => t.clone(),
        _ => return Err(invalid("has no type".into())),
    };
    let endpoint = abbreviated
        .get("serviceEndpoint")
        .cloned()
        .ok_or_else(|| invalid("has no endpoint".into()))?;

    // routing keys and accept live inside the endpoint object
    let mut extras = Map::new();
    for key in ["routingKeys", "accept"] {
        if let Some(v) = abbreviated.get(key) {
            extras.insert(key.to_string(), v.clone());
        }
    }
    let service_endpoint = match endpoint {
        Value::String(uri) if !extras.is_empty() => {
            extras.insert("uri".into(), Value::String(uri));
            Value::Object(extras)
        }
        other => other,
    };

    Ok(Service {
        id: String::new(),
        service_type,
        service_endpoint,
    })
}

fn expand_abbreviations(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    let key = match k.as_str() {
                        "t" => "type".to_string(),
                        "s" => "serviceEndpoint".to_string(),
                        "r" => "routingKeys".to_string(),
                        "a" => "accept".to_string(),
                        _ => k,
                    };
                    let v = match (key.as_str(), v) {
                        ("type", Value::String(t)) if t == "dm" => {
                            Value::String("DIDCommMessaging".into())
                        }
                        (_, v) => expand_abbreviations(v),
                    };
                    (key, v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(expand_abbreviations).collect()),
        other => other,
    }
}
