use credgate_crypto::Jwk;
use serde::{Deserialize, Serialize};

/// A verification method within a DID Document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Verification method identifier (e.g., "did:key:z6Mk...#z6Mk...").
    pub id: String,
    /// Type of the verification method (e.g., "Ed25519VerificationKey2020").
    #[serde(rename = "type")]
    pub method_type: String,
    /// The DID that controls this verification method.
    pub controller: String,
    /// Multibase-encoded (base58-btc) multicodec key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
    /// Plain base58-encoded key bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Jwk>,
    /// CAIP-10 account, used by did:pkh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_account_id: Option<String>,
}

/// An entry in a verification relationship: either a reference to a
/// verification method or an embedded one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerificationRelationship {
    Reference(String),
    Embedded(VerificationMethod),
}

impl VerificationRelationship {
    /// The id of the referenced or embedded method.
    pub fn id(&self) -> &str {
        match self {
            Self::Reference(id) => id,
            Self::Embedded(vm) => &vm.id,
        }
    }
}

/// A service endpoint in a DID Document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    /// URL string, or a structured endpoint object.
    pub service_endpoint: serde_json::Value,
}

/// W3C DID Document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "@context", default, skip_serializing_if = "serde_json::Value::is_null")]
    pub context: serde_json::Value,
    /// The DID subject.
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<VerificationRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<VerificationRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_agreement: Vec<VerificationRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_invocation: Vec<VerificationRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_delegation: Vec<VerificationRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<Service>,
}

impl Document {
    /// Create an empty document for `id` with the DID v1 context.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            context: serde_json::json!(["https://www.w3.org/ns/did/v1"]),
            id: id.into(),
            ..Default::default()
        }
    }

    /// A document with no subject and no verification methods.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.verification_method.is_empty()
    }

    /// Add a signing method, referenced from authentication and assertion.
    pub fn add_signing_method(&mut self, vm: VerificationMethod) {
        let reference = VerificationRelationship::Reference(vm.id.clone());
        self.authentication.push(reference.clone());
        self.assertion_method.push(reference.clone());
        self.capability_invocation.push(reference.clone());
        self.capability_delegation.push(reference);
        self.verification_method.push(vm);
    }

    /// Add a key agreement method.
    pub fn add_key_agreement_method(&mut self, vm: VerificationMethod) {
        self.key_agreement
            .push(VerificationRelationship::Reference(vm.id.clone()));
        self.verification_method.push(vm);
    }

    /// Look up a verification method by its full id.
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }
}

/// Metadata describing the resolution process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Resolution error code, e.g. "notFound".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Metadata about the resolved document itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

/// The output of DID resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    #[serde(rename = "@context", default, skip_serializing_if = "serde_json::Value::is_null")]
    pub context: serde_json::Value,
    #[serde(default)]
    pub did_document: Document,
    #[serde(default)]
    pub did_resolution_metadata: ResolutionMetadata,
    #[serde(default)]
    pub did_document_metadata: DocumentMetadata,
}

impl ResolutionResult {
    /// Wrap a locally produced document.
    pub fn from_document(document: Document, method: &str) -> Self {
        Self {
            context: serde_json::json!("https://w3id.org/did-resolution/v1"),
            did_document: document,
            did_resolution_metadata: ResolutionMetadata {
                content_type: Some("application/did+ld+json".into()),
                error: None,
                method: Some(method.to_string()),
            },
            did_document_metadata: DocumentMetadata::default(),
        }
    }
}

/// Options passed through to resolvers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionOptions {
    /// Requested representation, sent as the HTTP `Accept` header.
    pub accept: Option<String>,
}
