//! Fixtures shared by the cross-crate tests.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use credgate_crypto::{Jwk, KeyPair};
use credgate_exchange::{
    build_presentation_submission, sign_credential_jwt, PresentationClaim, PresentationDefinition,
    Signer,
};
use serde_json::{json, Value};

/// A did:key identity with its signing key.
pub struct Party {
    pub keypair: KeyPair,
    pub did: String,
    pub kid: String,
}

impl Party {
    pub fn new(seed: u8) -> Self {
        let keypair = KeyPair::from_seed(&[seed; 32]);
        let did = keypair.did_key();
        let kid = format!("{}#{}", did, &did["did:key:".len()..]);
        Self { keypair, did, kid }
    }

    pub fn signer(&self) -> Signer<'_> {
        Signer {
            did: &self.did,
            kid: &self.kid,
            keypair: &self.keypair,
        }
    }

    /// The same key as a did:jwk.
    pub fn did_jwk(&self) -> String {
        let jwk = Jwk::from_public_key(&self.keypair.public_key());
        let encoded = serde_json::to_vec(&jwk).unwrap_or_default();
        format!("did:jwk:{}", URL_SAFE_NO_PAD.encode(encoded))
    }

    /// The same key as a numalgo 0 did:peer.
    pub fn did_peer(&self) -> String {
        format!("did:peer:0{}", self.keypair.public_key().to_multibase())
    }

    /// Sign an employee credential for `subject` and wrap it in a VP
    /// addressed to `audience`.
    pub fn present(&self, audience: &str, subject: &Party, department: &str) -> String {
        let credential = json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential", "EmployeeCredential"],
            "issuer": self.did,
            "credentialSubject": {"id": subject.did, "department": department}
        });
        let vc = sign_credential_jwt(&self.signer(), &credential, None).unwrap_or_default();
        let claims = vec![PresentationClaim {
            input_descriptor_id: EMPLOYEE_DESCRIPTOR.into(),
            token: vc,
        }];
        build_presentation_submission(&subject.signer(), audience, &employment_definition(), &claims)
            .unwrap_or_default()
    }
}

pub const EMPLOYEE_DESCRIPTOR: &str = "employee-credential";

/// Requires one EmployeeCredential signed with EdDSA.
pub fn employment_definition() -> PresentationDefinition {
    serde_json::from_value(employment_definition_json()).unwrap_or_default()
}

pub fn employment_definition_json() -> Value {
    json!({
        "id": "employment-check",
        "purpose": "Admit current employees",
        "input_descriptors": [{
            "id": EMPLOYEE_DESCRIPTOR,
            "format": {"jwt_vc": {"alg": ["EdDSA"]}},
            "constraints": {"fields": [
                {"path": ["$.vc.type"], "filter": {"type": "string", "const": "EmployeeCredential"}},
                {"path": ["$.vc.credentialSubject.department"], "filter": {"type": "string", "minLength": 1}}
            ]}
        }]
    })
}
