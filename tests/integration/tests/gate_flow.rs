//! Integration test: presentations flowing through a configured gate.
//!
//! Issuer signs a credential, holder wraps it in a presentation for the
//! gate's admin DID, and the gate resolves, verifies and applies handlers.

use std::time::Duration;

use credgate_gate::{CredentialGate, CustomHandler, GateConfig, GateError, GateSettings, GateState};
use credgate_integration_tests::{employment_definition, employment_definition_json, Party, EMPLOYEE_DESCRIPTOR};
use serde_json::json;

fn admin() -> Party {
    Party::new(100)
}

fn department_is(expected: &'static str) -> CustomHandler {
    CustomHandler::from_fn(EMPLOYEE_DESCRIPTOR, move |data| {
        Ok(data.filtered_data.get(1) == Some(&json!(expected)))
    })
}

async fn gate_with(handler: Option<CustomHandler>) -> CredentialGate {
    let mut config = GateConfig::new(admin().did, employment_definition());
    if let Some(handler) = handler {
        config = config.with_custom_handler(handler);
    }
    CredentialGate::new(config).await.expect("gate should construct")
}

// =========================================================================
// End-to-end decisions
// =========================================================================

#[tokio::test]
async fn test_accepts_when_handler_accepts() {
    let issuer = Party::new(1);
    let holder = Party::new(2);
    let gate = gate_with(Some(department_is("engineering"))).await;
    assert_eq!(gate.state(), GateState::Configured);

    let token = issuer.present(&admin().did, &holder, "engineering");
    let result = gate.validate(&token).await.unwrap();

    assert!(result.valid, "denied: {:?}", result.reason);
    assert_eq!(result.submitter.as_deref(), Some(holder.did.as_str()));
    assert!(result.submission_id.unwrap().starts_with("urn:uuid:"));
}

#[tokio::test]
async fn test_rejection_names_descriptor() {
    let issuer = Party::new(3);
    let holder = Party::new(4);
    let gate = gate_with(Some(department_is("finance"))).await;

    let token = issuer.present(&admin().did, &holder, "engineering");
    let result = gate.validate(&token).await.unwrap();

    assert!(!result.valid);
    let reason = result.reason.unwrap();
    assert!(reason.contains(EMPLOYEE_DESCRIPTOR), "{}", reason);
    assert_eq!(result.submitter.as_deref(), Some(holder.did.as_str()));
}

#[tokio::test]
async fn test_presentation_without_submission() {
    let holder = Party::new(5);
    let token = credgate_crypto::sign(
        Some(holder.kid.as_str()),
        Some("JWT"),
        &json!({
            "iss": holder.did,
            "aud": admin().did,
            "jti": "urn:uuid:no-submission",
            "vp": {"type": ["VerifiablePresentation"], "verifiableCredential": []}
        }),
        &holder.keypair,
    )
    .unwrap();

    let result = gate_with(None).await.validate(&token).await.unwrap();
    assert!(!result.valid);
    assert!(result.submitter.is_none());
    assert!(result.submission_id.is_none());
}

#[tokio::test]
async fn test_credential_failing_constraints() {
    let issuer = Party::new(6);
    let holder = Party::new(7);
    let gate = gate_with(None).await;

    let token = issuer.present(&admin().did, &holder, "");
    let result = gate.validate(&token).await.unwrap();
    assert!(!result.valid);
    assert!(result.reason.unwrap().contains(EMPLOYEE_DESCRIPTOR));
}

#[tokio::test]
async fn test_presentation_for_other_gate() {
    let issuer = Party::new(8);
    let holder = Party::new(9);
    let other = Party::new(10);

    let token = issuer.present(&other.did, &holder, "engineering");
    let result = gate_with(None).await.validate(&token).await.unwrap();
    assert!(!result.valid);
}

#[tokio::test]
async fn test_tampered_presentation() {
    let issuer = Party::new(11);
    let holder = Party::new(12);
    let token = issuer.present(&admin().did, &holder, "engineering");
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let forged = Party::new(13).present(&admin().did, &holder, "executive");
    parts[1] = forged.split('.').nth(1).unwrap().to_string();

    let result = gate_with(None).await.validate(&parts.join(".")).await.unwrap();
    assert!(!result.valid);
}

#[tokio::test]
async fn test_garbage_token_is_error() {
    let gate = gate_with(None).await;
    assert!(matches!(gate.validate("garbage").await, Err(GateError::InvalidToken(_))));
}

// =========================================================================
// Construction
// =========================================================================

#[tokio::test]
async fn test_handler_for_unknown_descriptor() {
    let config = GateConfig::new(admin().did, employment_definition())
        .with_custom_handler(CustomHandler::from_fn("payroll", |_| Ok(true)));
    let err = CredentialGate::new(config).await.err().unwrap();
    assert!(err.to_string().contains("payroll"), "{}", err);
}

#[tokio::test]
async fn test_handler_keyed_under_other_id() {
    let mut config = GateConfig::new(admin().did, employment_definition());
    config
        .custom_handlers
        .insert("badge".into(), department_is("engineering"));
    let err = CredentialGate::new(config).await.err().unwrap();
    assert!(err.to_string().contains("mismatched input descriptor ID"), "{}", err);
}

#[tokio::test]
async fn test_unhealthy_universal_resolver() {
    let config = GateConfig::new(admin().did, employment_definition())
        .with_universal_resolver("https://127.0.0.1:1");
    let err = CredentialGate::new(config).await.err().unwrap();
    assert!(matches!(err, GateError::Resolver(_)));
    assert!(err.to_string().starts_with("failed to create resolver"));
}

// =========================================================================
// Settings file
// =========================================================================

#[tokio::test]
async fn test_gate_from_settings_file() {
    let dir = std::env::temp_dir().join(format!("credgate-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let definition_path = dir.join("definition.json");
    std::fs::write(&definition_path, employment_definition_json().to_string()).unwrap();
    let settings_path = dir.join("credgate.toml");
    std::fs::write(
        &settings_path,
        format!(
            "admin_did = \"{}\"\ndefinition_path = \"{}\"\nvalidation_timeout_secs = 30\n",
            admin().did,
            definition_path.display()
        ),
    )
    .unwrap();

    let config = GateSettings::load(&settings_path)
        .unwrap()
        .into_config([department_is("engineering")])
        .unwrap();
    assert_eq!(config.validation_timeout, Some(Duration::from_secs(30)));
    let gate = CredentialGate::new(config).await.unwrap();

    let token = Party::new(14).present(&admin().did, &Party::new(15), "engineering");
    assert!(gate.validate(&token).await.unwrap().valid);

    std::fs::remove_dir_all(&dir).unwrap();
}
