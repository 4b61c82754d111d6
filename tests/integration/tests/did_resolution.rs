//! Integration test: DID resolution and key extraction across methods.

use credgate_did::{
    extract_public_key, registered_methods, DidResolver, LocalResolver, ResolutionOptions, Resolver,
    ResolverError,
};
use credgate_integration_tests::Party;

async fn local() -> Resolver {
    Resolver::new(Some(&["key", "web", "pkh", "peer", "jwk"][..]), None)
        .await
        .unwrap()
}

#[test]
fn test_registry_lists_builtin_methods() {
    let mut methods = registered_methods();
    methods.sort();
    assert_eq!(methods, vec!["jwk", "key", "peer", "pkh", "web"]);
}

#[tokio::test]
async fn test_did_key_round_trip() {
    let party = Party::new(1);
    let resolved = local().await.resolve(&party.did, &ResolutionOptions::default()).await.unwrap();
    let key = extract_public_key(&resolved.did_document, &party.kid).unwrap();
    assert_eq!(key.to_bytes(), party.keypair.public_key().to_bytes());
}

#[tokio::test]
async fn test_did_jwk_round_trip() {
    let party = Party::new(2);
    let did = party.did_jwk();
    let resolved = local().await.resolve(&did, &ResolutionOptions::default()).await.unwrap();
    let key = extract_public_key(&resolved.did_document, "#0").unwrap();
    assert_eq!(key.to_bytes(), party.keypair.public_key().to_bytes());
}

#[tokio::test]
async fn test_did_peer_round_trip() {
    let party = Party::new(3);
    let did = party.did_peer();
    let resolved = local().await.resolve(&did, &ResolutionOptions::default()).await.unwrap();
    let fragment = party.keypair.public_key().to_multibase();
    let key = extract_public_key(&resolved.did_document, &fragment).unwrap();
    assert_eq!(key.to_bytes(), party.keypair.public_key().to_bytes());
}

#[tokio::test]
async fn test_unsupported_everywhere() {
    let err = local()
        .await
        .resolve("did:example:123", &ResolutionOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolverError::UnresolvableDid(_)));
}

#[tokio::test]
async fn test_bogus_local_method() {
    let err = Resolver::new(Some(&["key", "bogus"][..]), None).await.err().unwrap();
    assert!(matches!(err, ResolverError::UnsupportedMethod(ref m) if m == "bogus"));
    assert!(matches!(
        LocalResolver::new(&["bogus"]),
        Err(ResolverError::UnsupportedMethod(_))
    ));
}

#[tokio::test]
async fn test_remote_only_unhealthy() {
    let err = Resolver::new(None::<&[&str]>, Some("https://127.0.0.1:1"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ResolverError::UnhealthyResolver { .. }));
}
