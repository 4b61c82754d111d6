//! Per-method DID resolution strategies and the static method registry.
//!
//! Adding a DID method means implementing [`MethodResolver`] and adding an
//! entry to [`REGISTRY`].

mod jwk;
mod key;
mod peer;
mod pkh;
mod web;

use std::sync::Arc;

use async_trait::async_trait;

pub use jwk::JwkResolver;
pub use key::KeyResolver;
pub use peer::PeerResolver;
pub use pkh::PkhResolver;
pub use web::{did_to_url, WebResolver};

use crate::did::Did;
use crate::document::{ResolutionOptions, ResolutionResult};
use crate::error::ResolverError;

/// Resolves DIDs of a single method.
#[async_trait]
pub trait MethodResolver: Send + Sync {
    /// The DID method served, e.g. "key".
    fn method(&self) -> &'static str;

    /// Resolve a DID of this method to its document.
    async fn resolve(
        &self,
        did: &Did,
        options: &ResolutionOptions,
    ) -> Result<ResolutionResult, ResolverError>;
}

type Constructor = fn() -> Arc<dyn MethodResolver>;

/// Registered method names and their strategy constructors.
pub static REGISTRY: &[(&str, Constructor)] = &[
    ("key", key_resolver),
    ("web", web_resolver),
    ("pkh", pkh_resolver),
    ("peer", peer_resolver),
    ("jwk", jwk_resolver),
];

fn key_resolver() -> Arc<dyn MethodResolver> {
    Arc::new(KeyResolver)
}

fn web_resolver() -> Arc<dyn MethodResolver> {
    Arc::new(WebResolver::new())
}

fn pkh_resolver() -> Arc<dyn MethodResolver> {
    Arc::new(PkhResolver)
}

fn peer_resolver() -> Arc<dyn MethodResolver> {
    Arc::new(PeerResolver)
}

fn jwk_resolver() -> Arc<dyn MethodResolver> {
    Arc::new(JwkResolver)
}

/// Create the strategy registered for `method`, if any.
pub fn lookup(method: &str) -> Option<Arc<dyn MethodResolver>> {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, constructor)| constructor())
}

/// Names of every registered method, in registry order.
pub fn registered_methods() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}

/// Reject a DID handed to the wrong strategy.
fn ensure_method(did: &Did, expected: &str) -> Result<(), ResolverError> {
    if did.method() != expected {
        return Err(ResolverError::InvalidDid(format!(
            "{} is not a did:{} identifier",
            did, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_methods() {
        assert_eq!(registered_methods(), vec!["key", "web", "pkh", "peer", "jwk"]);
    }

    #[test]
    fn test_lookup_known() {
        for name in registered_methods() {
            let resolver = lookup(name).unwrap();
            assert_eq!(resolver.method(), name);
        }
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(lookup("bogus").is_none());
        assert!(lookup("").is_none());
    }

    #[tokio::test]
    async fn test_strategy_rejects_other_method() {
        let resolver = lookup("key").unwrap();
        let did = Did::parse("did:web:example.com").unwrap();
        let result = resolver.resolve(&did, &ResolutionOptions::default()).await;
        assert!(matches!(result, Err(ResolverError::InvalidDid(_))));
    }
}
