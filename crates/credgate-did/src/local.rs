use std::sync::Arc;

use async_trait::async_trait;

use crate::did::Did;
use crate::document::{ResolutionOptions, ResolutionResult};
use crate::error::ResolverError;
use crate::methods::{self, MethodResolver};
use crate::resolver::DidResolver;

/// Resolves DIDs with in-process method strategies from the registry.
pub struct LocalResolver {
    strategies: Vec<Arc<dyn MethodResolver>>,
}

impl LocalResolver {
    /// Create a resolver serving `methods`, in the given order.
    ///
    /// Fails if the set is empty or any method has no registered strategy.
    pub fn new<S: AsRef<str>>(methods: &[S]) -> Result<Self, ResolverError> {
        if methods.is_empty() {
            return Err(ResolverError::EmptyMethodSet);
        }

        let mut strategies: Vec<Arc<dyn MethodResolver>> = Vec::with_capacity(methods.len());
        for method in methods {
            let method = method.as_ref();
            let strategy = methods::lookup(method)
                .ok_or_else(|| ResolverError::UnsupportedMethod(method.to_string()))?;
            if strategies.iter().any(|s| s.method() == strategy.method()) {
                continue;
            }
            strategies.push(strategy);
        }
        Ok(Self { strategies })
    }

    /// Configured method names.
    pub fn supported_methods(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.method().to_string()).collect()
    }

    pub fn supports(&self, method: &str) -> bool {
        self.strategies.iter().any(|s| s.method() == method)
    }

    /// Resolve a parsed DID with the strategy for its method.
    pub async fn resolve_did(
        &self,
        did: &Did,
        options: &ResolutionOptions,
    ) -> Result<ResolutionResult, ResolverError> {
        let strategy = self
            .strategies
            .iter()
            .find(|s| s.method() == did.method())
            .ok_or_else(|| ResolverError::UnsupportedMethod(did.method().to_string()))?;
        strategy.resolve(did, options).await
    }
}

#[async_trait]
impl DidResolver for LocalResolver {
    async fn resolve(
        &self,
        did: &str,
        options: &ResolutionOptions,
    ) -> Result<ResolutionResult, ResolverError> {
        let did = Did::parse(did)?;
        self.resolve_did(&did, options).await
    }

    async fn methods(&self) -> Vec<String> {
        self.supported_methods()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credgate_crypto::KeyPair;

    #[test]
    fn test_new_with_known_methods() {
        let resolver = LocalResolver::new(&["key", "web", "pkh", "peer"]).unwrap();
        assert_eq!(resolver.supported_methods(), vec!["key", "web", "pkh", "peer"]);
        assert!(resolver.supports("peer"));
        assert!(!resolver.supports("jwk"));
    }

    #[test]
    fn test_new_rejects_unknown_method() {
        let result = LocalResolver::new(&["key", "bogus"]);
        match result {
            Err(ResolverError::UnsupportedMethod(m)) => assert_eq!(m, "bogus"),
            _ => panic!("expected UnsupportedMethod"),
        }
    }

    #[test]
    fn test_new_rejects_empty_set() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            LocalResolver::new(&empty),
            Err(ResolverError::EmptyMethodSet)
        ));
    }

    #[test]
    fn test_duplicate_methods_collapsed() {
        let resolver = LocalResolver::new(&["key", "key"]).unwrap();
        assert_eq!(resolver.supported_methods(), vec!["key"]);
    }

    #[tokio::test]
    async fn test_resolve_delegates_to_strategy() {
        let resolver = LocalResolver::new(&["key"]).unwrap();
        let did = KeyPair::generate().did_key();
        let result = resolver.resolve(&did, &ResolutionOptions::default()).await.unwrap();
        assert_eq!(result.did_document.id, did);
    }

    #[tokio::test]
    async fn test_resolve_unconfigured_method() {
        let resolver = LocalResolver::new(&["key"]).unwrap();
        let result = resolver
            .resolve("did:web:example.com", &ResolutionOptions::default())
            .await;
        assert!(matches!(result, Err(ResolverError::UnsupportedMethod(_))));
    }

    #[tokio::test]
    async fn test_strategy_errors_propagate() {
        let resolver = LocalResolver::new(&["key"]).unwrap();
        let result = resolver
            .resolve("did:key:garbage", &ResolutionOptions::default())
            .await;
        assert!(matches!(result, Err(ResolverError::InvalidDid(_))));
    }
}
