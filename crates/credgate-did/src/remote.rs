use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use url::Url;

use crate::document::{ResolutionOptions, ResolutionResult};
use crate::error::ResolverError;
use crate::resolver::DidResolver;

/// How long a fetched method list stays valid.
pub const DEFAULT_METHOD_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default timeout for each HTTP request to the universal resolver.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for [`RemoteResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteResolverOptions {
    pub cache_ttl: Duration,
    pub http_timeout: Duration,
}

impl Default for RemoteResolverOptions {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_METHOD_CACHE_TTL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

#[derive(Debug, Default)]
struct MethodCache {
    last_update: Option<Instant>,
    methods: Vec<String>,
}

impl MethodCache {
    fn is_fresh(&self, ttl: Duration) -> bool {
        match self.last_update {
            Some(at) => !self.methods.is_empty() && at.elapsed() <= ttl,
            None => false,
        }
    }

    fn update(&mut self, methods: Vec<String>) {
        self.last_update = Some(Instant::now());
        self.methods = methods;
    }
}

/// Client for a universal resolver service.
///
/// The service's supported-method list is cached for the configured TTL.
/// Only one refresh can be in flight: the cache lock is held across the
/// HTTP call.
pub struct RemoteResolver {
    client: reqwest::Client,
    base_url: String,
    cache: Mutex<MethodCache>,
    cache_ttl: Duration,
}

impl RemoteResolver {
    /// Connect to the universal resolver at `url` with default options.
    pub async fn new(url: &str) -> Result<Self, ResolverError> {
        Self::with_options(url, RemoteResolverOptions::default()).await
    }

    /// Connect to the universal resolver at `url`.
    ///
    /// The URL must be absolute and use `https`. The service must answer a
    /// method listing before the resolver is returned.
    pub async fn with_options(
        url: &str,
        options: RemoteResolverOptions,
    ) -> Result<Self, ResolverError> {
        let parsed = Url::parse(url).map_err(|e| ResolverError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "https" {
            return Err(ResolverError::InvalidUrl {
                url: url.to_string(),
                reason: format!("scheme must be https, got {}", parsed.scheme()),
            });
        }
        Self::connect(url, options).await
    }

    pub(crate) async fn connect(url: &str, options: RemoteResolverOptions) -> Result<Self, ResolverError> {
        let client = reqwest::Client::builder()
            .timeout(options.http_timeout)
            .build()?;
        let resolver = Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            cache: Mutex::new(MethodCache::default()),
            cache_ttl: options.cache_ttl,
        };
        resolver.health_check().await?;
        tracing::info!(url = %resolver.base_url, "connected to universal resolver");
        Ok(resolver)
    }

    /// Force a method listing; any failure marks the service unhealthy.
    /// A failed check leaves the cache as it was.
    async fn health_check(&self) -> Result<(), ResolverError> {
        self.get_methods(true)
            .await
            .map(|_| ())
            .map_err(|e| ResolverError::UnhealthyResolver {
                url: self.base_url.clone(),
                reason: e.to_string(),
            })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Methods supported by the service, from cache unless stale or forced.
    ///
    /// A failed fetch leaves the cache untouched.
    pub async fn get_methods(&self, force_refresh: bool) -> Result<Vec<String>, ResolverError> {
        let mut cache = self.cache.lock().await;
        if !force_refresh && cache.is_fresh(self.cache_ttl) {
            return Ok(cache.methods.clone());
        }

        let methods = self.fetch_methods().await?;
        tracing::debug!(url = %self.base_url, count = methods.len(), "refreshed resolver method cache");
        cache.update(methods.clone());
        Ok(methods)
    }

    async fn fetch_methods(&self) -> Result<Vec<String>, ResolverError> {
        let url = format!("{}/1.0/methods", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ResolverError::InvalidResponse {
            url,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl DidResolver for RemoteResolver {
    async fn resolve(
        &self,
        did: &str,
        options: &ResolutionOptions,
    ) -> Result<ResolutionResult, ResolverError> {
        let url = format!("{}/1.0/identifiers/{}", self.base_url, did);
        let mut request = self.client.get(&url);
        if let Some(accept) = &options.accept {
            request = request.header(reqwest::header::ACCEPT, accept);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let result: ResolutionResult = match serde_json::from_slice(&body) {
            Ok(result) => result,
            Err(_) if !status.is_success() => {
                return Err(ResolverError::HttpStatus {
                    url,
                    status: status.as_u16(),
                })
            }
            Err(e) => {
                return Err(ResolverError::InvalidResponse {
                    url,
                    reason: e.to_string(),
                })
            }
        };

        if let Some(error) = &result.did_resolution_metadata.error {
            return Err(ResolverError::Resolution {
                did: did.to_string(),
                reason: error.clone(),
            });
        }
        if !status.is_success() {
            return Err(ResolverError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }
        if result.did_document.is_empty() {
            return Err(ResolverError::Resolution {
                did: did.to_string(),
                reason: "empty DID document".into(),
            });
        }
        Ok(result)
    }

    async fn methods(&self) -> Vec<String> {
        match self.get_methods(false).await {
            Ok(methods) => methods,
            Err(e) => {
                tracing::warn!(url = %self.base_url, error = %e, "failed to list universal resolver methods");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Mock, Server, ServerGuard};
    use std::sync::Arc;

    async fn methods_mock(server: &mut ServerGuard, body: &str, hits: usize) -> Mock {
        server
            .mock("GET", "/1.0/methods")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_rejects_http_url() {
        let result = RemoteResolver::new("http://resolver.example.com").await;
        assert!(matches!(result, Err(ResolverError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_rejects_relative_url() {
        let result = RemoteResolver::new("/1.0/identifiers").await;
        assert!(matches!(result, Err(ResolverError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_connect_runs_health_check() {
        let mut server = Server::new_async().await;
        let mock = methods_mock(&mut server, r#"["key","web","ion"]"#, 1).await;

        let resolver = RemoteResolver::connect(&server.url(), RemoteResolverOptions::default())
            .await
            .unwrap();
        assert_eq!(resolver.methods().await, vec!["key", "web", "ion"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unhealthy_on_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/1.0/methods")
            .with_status(500)
            .create_async()
            .await;

        let result = RemoteResolver::connect(&server.url(), RemoteResolverOptions::default()).await;
        assert!(matches!(result, Err(ResolverError::UnhealthyResolver { .. })));
    }

    #[tokio::test]
    async fn test_unhealthy_on_invalid_body() {
        let mut server = Server::new_async().await;
        let _mock = methods_mock(&mut server, "not json", 1).await;

        let result = RemoteResolver::connect(&server.url(), RemoteResolverOptions::default()).await;
        assert!(matches!(result, Err(ResolverError::UnhealthyResolver { .. })));
    }

    #[tokio::test]
    async fn test_cache_within_ttl() {
        let mut server = Server::new_async().await;
        let mock = methods_mock(&mut server, r#"["key"]"#, 1).await;

        let resolver = RemoteResolver::connect(&server.url(), RemoteResolverOptions::default())
            .await
            .unwrap();
        for _ in 0..3 {
            assert_eq!(resolver.get_methods(false).await.unwrap(), vec!["key"]);
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_cache_refreshes_after_ttl() {
        let mut server = Server::new_async().await;
        let mock = methods_mock(&mut server, r#"["key"]"#, 2).await;

        let options = RemoteResolverOptions {
            cache_ttl: Duration::from_millis(50),
            ..Default::default()
        };
        let resolver = RemoteResolver::connect(&server.url(), options).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(resolver.get_methods(false).await.unwrap(), vec!["key"]);
        assert_eq!(resolver.get_methods(false).await.unwrap(), vec!["key"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cache() {
        let mut server = Server::new_async().await;
        let ok = methods_mock(&mut server, r#"["key","web"]"#, 1).await;
        let resolver = RemoteResolver::connect(&server.url(), RemoteResolverOptions::default())
            .await
            .unwrap();
        ok.remove_async().await;

        let _failing = server
            .mock("GET", "/1.0/methods")
            .with_status(503)
            .create_async()
            .await;
        assert!(resolver.get_methods(true).await.is_err());
        assert_eq!(resolver.get_methods(false).await.unwrap(), vec!["key", "web"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_refresh_fetches_once() {
        let mut server = Server::new_async().await;
        let mock = methods_mock(&mut server, r#"["key","web"]"#, 2).await;

        let options = RemoteResolverOptions {
            cache_ttl: Duration::from_millis(50),
            ..Default::default()
        };
        let resolver = Arc::new(RemoteResolver::connect(&server.url(), options).await.unwrap());
        tokio::time::sleep(Duration::from_millis(100)).await;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                tokio::spawn(async move { resolver.get_methods(false).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), vec!["key", "web"]);
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_health_check_keeps_cache() {
        let mut server = Server::new_async().await;
        let ok = methods_mock(&mut server, r#"["key","web"]"#, 1).await;
        let resolver = RemoteResolver::connect(&server.url(), RemoteResolverOptions::default())
            .await
            .unwrap();
        ok.remove_async().await;

        let _failing = server
            .mock("GET", "/1.0/methods")
            .with_status(503)
            .create_async()
            .await;
        assert!(matches!(
            resolver.health_check().await,
            Err(ResolverError::UnhealthyResolver { .. })
        ));
        assert_eq!(resolver.methods().await, vec!["key", "web"]);
    }

    #[tokio::test]
    async fn test_methods_swallows_errors() {
        let mut server = Server::new_async().await;
        let ok = methods_mock(&mut server, "[]", 1).await;
        let resolver = RemoteResolver::connect(&server.url(), RemoteResolverOptions::default())
            .await
            .unwrap();
        ok.remove_async().await;

        let _failing = server
            .mock("GET", "/1.0/methods")
            .with_status(500)
            .create_async()
            .await;
        assert!(resolver.methods().await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_document() {
        let mut server = Server::new_async().await;
        let _methods = methods_mock(&mut server, r#"["example"]"#, 1).await;
        let resolution = server
            .mock("GET", "/1.0/identifiers/did:example:123")
            .with_status(200)
            .with_header("content-type", "application/did+ld+json")
            .with_body(
                serde_json::json!({
                    "didDocument": {
                        "id": "did:example:123",
                        "verificationMethod": [{
                            "id": "did:example:123#key-1",
                            "type": "Ed25519VerificationKey2018",
                            "controller": "did:example:123",
                            "publicKeyBase58": "H3C2AVvLMv6gmMNam3uVAjZpfkcJCwDwnZn6z3wXmqPV"
                        }]
                    },
                    "didResolutionMetadata": {"contentType": "application/did+ld+json"}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let resolver = RemoteResolver::connect(&server.url(), RemoteResolverOptions::default())
            .await
            .unwrap();
        let result = resolver
            .resolve("did:example:123", &ResolutionOptions::default())
            .await
            .unwrap();
        assert_eq!(result.did_document.id, "did:example:123");
        resolution.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut server = Server::new_async().await;
        let _methods = methods_mock(&mut server, r#"["example"]"#, 1).await;
        let _resolution = server
            .mock("GET", "/1.0/identifiers/did:example:missing")
            .with_status(404)
            .with_body(r#"{"didResolutionMetadata":{"error":"notFound"}}"#)
            .create_async()
            .await;

        let resolver = RemoteResolver::connect(&server.url(), RemoteResolverOptions::default())
            .await
            .unwrap();
        let result = resolver
            .resolve("did:example:missing", &ResolutionOptions::default())
            .await;
        match result {
            Err(ResolverError::Resolution { reason, .. }) => assert_eq!(reason, "notFound"),
            other => panic!("expected resolution error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_resolve_non_json_body() {
        let mut server = Server::new_async().await;
        let _methods = methods_mock(&mut server, r#"["example"]"#, 1).await;
        let _resolution = server
            .mock("GET", "/1.0/identifiers/did:example:123")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let resolver = RemoteResolver::connect(&server.url(), RemoteResolverOptions::default())
            .await
            .unwrap();
        let result = resolver
            .resolve("did:example:123", &ResolutionOptions::default())
            .await;
        assert!(matches!(result, Err(ResolverError::InvalidResponse { .. })));
    }
}
