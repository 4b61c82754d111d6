use async_trait::async_trait;

use crate::did::Did;
use crate::document::{ResolutionOptions, ResolutionResult};
use crate::error::ResolverError;
use crate::local::LocalResolver;
use crate::remote::{RemoteResolver, RemoteResolverOptions};

/// Trait for resolving DIDs to their documents.
#[async_trait]
pub trait DidResolver: Send + Sync {
    /// Resolve a DID string to its resolution result.
    async fn resolve(
        &self,
        did: &str,
        options: &ResolutionOptions,
    ) -> Result<ResolutionResult, ResolverError>;

    /// DID methods this resolver declares support for.
    async fn methods(&self) -> Vec<String>;
}

/// One source in the fallback chain.
struct Candidate<'a> {
    name: &'static str,
    resolver: &'a dyn DidResolver,
    /// Try the source without asking whether it supports the method.
    unconditional: bool,
}

/// Resolves DIDs locally first, falling back to a universal resolver.
///
/// A source is only tried when it declares support for the DID's method,
/// except that a remote-only resolver is always tried. A failing source is
/// logged and the next one is tried.
pub struct Resolver {
    local: Option<LocalResolver>,
    remote: Option<RemoteResolver>,
}

impl Resolver {
    /// Build a resolver from local methods and/or a universal resolver URL.
    pub async fn new<S: AsRef<str>>(
        local_methods: Option<&[S]>,
        remote_url: Option<&str>,
    ) -> Result<Self, ResolverError> {
        Self::with_options(local_methods, remote_url, RemoteResolverOptions::default()).await
    }

    pub async fn with_options<S: AsRef<str>>(
        local_methods: Option<&[S]>,
        remote_url: Option<&str>,
        options: RemoteResolverOptions,
    ) -> Result<Self, ResolverError> {
        let local_methods = local_methods.filter(|m| !m.is_empty());
        let remote_url = remote_url.filter(|u| !u.is_empty());
        if local_methods.is_none() && remote_url.is_none() {
            return Err(ResolverError::NoResolutionSource);
        }

        let local = local_methods.map(LocalResolver::new).transpose()?;
        let remote = match remote_url {
            Some(url) => Some(RemoteResolver::with_options(url, options).await?),
            None => None,
        };
        Ok(Self::from_parts(local, remote))
    }

    /// Assemble a resolver from already constructed sources.
    pub fn from_parts(local: Option<LocalResolver>, remote: Option<RemoteResolver>) -> Self {
        Self { local, remote }
    }

    fn candidates(&self) -> Vec<Candidate<'_>> {
        let mut candidates = Vec::with_capacity(2);
        if let Some(local) = &self.local {
            candidates.push(Candidate {
                name: "local",
                resolver: local,
                unconditional: false,
            });
        }
        if let Some(remote) = &self.remote {
            candidates.push(Candidate {
                name: "remote",
                resolver: remote,
                unconditional: self.local.is_none(),
            });
        }
        candidates
    }
}

#[async_trait]
impl DidResolver for Resolver {
    async fn resolve(
        &self,
        did: &str,
        options: &ResolutionOptions,
    ) -> Result<ResolutionResult, ResolverError> {
        let parsed = Did::parse(did)?;
        let method = parsed.method();

        for candidate in self.candidates() {
            if !candidate.unconditional
                && !candidate.resolver.methods().await.iter().any(|m| m == method)
            {
                tracing::trace!(did = did, source = candidate.name, "method not supported, skipping");
                continue;
            }
            match candidate.resolver.resolve(did, options).await {
                Ok(result) => {
                    tracing::debug!(did = did, source = candidate.name, "DID resolved");
                    return Ok(result);
                }
                Err(e) => {
                    tracing::debug!(did = did, source = candidate.name, error = %e, "resolver failed, trying next");
                }
            }
        }

        Err(ResolverError::UnresolvableDid(did.to_string()))
    }

    async fn methods(&self) -> Vec<String> {
        let mut methods = Vec::new();
        for candidate in self.candidates() {
            for method in candidate.resolver.methods().await {
                if !methods.contains(&method) {
                    methods.push(method);
                }
            }
        }
        methods
    }
}
