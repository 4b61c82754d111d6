use std::time::Duration;

use async_trait::async_trait;

use super::{ensure_method, MethodResolver};
use crate::did::Did;
use crate::document::{Document, ResolutionOptions, ResolutionResult};
use crate::error::ResolverError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves `did:web` by fetching `did.json` over HTTPS.
pub struct WebResolver {
    client: reqwest::Client,
}

impl WebResolver {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for WebResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a `did:web` identifier to the URL of its DID document.
pub fn did_to_url(did: &Did) -> Result<String, ResolverError> {
    let identifier = did.method_specific_id();
    if identifier.is_empty() || identifier.contains('/') {
        return Err(ResolverError::InvalidDid(format!("{} is not a valid did:web", did)));
    }

    // ":" separates path segments; a percent-encoded colon is a port separator
    let domain = identifier.replace(':', "/").replace("%3A", ":");
    let mut url = format!("https://{}", domain);
    if !identifier.contains(':') {
        url.push_str("/.well-known");
    }
    url.push_str("/did.json");
    Ok(url)
}

#[async_trait]
impl MethodResolver for WebResolver {
    fn method(&self) -> &'static str {
        "web"
    }

    async fn resolve(
        &self,
        did: &Did,
        _options: &ResolutionOptions,
    ) -> Result<ResolutionResult, ResolverError> {
        ensure_method(did, "web")?;
        let url = did_to_url(did)?;
        tracing::debug!(did = %did, url = %url, "fetching did:web document");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }
        let document: Document =
            response
                .json()
                .await
                .map_err(|e| ResolverError::InvalidResponse {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
        if document.id != did.as_str() {
            return Err(ResolverError::Resolution {
                did: did.to_string(),
                reason: format!("document id {} does not match", document.id),
            });
        }
        Ok(ResolutionResult::from_document(document, "web"))
    }
}
