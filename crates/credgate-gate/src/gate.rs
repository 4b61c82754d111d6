//! The credential gate orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use credgate_crypto::JwtVerifier;
use credgate_did::{extract_public_key, DidResolver, ResolutionOptions, Resolver};
use credgate_exchange::{
    parse_presentation_jwt, ParsedPresentation, PresentationExchangeVerifier, PresentationTarget,
    SubmissionVerifier, VerifiedSubmissionData,
};
use serde::{Deserialize, Serialize};

use crate::config::GateConfig;
use crate::error::GateError;
use crate::state::{GateEvent, GateState, GateStateMachine};

/// DID methods resolved in-process before falling back to a universal resolver.
pub const LOCAL_RESOLUTION_METHODS: [&str; 4] = ["key", "web", "pkh", "peer"];

/// Outcome of validating one presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateResult {
    pub valid: bool,
    /// Presentation `jti`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
    /// Presentation `iss`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter: Option<String>,
    /// Why the presentation was denied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

enum HandlerOutcome {
    Accepted,
    Rejected(String),
}

/// Admits or denies callers based on the credentials they present.
pub struct CredentialGate {
    config: GateConfig,
    resolver: Arc<Resolver>,
    verifier: Arc<dyn SubmissionVerifier>,
    state: GateState,
}

impl CredentialGate {
    /// Validate `config` and build the resolver and default submission verifier.
    pub async fn new(config: GateConfig) -> Result<Self, GateError> {
        if let Err(e) = config.is_valid() {
            tracing::error!(error = %e, "rejecting gate configuration");
            return Err(e);
        }

        let resolver = Resolver::with_options(
            Some(&LOCAL_RESOLUTION_METHODS[..]),
            config.universal_resolver_url.as_deref(),
            config.resolver_options,
        )
        .await
        .map_err(GateError::Resolver)?;
        let resolver = Arc::new(resolver);
        let verifier = Arc::new(PresentationExchangeVerifier::new(resolver.clone()));

        let state = GateStateMachine::transition(GateState::Unconfigured, GateEvent::Configure)?;
        tracing::info!(
            admin = %config.admin_did,
            definition = %config.presentation_definition.id,
            handlers = config.custom_handlers.len(),
            remote = config.universal_resolver_url.is_some(),
            "credential gate configured"
        );

        Ok(Self {
            config,
            resolver,
            verifier,
            state,
        })
    }

    /// Replace the default presentation exchange verifier.
    pub fn with_submission_verifier(mut self, verifier: Arc<dyn SubmissionVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    /// DID methods the gate can currently resolve.
    pub async fn supported_methods(&self) -> Vec<String> {
        self.resolver.methods().await
    }

    /// Validate a VP JWT.
    ///
    /// Only a token that cannot be parsed as a presentation yields `Err`;
    /// every other failure is reported as an invalid [`GateResult`].
    pub async fn validate(&self, token: &str) -> Result<GateResult, GateError> {
        let parsed = parse_presentation_jwt(token).map_err(GateError::InvalidToken)?;

        let Some(limit) = self.config.validation_timeout else {
            return self.run(token, &parsed).await;
        };
        match tokio::time::timeout(limit, self.run(token, &parsed)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?limit, "presentation validation timed out");
                Ok(GateResult {
                    valid: false,
                    submission_id: parsed.claims.jti.clone(),
                    submitter: parsed.claims.iss.clone(),
                    reason: Some(format!("validation timed out after {:?}", limit)),
                })
            }
        }
    }

    async fn run(&self, token: &str, parsed: &ParsedPresentation) -> Result<GateResult, GateError> {
        let mut state = self.state;

        if parsed.submission().is_none() {
            tracing::warn!("presentation carries no presentation submission");
            return decide(
                state,
                GateResult {
                    reason: Some("no presentation submission found in VP".into()),
                    ..Default::default()
                },
            );
        }

        let mut result = GateResult {
            valid: false,
            submission_id: parsed.claims.jti.clone(),
            submitter: parsed.claims.iss.clone(),
            reason: None,
        };

        let Some(kid) = parsed.header.kid.as_deref() else {
            return deny(state, result, "getting kid from VP JWT: header has no kid".into());
        };
        let Some(signer) = parsed.claims.iss.as_deref() else {
            return deny(state, result, "VP JWT has no issuer".into());
        };

        state = GateStateMachine::transition(state, GateEvent::Resolve)?;
        let resolved = match self.resolver.resolve(signer, &ResolutionOptions::default()).await {
            Ok(resolved) => resolved,
            Err(e) => {
                return deny(state, result, format!("resolving VP submission signer's DID: {}", e))
            }
        };
        let key = match extract_public_key(&resolved.did_document, kid) {
            Ok(key) => key,
            Err(e) => {
                return deny(state, result, format!("getting public key from VP signer's DID: {}", e))
            }
        };

        state = GateStateMachine::transition(state, GateEvent::Verify)?;
        let verifier = match JwtVerifier::new(&self.config.admin_did, key) {
            Ok(verifier) => verifier,
            Err(e) => return deny(state, result, format!("constructing JWT verifier: {}", e)),
        };
        let data = match self
            .verifier
            .verify_submission(
                &verifier,
                PresentationTarget::JwtVp,
                &self.config.presentation_definition,
                token.as_bytes(),
            )
            .await
        {
            Ok(data) => data,
            Err(e) => return deny(state, result, format!("verifying VP submission: {}", e)),
        };

        state = GateStateMachine::transition(state, GateEvent::ApplyHandlers)?;
        match self.apply_custom_handlers(&data).await {
            Ok(HandlerOutcome::Accepted) => {
                result.valid = true;
                tracing::info!(
                    submitter = %signer,
                    submission = ?result.submission_id,
                    "presentation accepted"
                );
                decide(state, result)
            }
            Ok(HandlerOutcome::Rejected(id)) => deny(
                state,
                result,
                format!("custom handler rejected submission for input descriptor {}", id),
            ),
            Err(e) => deny(state, result, e.to_string()),
        }
    }

    async fn apply_custom_handlers(
        &self,
        data: &[VerifiedSubmissionData],
    ) -> Result<HandlerOutcome, GateError> {
        let mut by_descriptor: HashMap<&str, &VerifiedSubmissionData> = HashMap::with_capacity(data.len());
        for item in data {
            if by_descriptor
                .insert(item.input_descriptor_id.as_str(), item)
                .is_some()
            {
                return Err(GateError::DuplicateSubmissionData(
                    item.input_descriptor_id.clone(),
                ));
            }
        }

        for (id, handler) in &self.config.custom_handlers {
            let item = by_descriptor
                .get(id.as_str())
                .ok_or_else(|| GateError::MissingSubmissionData(id.clone()))?;
            let accepted = handler.handle(item).await.map_err(|source| GateError::Handler {
                descriptor: id.clone(),
                source,
            })?;
            tracing::debug!(descriptor = %id, accepted, "custom handler evaluated");
            if !accepted {
                return Ok(HandlerOutcome::Rejected(id.clone()));
            }
        }
        Ok(HandlerOutcome::Accepted)
    }
}

fn deny(state: GateState, mut result: GateResult, reason: String) -> Result<GateResult, GateError> {
    tracing::warn!(
        stage = %state,
        submitter = ?result.submitter,
        reason = %reason,
        "presentation denied"
    );
    result.valid = false;
    result.reason = Some(reason);
    decide(state, result)
}

fn decide(state: GateState, result: GateResult) -> Result<GateResult, GateError> {
    GateStateMachine::transition(state, GateEvent::Decide)?;
    Ok(result)
}
