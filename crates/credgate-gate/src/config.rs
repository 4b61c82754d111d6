//! Gate configuration and its file-backed settings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use credgate_did::RemoteResolverOptions;
use credgate_exchange::PresentationDefinition;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::GateError;
use crate::handler::CustomHandler;

/// Everything a [`CredentialGate`](crate::CredentialGate) needs.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// DID of the gate operator; presentations must name it as audience.
    pub admin_did: String,
    /// Universal resolver consulted when local resolution fails.
    pub universal_resolver_url: Option<String>,
    pub presentation_definition: PresentationDefinition,
    /// Handlers keyed by the input descriptor they evaluate.
    pub custom_handlers: BTreeMap<String, CustomHandler>,
    pub resolver_options: RemoteResolverOptions,
    /// Upper bound on a single `validate` call.
    pub validation_timeout: Option<Duration>,
}

impl GateConfig {
    pub fn new(admin_did: impl Into<String>, presentation_definition: PresentationDefinition) -> Self {
        Self {
            admin_did: admin_did.into(),
            universal_resolver_url: None,
            presentation_definition,
            custom_handlers: BTreeMap::new(),
            resolver_options: RemoteResolverOptions::default(),
            validation_timeout: None,
        }
    }

    pub fn with_universal_resolver(mut self, url: impl Into<String>) -> Self {
        self.universal_resolver_url = Some(url.into());
        self
    }

    /// Register `handler` under its own input descriptor id.
    pub fn with_custom_handler(mut self, handler: CustomHandler) -> Self {
        self.custom_handlers
            .insert(handler.input_descriptor_id().to_string(), handler);
        self
    }

    pub fn with_validation_timeout(mut self, timeout: Duration) -> Self {
        self.validation_timeout = Some(timeout);
        self
    }

    /// Check the configuration is complete and self-consistent.
    pub fn is_valid(&self) -> Result<(), GateError> {
        if self.admin_did.trim().is_empty() {
            return Err(GateError::InvalidConfig("admin DID is required".into()));
        }
        self.presentation_definition.is_valid().map_err(|e| {
            GateError::InvalidConfig(format!("invalid presentation definition: {}", e))
        })?;

        for (id, handler) in &self.custom_handlers {
            if handler.input_descriptor_id().is_empty() {
                return Err(GateError::InvalidConfig(
                    "custom handler input descriptor ID is required".into(),
                ));
            }
            if id != handler.input_descriptor_id() {
                return Err(GateError::InvalidConfig(format!(
                    "mismatched input descriptor ID, expected: {}, got {}",
                    id,
                    handler.input_descriptor_id()
                )));
            }
            if self.presentation_definition.input_descriptor(id).is_none() {
                return Err(GateError::InvalidConfig(format!(
                    "input descriptor ID {} not found in presentation definition",
                    id
                )));
            }
        }
        Ok(())
    }
}

/// File-backed gate settings.
///
/// ```toml
/// admin_did = "did:key:z6Mk..."
/// universal_resolver_url = "https://dev.uniresolver.io"
/// definition_path = "definition.json"
/// validation_timeout_secs = 30
///
/// [resolver]
/// cache_ttl_secs = 86400
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GateSettings {
    #[serde(default)]
    pub admin_did: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub universal_resolver_url: Option<String>,

    /// JSON file holding the presentation definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_timeout_secs: Option<u64>,

    #[serde(default)]
    pub resolver: ResolverSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// How long the universal resolver's method list is trusted.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_cache_ttl_secs() -> u64 {
    RemoteResolverOptions::default().cache_ttl.as_secs()
}
fn default_http_timeout_secs() -> u64 {
    RemoteResolverOptions::default().http_timeout.as_secs()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ResolverSettings {
    pub fn options(&self) -> RemoteResolverOptions {
        RemoteResolverOptions {
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            http_timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber. `RUST_LOG` overrides `level`.
    pub fn init(&self) -> Result<(), GateError> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let result = match self.format.as_str() {
            "json" => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .try_init(),
            "text" => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .try_init(),
            other => return Err(GateError::Logging(format!("unknown log format {}", other))),
        };
        result.map_err(|e| GateError::Logging(e.to_string()))
    }
}

impl GateSettings {
    /// Load settings from a TOML file, falling back to defaults if it is missing.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the settings to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), GateError> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Read the presentation definition and assemble a [`GateConfig`].
    ///
    /// The result is not validated; the gate does that on construction.
    pub fn into_config(
        self,
        handlers: impl IntoIterator<Item = CustomHandler>,
    ) -> Result<GateConfig, GateError> {
        let path = self.definition_path.ok_or_else(|| {
            GateError::InvalidConfig("presentation definition path is required".into())
        })?;
        let definition: PresentationDefinition =
            serde_json::from_str(&std::fs::read_to_string(&path)?)?;

        let mut config = GateConfig::new(self.admin_did, definition);
        config.universal_resolver_url = self.universal_resolver_url.filter(|u| !u.is_empty());
        config.resolver_options = self.resolver.options();
        config.validation_timeout = self.validation_timeout_secs.map(Duration::from_secs);
        for handler in handlers {
            config = config.with_custom_handler(handler);
        }
        Ok(config)
    }
}
