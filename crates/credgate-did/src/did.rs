use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ResolverError;

/// A syntactically valid DID: `did:<method>:<method-specific-id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Parse a DID string.
    ///
    /// The value must start with `did:` and have at least two more
    /// colon-delimited segments.
    pub fn parse(value: &str) -> Result<Self, ResolverError> {
        let parts: Vec<&str> = value.split(':').collect();
        if parts.len() < 3 || parts[0] != "did" {
            return Err(ResolverError::MalformedDid(value.to_string()));
        }
        if parts[1].is_empty() || parts[2..].iter().all(|p| p.is_empty()) {
            return Err(ResolverError::MalformedDid(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    /// The method name, e.g. `key` for `did:key:z6Mk...`.
    pub fn method(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    /// Everything after `did:<method>:`.
    pub fn method_specific_id(&self) -> &str {
        let prefix = 4 + self.method().len() + 1;
        &self.0[prefix..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Did {
    type Error = ResolverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl std::str::FromStr for Did {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
