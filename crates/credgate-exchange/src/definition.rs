//! Presentation definition model (DIF Presentation Exchange v2).

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json_path::JsonPath;

use crate::error::ExchangeError;

/// The policy a submission must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Formats accepted for every descriptor unless overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ClaimFormat>,
    #[serde(default)]
    pub input_descriptors: Vec<InputDescriptor>,
}

/// One required claim shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ClaimFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

/// Field constraints of an input descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
    /// "required" or "preferred".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_disclosure: Option<String>,
}

/// A claim that must be present (and optionally match a filter).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// JSONPath expressions; the first one yielding a match wins.
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

/// JSON-schema style filter applied to a selected value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<serde_json::Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Accepted claim formats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_vc: Option<JwtFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_vp: Option<JwtFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwtFormat {
    pub alg: Vec<String>,
}

impl PresentationDefinition {
    /// Check the definition is structurally usable.
    pub fn is_valid(&self) -> Result<(), ExchangeError> {
        let invalid = |reason: String| Err(ExchangeError::InvalidDefinition(reason));

        if self.id.is_empty() {
            return invalid("id is required".into());
        }
        if self.input_descriptors.is_empty() {
            return invalid("at least one input descriptor is required".into());
        }

        let mut seen = HashSet::new();
        for descriptor in &self.input_descriptors {
            if descriptor.id.is_empty() {
                return invalid("input descriptor id is required".into());
            }
            if !seen.insert(descriptor.id.as_str()) {
                return invalid(format!("duplicate input descriptor id {}", descriptor.id));
            }
            if let Some(constraints) = &descriptor.constraints {
                constraints
                    .is_valid()
                    .map_err(|reason| {
                        ExchangeError::InvalidDefinition(format!(
                            "input descriptor {}: {}",
                            descriptor.id, reason
                        ))
                    })?;
            }
        }
        Ok(())
    }

    pub fn input_descriptor_ids(&self) -> Vec<&str> {
        self.input_descriptors.iter().map(|d| d.id.as_str()).collect()
    }

    pub fn input_descriptor(&self, id: &str) -> Option<&InputDescriptor> {
        self.input_descriptors.iter().find(|d| d.id == id)
    }
}

impl Constraints {
    fn is_valid(&self) -> Result<(), String> {
        let fields = match &self.fields {
            Some(fields) if !fields.is_empty() => fields,
            _ => return Err("constraints must contain at least one field".into()),
        };
        for field in fields {
            if field.path.is_empty() {
                return Err("field must have at least one path".into());
            }
            for path in &field.path {
                JsonPath::parse(path).map_err(|e| format!("invalid path {}: {}", path, e))?;
            }
            if let Some(pattern) = field.filter.as_ref().and_then(|f| f.pattern.as_ref()) {
                Regex::new(pattern).map_err(|e| format!("invalid pattern {}: {}", pattern, e))?;
            }
        }
        Ok(())
    }
}
