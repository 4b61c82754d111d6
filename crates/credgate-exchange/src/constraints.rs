//! Input descriptor constraint matching
//!
//! Fields select values from a decoded credential with JSONPath; an optional
//! filter must accept the selected value. Only one path per field has to
//! match.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::Value;
use serde_json_path::JsonPath;

use crate::definition::{Constraints, Field, Filter};
use crate::error::ExchangeError;

impl Constraints {
    /// Select the values required by every field of the constraints.
    ///
    /// Fails if a non-optional field has no matching value.
    pub fn apply(&self, descriptor_id: &str, credential: &Value) -> Result<Vec<Value>, ExchangeError> {
        let Some(fields) = &self.fields else {
            return Ok(Vec::new());
        };

        let mut selected = Vec::with_capacity(fields.len());
        for field in fields {
            match field.select(credential)? {
                Some(value) => selected.push(value),
                None if field.optional.unwrap_or_default() => {}
                None => {
                    return Err(ExchangeError::ConstraintsNotSatisfied {
                        descriptor: descriptor_id.to_string(),
                        reason: format!("no value matches field {}", field.label()),
                    })
                }
            }
        }
        Ok(selected)
    }
}

impl Field {
    /// The first value matched by one of the field's paths and its filter.
    pub fn select(&self, credential: &Value) -> Result<Option<Value>, ExchangeError> {
        for path in &self.path {
            let query = JsonPath::parse(path).map_err(|e| ExchangeError::InvalidPath {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let nodes = query.query(credential).all();

            let Some(filter) = &self.filter else {
                if let Some(node) = nodes.first() {
                    return Ok(Some((*node).clone()));
                }
                continue;
            };
            for node in nodes {
                if filter.matches(node)? {
                    return Ok(Some(node.clone()));
                }
            }
        }
        Ok(None)
    }

    fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => self.path.join(" | "),
        }
    }
}

impl Filter {
    /// Check a selected value against the filter.
    ///
    /// Arrays match a non-array filter when any element matches.
    pub fn matches(&self, value: &Value) -> Result<bool, ExchangeError> {
        if let Value::Array(items) = value {
            if self.filter_type.as_deref() != Some("array") {
                for item in items {
                    if self.matches(item)? {
                        return Ok(true);
                    }
                }
                return Ok(false);
            }
        }

        if let Some(filter_type) = &self.filter_type {
            if !matches_type(filter_type, value)? {
                return Ok(false);
            }
        }
        if let Some(expected) = &self.const_value {
            if expected != value {
                return Ok(false);
            }
        }
        if let Some(allowed) = &self.enum_values {
            if !allowed.contains(value) {
                return Ok(false);
            }
        }

        if self.pattern.is_some()
            || self.format.is_some()
            || self.min_length.is_some()
            || self.max_length.is_some()
        {
            let Value::String(s) = value else {
                return Ok(false);
            };
            if let Some(pattern) = &self.pattern {
                let re = Regex::new(pattern).map_err(|e| {
                    ExchangeError::InvalidFilter(format!("pattern {}: {}", pattern, e))
                })?;
                if !re.is_match(s) {
                    return Ok(false);
                }
            }
            let len = s.chars().count();
            if self.min_length.is_some_and(|min| len < min) || self.max_length.is_some_and(|max| len > max) {
                return Ok(false);
            }
            if let Some(format) = &self.format {
                if !matches_format(format, s)? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

fn matches_type(filter_type: &str, value: &Value) -> Result<bool, ExchangeError> {
    Ok(match filter_type {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        other => {
            return Err(ExchangeError::InvalidFilter(format!(
                "unsupported type {}",
                other
            )))
        }
    })
}

fn matches_format(format: &str, value: &str) -> Result<bool, ExchangeError> {
    match format {
        "date" => Ok(NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()),
        "date-time" => Ok(DateTime::parse_from_rfc3339(value).is_ok()),
        other => Err(ExchangeError::InvalidFilter(format!(
            "unsupported format {}",
            other
        ))),
    }
}
