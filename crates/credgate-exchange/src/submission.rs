use serde::{Deserialize, Serialize};

/// Maps presented claims to the input descriptors they satisfy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationSubmission {
    pub id: String,
    pub definition_id: String,
    #[serde(default)]
    pub descriptor_map: Vec<DescriptorMap>,
}

/// One descriptor map entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorMap {
    /// Input descriptor id this entry fulfils.
    pub id: String,
    /// Claim format, e.g. "jwt_vc".
    pub format: String,
    /// JSONPath into the presentation locating the claim.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_nested: Option<Box<DescriptorMap>>,
}

/// A verified claim and the data selected from it for one input descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedSubmissionData {
    pub input_descriptor_id: String,
    /// The claim exactly as submitted (a VC JWT string).
    pub claim: serde_json::Value,
    /// Decoded credential claims.
    pub credential: serde_json::Value,
    /// Values selected by the descriptor's field constraints: a single value,
    /// an array when several fields matched, or null.
    pub filtered_data: serde_json::Value,
}
