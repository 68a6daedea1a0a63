use serde::Serialize;

use super::operation::Operation;
use super::resources::{AuxiliaryResource, ResourceRef};
use crate::models::MediaFamily;

/// A request that passed constraint validation for its model, ready for the
/// backend client. Only the constraint validator can build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct ValidatedDescriptor {
    pub operation: Operation,
    pub family: MediaFamily,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_audio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ResourceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_frame: Option<ResourceRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference_images: Vec<AuxiliaryResource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
