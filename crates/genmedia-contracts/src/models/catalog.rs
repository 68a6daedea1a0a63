use std::path::Path;

use serde::{Deserialize, Serialize};

use super::capability::{
    CapabilityLimits, FeatureFlags, MediaFamily, ModelCapability, ReferenceRole,
};
use crate::error::RegistryError;

pub const DEFAULT_MODELS_JSON: &str = include_str!("../../resources/default_models.json");

/// Declarative model table, one list per family. This is the only place model
/// data lives; the registry is built from it and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelCatalog {
    #[serde(default)]
    pub image: Vec<ImageModelEntry>,
    #[serde(default)]
    pub video: Vec<VideoModelEntry>,
    #[serde(default)]
    pub multimodal: Vec<MultimodalModelEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageModelEntry {
    pub canonical_id: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub max_outputs: u32,
    pub aspect_ratios: Vec<String>,
    #[serde(default)]
    pub output_sizes: Vec<String>,
    #[serde(default)]
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VideoModelEntry {
    pub canonical_id: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub max_outputs: u32,
    pub aspect_ratios: Vec<String>,
    pub durations: Vec<u32>,
    /// Falls back to the longest supported duration.
    pub default_duration: Option<u32>,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default = "all_reference_roles")]
    pub reference_roles: Vec<ReferenceRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultimodalModelEntry {
    pub canonical_id: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: FeatureFlags,
}

fn all_reference_roles() -> Vec<ReferenceRole> {
    ReferenceRole::ALL.to_vec()
}

impl ModelCatalog {
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_json(DEFAULT_MODELS_JSON)
    }

    pub fn from_json(raw: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Converts every entry into a capability, rejecting entries whose limits
    /// cannot describe a usable model.
    pub fn into_capabilities(self) -> Result<Vec<ModelCapability>, RegistryError> {
        let mut out =
            Vec::with_capacity(self.image.len() + self.video.len() + self.multimodal.len());
        for entry in self.image {
            out.push(entry.into_capability()?);
        }
        for entry in self.video {
            out.push(entry.into_capability()?);
        }
        for entry in self.multimodal {
            out.push(entry.into_capability()?);
        }
        Ok(out)
    }
}

impl ImageModelEntry {
    fn into_capability(self) -> Result<ModelCapability, RegistryError> {
        let family = MediaFamily::Image;
        check_identity(family, &self.canonical_id, &self.aliases)?;
        check_outputs(family, &self.canonical_id, self.max_outputs, &self.aspect_ratios)?;
        Ok(ModelCapability {
            canonical_id: self.canonical_id.trim().to_string(),
            aliases: self.aliases,
            features: self.features,
            limits: CapabilityLimits::Image {
                max_outputs: self.max_outputs,
                aspect_ratios: self.aspect_ratios,
                output_sizes: self
                    .output_sizes
                    .iter()
                    .map(|size| size.trim().to_ascii_uppercase())
                    .collect(),
            },
        })
    }
}

impl VideoModelEntry {
    fn into_capability(self) -> Result<ModelCapability, RegistryError> {
        let family = MediaFamily::Video;
        check_identity(family, &self.canonical_id, &self.aliases)?;
        check_outputs(family, &self.canonical_id, self.max_outputs, &self.aspect_ratios)?;
        let invalid = |reason: &str| RegistryError::InvalidLimits {
            family,
            canonical_id: self.canonical_id.clone(),
            reason: reason.to_string(),
        };
        if self.durations.is_empty() {
            return Err(invalid("durations must not be empty"));
        }
        if self.durations.contains(&0) {
            return Err(invalid("durations must be positive"));
        }
        let default_duration = match self.default_duration {
            Some(value) if self.durations.contains(&value) => value,
            Some(_) => return Err(invalid("default_duration is not a supported duration")),
            None => self.durations.iter().copied().max().unwrap_or_default(),
        };
        Ok(ModelCapability {
            canonical_id: self.canonical_id.trim().to_string(),
            aliases: self.aliases,
            features: self.features,
            limits: CapabilityLimits::Video {
                max_outputs: self.max_outputs,
                aspect_ratios: self.aspect_ratios,
                durations: self.durations,
                default_duration,
                reference_roles: self.reference_roles,
            },
        })
    }
}

impl MultimodalModelEntry {
    fn into_capability(self) -> Result<ModelCapability, RegistryError> {
        check_identity(MediaFamily::Multimodal, &self.canonical_id, &self.aliases)?;
        Ok(ModelCapability {
            canonical_id: self.canonical_id.trim().to_string(),
            aliases: self.aliases,
            features: self.features,
            limits: CapabilityLimits::Multimodal {
                description: self.description.trim().to_string(),
            },
        })
    }
}

fn check_identity(
    family: MediaFamily,
    canonical_id: &str,
    aliases: &[String],
) -> Result<(), RegistryError> {
    let reason = if canonical_id.trim().is_empty() {
        "canonical_id must not be blank"
    } else if aliases.iter().any(|alias| alias.trim().is_empty()) {
        "aliases must not be blank"
    } else {
        return Ok(());
    };
    Err(RegistryError::InvalidLimits {
        family,
        canonical_id: canonical_id.to_string(),
        reason: reason.to_string(),
    })
}

fn check_outputs(
    family: MediaFamily,
    canonical_id: &str,
    max_outputs: u32,
    aspect_ratios: &[String],
) -> Result<(), RegistryError> {
    let reason = if max_outputs == 0 {
        "max_outputs must be at least 1"
    } else if aspect_ratios.is_empty() {
        "aspect_ratios must not be empty"
    } else {
        return Ok(());
    };
    Err(RegistryError::InvalidLimits {
        family,
        canonical_id: canonical_id.to_string(),
        reason: reason.to_string(),
    })
}
