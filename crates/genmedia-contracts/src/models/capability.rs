use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFamily {
    Image,
    Video,
    Multimodal,
}

impl MediaFamily {
    pub const ALL: [MediaFamily; 3] = [Self::Image, Self::Video, Self::Multimodal];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Multimodal => "multimodal",
        }
    }
}

impl fmt::Display for MediaFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaFamily {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image" | "imagen" => Ok(Self::Image),
            "video" | "veo" => Ok(Self::Video),
            "multimodal" | "gemini" => Ok(Self::Multimodal),
            other => Err(format!(
                "unknown media family '{other}'; expected image, video or multimodal"
            )),
        }
    }
}

/// Role of a reference image passed alongside a video request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReferenceRole {
    Asset,
    Style,
}

impl ReferenceRole {
    pub const ALL: [ReferenceRole; 2] = [Self::Asset, Self::Style];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "ASSET",
            Self::Style => "STYLE",
        }
    }

    /// Case-insensitive parse of a caller-supplied role tag.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ASSET" => Some(Self::Asset),
            "STYLE" => Some(Self::Style),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub generate_audio: bool,
    pub last_frame: bool,
    pub reference_images: bool,
}

/// Family-specific limits. Which axes exist depends on the family, so the
/// validator matches on this rather than probing optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityLimits {
    Image {
        max_outputs: u32,
        aspect_ratios: Vec<String>,
        output_sizes: Vec<String>,
    },
    Video {
        max_outputs: u32,
        aspect_ratios: Vec<String>,
        durations: Vec<u32>,
        default_duration: u32,
        reference_roles: Vec<ReferenceRole>,
    },
    Multimodal {
        description: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCapability {
    pub canonical_id: String,
    pub aliases: Vec<String>,
    pub features: FeatureFlags,
    pub limits: CapabilityLimits,
}

impl ModelCapability {
    pub fn family(&self) -> MediaFamily {
        match self.limits {
            CapabilityLimits::Image { .. } => MediaFamily::Image,
            CapabilityLimits::Video { .. } => MediaFamily::Video,
            CapabilityLimits::Multimodal { .. } => MediaFamily::Multimodal,
        }
    }

    pub fn max_outputs(&self) -> Option<u32> {
        match &self.limits {
            CapabilityLimits::Image { max_outputs, .. }
            | CapabilityLimits::Video { max_outputs, .. } => Some(*max_outputs),
            CapabilityLimits::Multimodal { .. } => None,
        }
    }

    pub fn aspect_ratios(&self) -> &[String] {
        match &self.limits {
            CapabilityLimits::Image { aspect_ratios, .. }
            | CapabilityLimits::Video { aspect_ratios, .. } => aspect_ratios.as_slice(),
            CapabilityLimits::Multimodal { .. } => &[],
        }
    }

    pub fn durations(&self) -> &[u32] {
        match &self.limits {
            CapabilityLimits::Video { durations, .. } => durations.as_slice(),
            _ => &[],
        }
    }

    pub fn default_duration(&self) -> Option<u32> {
        match &self.limits {
            CapabilityLimits::Video {
                default_duration, ..
            } => Some(*default_duration),
            _ => None,
        }
    }

    pub fn output_sizes(&self) -> &[String] {
        match &self.limits {
            CapabilityLimits::Image { output_sizes, .. } => output_sizes.as_slice(),
            _ => &[],
        }
    }

    pub fn accepts_reference_role(&self, role: ReferenceRole) -> bool {
        match &self.limits {
            CapabilityLimits::Video {
                reference_roles, ..
            } => self.features.reference_images && reference_roles.contains(&role),
            _ => false,
        }
    }
}
