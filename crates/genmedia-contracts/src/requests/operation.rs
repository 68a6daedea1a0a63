use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::MediaFamily;

/// A generation operation, named after the tool that exposes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "veo_t2v")]
    TextToVideo,
    #[serde(rename = "veo_i2v")]
    ImageToVideo,
    #[serde(rename = "veo_interpolate")]
    Interpolate,
    #[serde(rename = "imagen_t2i")]
    TextToImage,
    #[serde(rename = "gemini_generate")]
    MultimodalGenerate,
}

const VIDEO_COMMON: &[&str] = &[
    "prompt",
    "model",
    "aspect_ratio",
    "num_videos",
    "duration",
    "generate_audio",
    "bucket",
    "output_directory",
];

impl Operation {
    pub const ALL: [Operation; 5] = [
        Self::TextToVideo,
        Self::ImageToVideo,
        Self::Interpolate,
        Self::TextToImage,
        Self::MultimodalGenerate,
    ];

    pub fn tool_name(self) -> &'static str {
        match self {
            Self::TextToVideo => "veo_t2v",
            Self::ImageToVideo => "veo_i2v",
            Self::Interpolate => "veo_interpolate",
            Self::TextToImage => "imagen_t2i",
            Self::MultimodalGenerate => "gemini_generate",
        }
    }

    pub fn family(self) -> MediaFamily {
        match self {
            Self::TextToVideo | Self::ImageToVideo | Self::Interpolate => MediaFamily::Video,
            Self::TextToImage => MediaFamily::Image,
            Self::MultimodalGenerate => MediaFamily::Multimodal,
        }
    }

    /// Argument names this operation reads; anything else is ignored.
    pub fn parameters(self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = match self.family() {
            MediaFamily::Video => VIDEO_COMMON.to_vec(),
            MediaFamily::Image => vec![
                "prompt",
                "model",
                "aspect_ratio",
                "num_images",
                "image_size",
                "bucket",
                "output_directory",
            ],
            MediaFamily::Multimodal => vec!["prompt", "model", "bucket", "output_directory"],
        };
        match self {
            Self::TextToVideo => names.push("reference_images"),
            Self::ImageToVideo => names.extend(["image_uri", "mime_type"]),
            Self::Interpolate => names.extend([
                "first_frame_uri",
                "first_frame_mime_type",
                "last_frame_uri",
                "last_frame_mime_type",
                "reference_images",
            ]),
            Self::TextToImage | Self::MultimodalGenerate => {}
        }
        names
    }

    /// Whether a non-blank prompt is mandatory.
    pub fn requires_prompt(self) -> bool {
        matches!(
            self,
            Self::TextToVideo | Self::TextToImage | Self::MultimodalGenerate
        )
    }

    /// Whether the request is rejected when no storage destination resolves.
    pub fn requires_storage(self) -> bool {
        self.family() == MediaFamily::Video
    }

    /// Name of the output-count argument, if the operation has one.
    pub fn count_field(self) -> Option<&'static str> {
        match self.family() {
            MediaFamily::Video => Some("num_videos"),
            MediaFamily::Image => Some("num_images"),
            MediaFamily::Multimodal => None,
        }
    }

    pub fn accepts_reference_images(self) -> bool {
        matches!(self, Self::TextToVideo | Self::Interpolate)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        let alias = match normalized.as_str() {
            "t2v" => Some(Self::TextToVideo),
            "i2v" => Some(Self::ImageToVideo),
            "interpolate" => Some(Self::Interpolate),
            "t2i" => Some(Self::TextToImage),
            "gemini" => Some(Self::MultimodalGenerate),
            _ => None,
        };
        alias
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|operation| operation.tool_name() == normalized)
            })
            .ok_or_else(|| {
                let known = Self::ALL.map(Operation::tool_name).join(", ");
                format!("unknown operation '{}'; expected one of {known}", raw.trim())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tool_names_and_short_forms() {
        assert_eq!("veo_t2v".parse::<Operation>(), Ok(Operation::TextToVideo));
        assert_eq!(" I2V ".parse::<Operation>(), Ok(Operation::ImageToVideo));
        assert_eq!(
            "gemini_generate".parse::<Operation>(),
            Ok(Operation::MultimodalGenerate)
        );
        let err = "veo_edit".parse::<Operation>().err().unwrap_or_default();
        assert!(err.starts_with("unknown operation 'veo_edit'"));
    }

    #[test]
    fn vocabulary_matches_operation() {
        let interpolate = Operation::Interpolate.parameters();
        assert!(interpolate.contains(&"last_frame_uri"));
        assert!(interpolate.contains(&"reference_images"));
        assert!(!Operation::ImageToVideo.parameters().contains(&"reference_images"));
        assert!(Operation::TextToImage.parameters().contains(&"image_size"));
        assert!(!Operation::MultimodalGenerate.parameters().contains(&"aspect_ratio"));
    }

    #[test]
    fn serializes_as_tool_name() -> anyhow::Result<()> {
        assert_eq!(
            serde_json::to_string(&Operation::Interpolate)?,
            "\"veo_interpolate\""
        );
        Ok(())
    }
}
