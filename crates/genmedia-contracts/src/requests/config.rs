use std::env;

use serde::{Deserialize, Serialize};

use crate::models::MediaFamily;

pub const BUCKET_ENV: &str = "GENMEDIA_BUCKET";
pub const VIDEO_MODEL_ENV: &str = "VEO_DEFAULT_MODEL";
pub const IMAGE_MODEL_ENV: &str = "IMAGEN_DEFAULT_MODEL";
pub const MULTIMODAL_MODEL_ENV: &str = "GEMINI_DEFAULT_MODEL";

pub const GCS_SCHEME: &str = "gs://";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyDefaults {
    pub model: String,
    pub aspect_ratio: Option<String>,
    pub output_count: u32,
    /// Overrides the model's own default duration when set.
    pub duration: Option<u32>,
    /// Appended to the configured bucket when a request names no bucket.
    pub storage_suffix: String,
}

/// Process-wide defaults applied by the parameter resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverDefaults {
    pub bucket: Option<String>,
    pub image: FamilyDefaults,
    pub video: FamilyDefaults,
    pub multimodal: FamilyDefaults,
}

impl Default for ResolverDefaults {
    fn default() -> Self {
        Self {
            bucket: None,
            image: FamilyDefaults {
                model: "imagen-3.0-generate-002".to_string(),
                aspect_ratio: Some("1:1".to_string()),
                output_count: 1,
                duration: None,
                storage_suffix: "imagen_outputs/".to_string(),
            },
            video: FamilyDefaults {
                model: "veo-2.0-generate-001".to_string(),
                aspect_ratio: Some("16:9".to_string()),
                output_count: 1,
                duration: None,
                storage_suffix: "veo_outputs/".to_string(),
            },
            multimodal: FamilyDefaults {
                model: "gemini-2.5-flash-image".to_string(),
                aspect_ratio: None,
                output_count: 1,
                duration: None,
                storage_suffix: "gemini_outputs/".to_string(),
            },
        }
    }
}

impl ResolverDefaults {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds defaults from an arbitrary key lookup; blank values are unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut defaults = Self::default();
        defaults.bucket = read(BUCKET_ENV);
        if let Some(model) = read(VIDEO_MODEL_ENV) {
            defaults.video.model = model;
        }
        if let Some(model) = read(IMAGE_MODEL_ENV) {
            defaults.image.model = model;
        }
        if let Some(model) = read(MULTIMODAL_MODEL_ENV) {
            defaults.multimodal.model = model;
        }
        defaults
    }

    pub fn with_bucket(mut self, bucket: Option<String>) -> Self {
        if let Some(bucket) = bucket
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            self.bucket = Some(bucket);
        }
        self
    }

    pub fn for_family(&self, family: MediaFamily) -> &FamilyDefaults {
        match family {
            MediaFamily::Image => &self.image,
            MediaFamily::Video => &self.video,
            MediaFamily::Multimodal => &self.multimodal,
        }
    }

    /// Default storage destination for a family: the configured bucket with
    /// the family's suffix path, e.g. `gs://bucket/veo_outputs/`.
    pub fn default_storage(&self, family: MediaFamily) -> Option<String> {
        let bucket = self.bucket.as_deref()?;
        let base = normalize_bucket_uri(bucket);
        let suffix = self.for_family(family).storage_suffix.trim_start_matches('/');
        Some(format!("{}/{}", base.trim_end_matches('/'), suffix))
    }
}

/// Adds the `gs://` scheme to a bare bucket name.
pub fn normalize_bucket_uri(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with(GCS_SCHEME) {
        trimmed.to_string()
    } else {
        format!("{GCS_SCHEME}{}", trimmed.trim_start_matches('/'))
    }
}
