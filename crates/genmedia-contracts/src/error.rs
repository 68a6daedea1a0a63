use thiserror::Error;

use crate::models::MediaFamily;

/// Why a single request was rejected. Every variant is local to the request;
/// none of them is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a non-empty string and is required")]
    MissingParameter { field: String },

    #[error("invalid {field}: {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("model '{input}' is not a valid or supported {family} model name")]
    UnsupportedModel { family: MediaFamily, input: String },

    #[error("{field} '{value}' is not supported by model '{model}' (supported: {supported})")]
    UnsupportedValue {
        field: String,
        value: String,
        model: String,
        supported: String,
    },

    #[error("{field} must be between 1 and {max} for model '{model}', got {value}")]
    OutputCountOutOfBounds {
        field: String,
        value: i64,
        max: u32,
        model: String,
    },

    #[error("{feature} is not supported on model '{model}'")]
    UnsupportedFeature { feature: String, model: String },

    #[error("failed to parse '{field}': {reason}")]
    MalformedInput { field: String, reason: String },

    #[error("unsupported MIME type '{value}' for {field}; use 'image/jpeg' or 'image/png'")]
    UnsupportedMimeType { field: String, value: String },

    #[error("MIME type for {field} '{uri}' could not be inferred; specify it as 'image/jpeg' or 'image/png'")]
    MimeTypeNotInferred { field: String, uri: String },

    #[error("invalid {field} '{uri}': must be a GCS URI starting with 'gs://'")]
    InvalidResourceUri { field: String, uri: String },
}

impl ValidationError {
    pub fn missing(field: &str) -> Self {
        Self::MissingParameter {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_feature(feature: &str, model: &str) -> Self {
        Self::UnsupportedFeature {
            feature: feature.to_string(),
            model: model.to_string(),
        }
    }

    /// The request field the rejection points at, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingParameter { field }
            | Self::InvalidParameter { field, .. }
            | Self::UnsupportedValue { field, .. }
            | Self::OutputCountOutOfBounds { field, .. }
            | Self::MalformedInput { field, .. }
            | Self::UnsupportedMimeType { field, .. }
            | Self::MimeTypeNotInferred { field, .. }
            | Self::InvalidResourceUri { field, .. } => Some(field.as_str()),
            Self::UnsupportedModel { .. } => Some("model"),
            Self::UnsupportedFeature { .. } => None,
        }
    }
}

/// Catalog defects detected while the registry is built. These abort startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate {family} model '{canonical_id}' in catalog")]
    DuplicateModel {
        family: MediaFamily,
        canonical_id: String,
    },

    #[error("{family} alias '{alias}' is claimed by both '{first}' and '{second}'")]
    AliasCollision {
        family: MediaFamily,
        alias: String,
        first: String,
        second: String,
    },

    #[error("{family} model '{canonical_id}' has invalid limits: {reason}")]
    InvalidLimits {
        family: MediaFamily,
        canonical_id: String,
        reason: String,
    },

    #[error("default {family} model '{input}' does not resolve to a registered model")]
    UnknownDefaultModel { family: MediaFamily, input: String },

    #[error("default {family} {field} '{value}' is not supported by default model '{model}'")]
    UnsupportedDefault {
        family: MediaFamily,
        field: String,
        value: String,
        model: String,
    },

    #[error("failed to read model catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("failed to read model catalog file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_field() {
        let err = ValidationError::OutputCountOutOfBounds {
            field: "num_videos".to_string(),
            value: 3,
            max: 2,
            model: "veo-3.0-fast-generate-001".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "num_videos must be between 1 and 2 for model 'veo-3.0-fast-generate-001', got 3"
        );
        assert_eq!(err.field(), Some("num_videos"));
    }

    #[test]
    fn unsupported_model_message_names_family() {
        let err = ValidationError::UnsupportedModel {
            family: MediaFamily::Video,
            input: "veo-9".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "model 'veo-9' is not a valid or supported video model name"
        );
        assert_eq!(err.field(), Some("model"));
    }
}
