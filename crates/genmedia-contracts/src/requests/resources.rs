use serde::{Deserialize, Serialize};

use super::args::ToolArgs;
use super::config::GCS_SCHEME;
use super::mime::{infer_mime_type, normalize_mime_type};
use crate::error::ValidationError;
use crate::models::{ModelCapability, ReferenceRole};

/// A primary input resource: the image for image-to-video or either frame of
/// an interpolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub uri: String,
    pub mime_type: String,
}

/// A secondary input, currently a reference image for video generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryResource {
    pub uri: String,
    pub mime_type: String,
    pub role: ReferenceRole,
}

/// Reads a required primary resource: `uri_field` must hold a `gs://` URI;
/// `mime_field` may override the MIME type, otherwise it is inferred from
/// the URI suffix. Any failure rejects the request.
pub fn parse_primary_resource(
    args: &ToolArgs<'_>,
    uri_field: &str,
    mime_field: &str,
) -> Result<ResourceRef, ValidationError> {
    let uri = args.required_str(uri_field)?;
    if !uri.starts_with(GCS_SCHEME) {
        return Err(ValidationError::InvalidResourceUri {
            field: uri_field.to_string(),
            uri,
        });
    }
    let mime_type = match args.optional_str(mime_field)? {
        Some(explicit) => normalize_mime_type(&explicit).ok_or_else(|| {
            ValidationError::UnsupportedMimeType {
                field: mime_field.to_string(),
                value: explicit.clone(),
            }
        })?,
        None => infer_mime_type(&uri).ok_or_else(|| ValidationError::MimeTypeNotInferred {
            field: uri_field.to_string(),
            uri: uri.clone(),
        })?,
    };
    tracing::debug!(field = uri_field, uri = %uri, mime_type, "primary resource resolved");
    Ok(ResourceRef {
        uri,
        mime_type: mime_type.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct AuxiliaryInput {
    #[serde(default)]
    uri: String,
    #[serde(default, rename = "type")]
    role: String,
}

/// Outcome of parsing an auxiliary list: the accepted entries and one
/// message per skipped entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxiliaryParse {
    pub resources: Vec<AuxiliaryResource>,
    pub skipped: Vec<String>,
}

/// Parses the reference-image list for one model.
///
/// A bad entry is skipped with a warning and never fails the request. Only
/// text that is not a JSON array of objects is fatal.
#[derive(Debug, Clone, Copy)]
pub struct AuxiliaryResourceParser<'a> {
    model: &'a ModelCapability,
}

impl<'a> AuxiliaryResourceParser<'a> {
    pub fn new(model: &'a ModelCapability) -> Self {
        Self { model }
    }

    pub fn parse(&self, field: &str, raw: &str) -> Result<AuxiliaryParse, ValidationError> {
        let inputs: Vec<AuxiliaryInput> =
            serde_json::from_str(raw).map_err(|err| ValidationError::MalformedInput {
                field: field.to_string(),
                reason: format!(
                    "{err}; provide a JSON array of objects, each with 'uri' and 'type'"
                ),
            })?;

        let mut parsed = AuxiliaryParse::default();
        for input in inputs {
            match self.accept(input) {
                Ok(resource) => parsed.resources.push(resource),
                Err(reason) => {
                    tracing::warn!(
                        field,
                        model = %self.model.canonical_id,
                        reason = %reason,
                        "skipping auxiliary resource"
                    );
                    parsed.skipped.push(reason);
                }
            }
        }
        Ok(parsed)
    }

    fn accept(&self, input: AuxiliaryInput) -> Result<AuxiliaryResource, String> {
        let uri = input.uri.trim().to_string();
        if !uri.starts_with(GCS_SCHEME) {
            return Err(format!("Skipping reference image with invalid URI '{uri}'."));
        }
        let Some(role) = ReferenceRole::parse(&input.role) else {
            return Err(format!(
                "Skipping reference image '{uri}' with invalid type '{}'; must be 'ASSET' or 'STYLE'.",
                input.role
            ));
        };
        if !self.model.accepts_reference_role(role) {
            return Err(format!(
                "Skipping reference image '{uri}': type '{}' is not supported on model '{}'.",
                role.as_str(),
                self.model.canonical_id
            ));
        }
        let Some(mime_type) = infer_mime_type(&uri) else {
            return Err(format!(
                "Skipping reference image '{uri}' with unknown MIME type."
            ));
        };
        Ok(AuxiliaryResource {
            uri,
            mime_type: mime_type.to_string(),
            role,
        })
    }
}
