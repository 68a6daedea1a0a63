use super::args::{ToolArgs, ToolArguments};
use super::config::{normalize_bucket_uri, ResolverDefaults};
use super::operation::Operation;
use super::resources::{parse_primary_resource, ResourceRef};
use crate::error::ValidationError;
use crate::models::{CapabilityRegistry, MediaFamily, ModelCapability, ModelSelector};

/// Typed, defaulted request fields. Counts and durations are still raw here;
/// bounds are checked against the model by the constraint validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameters {
    pub operation: Operation,
    pub family: MediaFamily,
    pub model: String,
    pub prompt: Option<String>,
    pub storage_uri: Option<String>,
    pub output_directory: Option<String>,
    pub aspect_ratio: Option<String>,
    pub output_count: Option<i64>,
    pub duration_secs: Option<i64>,
    pub output_size: Option<String>,
    pub generate_audio: Option<bool>,
    pub image: Option<ResourceRef>,
    pub last_frame: Option<ResourceRef>,
    pub reference_images: Option<String>,
}

/// Extracts [`RequestParameters`] from a tool call's argument mapping.
#[derive(Debug, Clone, Copy)]
pub struct ParameterResolver<'a> {
    registry: &'a CapabilityRegistry,
    defaults: &'a ResolverDefaults,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(registry: &'a CapabilityRegistry, defaults: &'a ResolverDefaults) -> Self {
        Self { registry, defaults }
    }

    pub fn resolve(
        &self,
        operation: Operation,
        raw: &ToolArguments,
    ) -> Result<RequestParameters, ValidationError> {
        let args = ToolArgs::new(raw);
        let family = operation.family();
        let family_defaults = self.defaults.for_family(family);

        let ignored = args.unrecognized(&operation.parameters());
        if !ignored.is_empty() {
            tracing::debug!(operation = %operation, ?ignored, "ignoring unrecognized parameters");
        }

        let (image, last_frame) = match operation {
            Operation::ImageToVideo => (
                Some(parse_primary_resource(&args, "image_uri", "mime_type")?),
                None,
            ),
            Operation::Interpolate => (
                Some(parse_primary_resource(
                    &args,
                    "first_frame_uri",
                    "first_frame_mime_type",
                )?),
                Some(parse_primary_resource(
                    &args,
                    "last_frame_uri",
                    "last_frame_mime_type",
                )?),
            ),
            _ => (None, None),
        };

        let prompt = if operation.requires_prompt() {
            Some(args.required_str("prompt")?)
        } else {
            args.optional_str("prompt")?
        };

        let storage_uri = match args.optional_str("bucket")? {
            Some(bucket) => Some(normalize_bucket_uri(&bucket)),
            None => self.defaults.default_storage(family),
        };
        if storage_uri.is_none() && operation.requires_storage() {
            return Err(ValidationError::MissingParameter {
                field: "bucket".to_string(),
            });
        }
        let output_directory = args.optional_str("output_directory")?;

        let selection = ModelSelector::new(self.registry).select(
            family,
            args.optional_str("model")?.as_deref(),
            &family_defaults.model,
        )?;
        let capability = selection.model;
        let model = capability.canonical_id.clone();

        let (aspect_ratio, output_count) = match operation.count_field() {
            Some(count_field) => (
                args.optional_str("aspect_ratio")?.or_else(|| {
                    default_aspect_ratio(family_defaults.aspect_ratio.as_deref(), capability)
                }),
                Some(
                    args.optional_integer(count_field)?
                        .unwrap_or(i64::from(family_defaults.output_count)),
                ),
            ),
            None => (None, None),
        };

        let duration_secs = if family == MediaFamily::Video {
            match args.optional_integer("duration")? {
                Some(duration) => Some(duration),
                None => family_defaults
                    .duration
                    .filter(|duration| capability.durations().contains(duration))
                    .map(i64::from),
            }
        } else {
            None
        };
        let output_size = if family == MediaFamily::Image {
            args.optional_str("image_size")?
                .map(|value| value.to_ascii_uppercase())
        } else {
            None
        };
        let generate_audio = if family == MediaFamily::Video {
            args.optional_bool("generate_audio")?
        } else {
            None
        };
        let reference_images = if operation.accepts_reference_images() {
            args.optional_json_text("reference_images")?
        } else {
            None
        };

        Ok(RequestParameters {
            operation,
            family,
            model,
            prompt,
            storage_uri,
            output_directory,
            aspect_ratio,
            output_count,
            duration_secs,
            output_size,
            generate_audio,
            image,
            last_frame,
            reference_images,
        })
    }
}

/// Configured ratio when the model supports it, else the model's first ratio.
fn default_aspect_ratio(configured: Option<&str>, model: &ModelCapability) -> Option<String> {
    let supported = model.aspect_ratios();
    configured
        .filter(|ratio| supported.iter().any(|candidate| candidate == ratio))
        .or_else(|| supported.first().map(String::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn args(value: Value) -> ToolArguments {
        value.as_object().cloned().unwrap_or_default()
    }

    fn defaults_with_bucket() -> ResolverDefaults {
        ResolverDefaults::default().with_bucket(Some("media-bucket".to_string()))
    }

    #[test]
    fn text_to_video_applies_defaults() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let defaults = defaults_with_bucket();
        let params = ParameterResolver::new(&registry, &defaults)
            .resolve(Operation::TextToVideo, &args(json!({"prompt": " a fox "})))?;
        assert_eq!(params.model, "veo-2.0-generate-001");
        assert_eq!(params.prompt.as_deref(), Some("a fox"));
        assert_eq!(params.storage_uri.as_deref(), Some("gs://media-bucket/veo_outputs/"));
        assert_eq!(params.aspect_ratio.as_deref(), Some("16:9"));
        assert_eq!(params.output_count, Some(1));
        assert_eq!(params.duration_secs, None);
        assert_eq!(params.generate_audio, None);
        Ok(())
    }

    #[test]
    fn explicit_values_win_over_defaults() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let defaults = defaults_with_bucket();
        let params = ParameterResolver::new(&registry, &defaults).resolve(
            Operation::TextToVideo,
            &args(json!({
                "prompt": "a fox",
                "model": "veo 3 fast",
                "bucket": "other-bucket/run",
                "aspect_ratio": " 9:16 ",
                "num_videos": 2.0,
                "duration": "6",
                "generate_audio": true,
                "output_directory": " /tmp/out "
            })),
        )?;
        assert_eq!(params.model, "veo-3.0-fast-generate-001");
        assert_eq!(params.storage_uri.as_deref(), Some("gs://other-bucket/run"));
        assert_eq!(params.aspect_ratio.as_deref(), Some("9:16"));
        assert_eq!(params.output_count, Some(2));
        assert_eq!(params.duration_secs, Some(6));
        assert_eq!(params.generate_audio, Some(true));
        assert_eq!(params.output_directory.as_deref(), Some("/tmp/out"));
        Ok(())
    }

    #[test]
    fn aspect_ratio_is_kept_as_given() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let defaults = defaults_with_bucket();
        let resolver = ParameterResolver::new(&registry, &defaults);
        for raw in ["16/9", " 16 : 9 ", "16 /9"] {
            let params = resolver.resolve(
                Operation::TextToVideo,
                &args(json!({"prompt": "a fox", "model": "Veo 3 Fast", "aspect_ratio": raw})),
            )?;
            assert_eq!(params.aspect_ratio.as_deref(), Some(raw.trim()));
        }
        let blank = resolver.resolve(
            Operation::TextToVideo,
            &args(json!({"prompt": "a fox", "aspect_ratio": "  "})),
        )?;
        assert_eq!(blank.aspect_ratio.as_deref(), Some("16:9"));
        Ok(())
    }

    #[test]
    fn configured_defaults_yield_to_model_limits() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let mut defaults = defaults_with_bucket();
        defaults.video.duration = Some(5);
        defaults.video.aspect_ratio = Some("9:16".to_string());
        let resolver = ParameterResolver::new(&registry, &defaults);

        let veo2 = resolver.resolve(Operation::TextToVideo, &args(json!({"prompt": "a fox"})))?;
        assert_eq!(veo2.duration_secs, Some(5));
        assert_eq!(veo2.aspect_ratio.as_deref(), Some("9:16"));

        let fast = resolver.resolve(
            Operation::TextToVideo,
            &args(json!({"prompt": "a fox", "model": "Veo 3 Fast"})),
        )?;
        assert_eq!(fast.duration_secs, None);
        assert_eq!(fast.aspect_ratio.as_deref(), Some("16:9"));

        let explicit = resolver.resolve(
            Operation::TextToVideo,
            &args(json!({"prompt": "a fox", "model": "Veo 3 Fast", "duration": 5})),
        )?;
        assert_eq!(explicit.duration_secs, Some(5));
        Ok(())
    }

    #[test]
    fn missing_prompt_is_rejected_for_text_operations() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let defaults = defaults_with_bucket();
        let resolver = ParameterResolver::new(&registry, &defaults);
        for operation in [
            Operation::TextToVideo,
            Operation::TextToImage,
            Operation::MultimodalGenerate,
        ] {
            assert_eq!(
                resolver.resolve(operation, &args(json!({"prompt": "  "}))),
                Err(ValidationError::missing("prompt"))
            );
        }
        Ok(())
    }

    #[test]
    fn video_without_any_bucket_is_rejected() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let defaults = ResolverDefaults::default();
        let err = ParameterResolver::new(&registry, &defaults)
            .resolve(Operation::TextToVideo, &args(json!({"prompt": "a fox"})));
        assert_eq!(err, Err(ValidationError::missing("bucket")));
        Ok(())
    }

    #[test]
    fn image_storage_is_optional() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let defaults = ResolverDefaults::default();
        let params = ParameterResolver::new(&registry, &defaults).resolve(
            Operation::TextToImage,
            &args(json!({"prompt": "a fox", "image_size": "2k", "duration": 8})),
        )?;
        assert_eq!(params.storage_uri, None);
        assert_eq!(params.model, "imagen-3.0-generate-002");
        assert_eq!(params.aspect_ratio.as_deref(), Some("1:1"));
        assert_eq!(params.output_size.as_deref(), Some("2K"));
        assert_eq!(params.duration_secs, None);
        Ok(())
    }

    #[test]
    fn unknown_model_is_rejected() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let defaults = defaults_with_bucket();
        let err = ParameterResolver::new(&registry, &defaults).resolve(
            Operation::TextToImage,
            &args(json!({"prompt": "a fox", "model": "Veo 2"})),
        );
        assert_eq!(
            err,
            Err(ValidationError::UnsupportedModel {
                family: MediaFamily::Image,
                input: "Veo 2".to_string(),
            })
        );
        Ok(())
    }

    #[test]
    fn image_to_video_reads_primary_image_and_optional_prompt() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let defaults = defaults_with_bucket();
        let params = ParameterResolver::new(&registry, &defaults).resolve(
            Operation::ImageToVideo,
            &args(json!({"image_uri": "gs://b/cat.png", "prompt": ""})),
        )?;
        assert_eq!(params.prompt, None);
        assert_eq!(
            params.image,
            Some(ResourceRef {
                uri: "gs://b/cat.png".to_string(),
                mime_type: "image/png".to_string(),
            })
        );
        assert_eq!(params.reference_images, None);
        Ok(())
    }

    #[test]
    fn interpolation_reads_both_frames_and_reference_text() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let defaults = defaults_with_bucket();
        let params = ParameterResolver::new(&registry, &defaults).resolve(
            Operation::Interpolate,
            &args(json!({
                "first_frame_uri": "gs://b/a.jpg",
                "last_frame_uri": "gs://b/z",
                "last_frame_mime_type": "image/png",
                "reference_images": "[]"
            })),
        )?;
        assert_eq!(params.image.map(|frame| frame.mime_type), Some("image/jpeg".to_string()));
        assert_eq!(params.last_frame.map(|frame| frame.mime_type), Some("image/png".to_string()));
        assert_eq!(params.reference_images.as_deref(), Some("[]"));
        Ok(())
    }

    #[test]
    fn multimodal_has_no_ratio_or_count() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let defaults = ResolverDefaults::default();
        let params = ParameterResolver::new(&registry, &defaults).resolve(
            Operation::MultimodalGenerate,
            &args(json!({"prompt": "a fox", "model": "Nano Banana Pro", "aspect_ratio": "1:1"})),
        )?;
        assert_eq!(params.model, "gemini-3-pro-image-preview");
        assert_eq!(params.aspect_ratio, None);
        assert_eq!(params.output_count, None);
        Ok(())
    }
}
