use super::descriptor::ValidatedDescriptor;
use super::params::RequestParameters;
use super::resources::AuxiliaryResourceParser;
use crate::error::ValidationError;
use crate::models::ModelCapability;

/// Checks resolved parameters against one model's capability descriptor.
///
/// Checks run in a fixed order and stop at the first failure: model identity,
/// aspect ratio, duration or output size, output count, feature gates. Only
/// then are reference images parsed.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintValidator<'a> {
    model: &'a ModelCapability,
}

impl<'a> ConstraintValidator<'a> {
    pub fn new(model: &'a ModelCapability) -> Self {
        Self { model }
    }

    pub fn validate(
        &self,
        params: RequestParameters,
    ) -> Result<ValidatedDescriptor, ValidationError> {
        self.check_model(&params)?;
        self.check_aspect_ratio(&params)?;
        let duration_secs = self.check_duration(&params)?;
        self.check_output_size(&params)?;
        let output_count = self.check_output_count(&params)?;
        self.check_features(&params)?;

        let mut warnings = Vec::new();
        let reference_images = match params.reference_images.as_deref() {
            Some(raw) => {
                let parsed =
                    AuxiliaryResourceParser::new(self.model).parse("reference_images", raw)?;
                for message in parsed.skipped {
                    push_unique_warning(&mut warnings, message);
                }
                parsed.resources
            }
            None => Vec::new(),
        };

        let generate_audio = if self.model.features.generate_audio {
            params.generate_audio
        } else {
            None
        };

        Ok(ValidatedDescriptor {
            operation: params.operation,
            family: params.family,
            model: params.model,
            prompt: params.prompt,
            storage_uri: params.storage_uri,
            output_directory: params.output_directory,
            aspect_ratio: params.aspect_ratio,
            output_count,
            duration_secs,
            output_size: params.output_size,
            generate_audio,
            image: params.image,
            last_frame: params.last_frame,
            reference_images,
            warnings,
        })
    }

    fn check_model(&self, params: &RequestParameters) -> Result<(), ValidationError> {
        if params.family != self.model.family() || params.model != self.model.canonical_id {
            return Err(ValidationError::UnsupportedModel {
                family: params.family,
                input: params.model.clone(),
            });
        }
        Ok(())
    }

    fn check_aspect_ratio(&self, params: &RequestParameters) -> Result<(), ValidationError> {
        let Some(ratio) = params.aspect_ratio.as_deref() else {
            return Ok(());
        };
        let supported = self.model.aspect_ratios();
        if supported.iter().any(|candidate| candidate == ratio) {
            return Ok(());
        }
        Err(self.unsupported_value("aspect_ratio", ratio, supported.join(", ")))
    }

    fn check_duration(&self, params: &RequestParameters) -> Result<Option<u32>, ValidationError> {
        let Some(default_duration) = self.model.default_duration() else {
            return Ok(None);
        };
        let requested = params
            .duration_secs
            .unwrap_or(i64::from(default_duration));
        let durations = self.model.durations();
        match u32::try_from(requested) {
            Ok(value) if durations.contains(&value) => Ok(Some(value)),
            _ => Err(self.unsupported_value(
                "duration",
                &requested.to_string(),
                durations
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<String>>()
                    .join(", "),
            )),
        }
    }

    fn check_output_size(&self, params: &RequestParameters) -> Result<(), ValidationError> {
        let Some(size) = params.output_size.as_deref() else {
            return Ok(());
        };
        let supported = self.model.output_sizes();
        if supported.is_empty() {
            return Err(ValidationError::unsupported_feature(
                "Output size selection",
                &self.model.canonical_id,
            ));
        }
        if supported.iter().any(|candidate| candidate == size) {
            return Ok(());
        }
        Err(self.unsupported_value("image_size", size, supported.join(", ")))
    }

    fn check_output_count(
        &self,
        params: &RequestParameters,
    ) -> Result<Option<u32>, ValidationError> {
        let (Some(max), Some(field)) = (self.model.max_outputs(), params.operation.count_field())
        else {
            return Ok(None);
        };
        let requested = params.output_count.unwrap_or(1);
        match u32::try_from(requested) {
            Ok(value) if (1..=max).contains(&value) => Ok(Some(value)),
            _ => Err(ValidationError::OutputCountOutOfBounds {
                field: field.to_string(),
                value: requested,
                max,
                model: self.model.canonical_id.clone(),
            }),
        }
    }

    fn check_features(&self, params: &RequestParameters) -> Result<(), ValidationError> {
        let features = self.model.features;
        let model = self.model.canonical_id.as_str();
        if params.generate_audio == Some(true) && !features.generate_audio {
            return Err(ValidationError::unsupported_feature("Audio generation", model));
        }
        if params.last_frame.is_some() && !features.last_frame {
            return Err(ValidationError::unsupported_feature(
                "Interpolation with a last frame",
                model,
            ));
        }
        if params.reference_images.is_some() && !features.reference_images {
            return Err(ValidationError::unsupported_feature(
                "Providing reference images",
                model,
            ));
        }
        Ok(())
    }

    fn unsupported_value(&self, field: &str, value: &str, supported: String) -> ValidationError {
        ValidationError::UnsupportedValue {
            field: field.to_string(),
            value: value.to_string(),
            model: self.model.canonical_id.clone(),
            supported,
        }
    }
}

fn push_unique_warning(warnings: &mut Vec<String>, message: String) {
    if message.trim().is_empty() {
        return;
    }
    if warnings.iter().any(|existing| existing == &message) {
        return;
    }
    warnings.push(message);
}
