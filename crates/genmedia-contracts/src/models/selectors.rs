use super::capability::{MediaFamily, ModelCapability};
use super::registry::CapabilityRegistry;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection<'a> {
    pub model: &'a ModelCapability,
    pub requested: Option<String>,
    pub defaulted: bool,
}

/// Picks the model for a request: the caller's reference when present,
/// otherwise the configured default. Unknown references are rejected; there
/// is no silent fallback to another model.
#[derive(Debug, Clone, Copy)]
pub struct ModelSelector<'a> {
    registry: &'a CapabilityRegistry,
}

impl<'a> ModelSelector<'a> {
    pub fn new(registry: &'a CapabilityRegistry) -> Self {
        Self { registry }
    }

    pub fn select(
        &self,
        family: MediaFamily,
        requested: Option<&str>,
        default_model: &str,
    ) -> Result<ModelSelection<'a>, ValidationError> {
        let (input, defaulted) = match requested.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => (value, false),
            None => (default_model, true),
        };
        let Some(model) = self.registry.resolve(family, input) else {
            return Err(ValidationError::UnsupportedModel {
                family,
                input: input.to_string(),
            });
        };
        tracing::debug!(
            family = %family,
            input,
            canonical_id = %model.canonical_id,
            defaulted,
            "model resolved"
        );
        Ok(ModelSelection {
            model,
            requested: requested.map(str::to_string),
            defaulted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_resolves_requested_alias() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let selection = ModelSelector::new(&registry).select(
            MediaFamily::Video,
            Some("Veo 3 Fast"),
            "veo-2.0-generate-001",
        )?;
        assert_eq!(selection.model.canonical_id, "veo-3.0-fast-generate-001");
        assert_eq!(selection.requested.as_deref(), Some("Veo 3 Fast"));
        assert!(!selection.defaulted);
        Ok(())
    }

    #[test]
    fn selector_uses_default_when_nothing_requested() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let selection =
            ModelSelector::new(&registry).select(MediaFamily::Image, Some("   "), "Imagen 3")?;
        assert_eq!(selection.model.canonical_id, "imagen-3.0-generate-002");
        assert!(selection.defaulted);
        Ok(())
    }

    #[test]
    fn selector_rejects_unknown_model_without_fallback() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let err = ModelSelector::new(&registry)
            .select(MediaFamily::Video, Some("veo-9"), "veo-2.0-generate-001")
            .err();
        assert_eq!(
            err,
            Some(ValidationError::UnsupportedModel {
                family: MediaFamily::Video,
                input: "veo-9".to_string(),
            })
        );
        Ok(())
    }
}
