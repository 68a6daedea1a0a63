use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;

use super::aliases::AliasIndex;
use super::capability::{MediaFamily, ModelCapability};
use super::catalog::ModelCatalog;
use super::describe::describe_family;
use crate::error::RegistryError;

#[derive(Debug, Clone)]
struct FamilyTable {
    models: IndexMap<String, ModelCapability>,
    aliases: AliasIndex,
}

/// Immutable capability table for every media family.
///
/// Built once at startup and shared by reference afterwards; there is no
/// mutation API, so concurrent readers need no locking.
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    families: BTreeMap<MediaFamily, FamilyTable>,
}

impl CapabilityRegistry {
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_catalog(ModelCatalog::builtin()?)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        Self::from_catalog(ModelCatalog::load(path)?)
    }

    pub fn from_catalog(catalog: ModelCatalog) -> Result<Self, RegistryError> {
        Self::from_models(catalog.into_capabilities()?)
    }

    pub fn from_models(
        models: impl IntoIterator<Item = ModelCapability>,
    ) -> Result<Self, RegistryError> {
        let mut grouped: BTreeMap<MediaFamily, IndexMap<String, ModelCapability>> = MediaFamily::ALL
            .iter()
            .map(|family| (*family, IndexMap::new()))
            .collect();

        for model in models {
            let family = model.family();
            let table = grouped.entry(family).or_default();
            if table.contains_key(&model.canonical_id) {
                return Err(RegistryError::DuplicateModel {
                    family,
                    canonical_id: model.canonical_id,
                });
            }
            table.insert(model.canonical_id.clone(), model);
        }

        let mut families = BTreeMap::new();
        for (family, models) in grouped {
            let aliases = AliasIndex::build(family, models.values())?;
            tracing::debug!(
                family = %family,
                models = models.len(),
                names = aliases.len(),
                "capability table loaded"
            );
            families.insert(family, FamilyTable { models, aliases });
        }
        Ok(Self { families })
    }

    pub fn lookup(&self, family: MediaFamily, canonical_id: &str) -> Option<&ModelCapability> {
        self.families.get(&family)?.models.get(canonical_id)
    }

    /// Resolves a canonical id or alias to the canonical id.
    pub fn canonical_id(&self, family: MediaFamily, raw: &str) -> Option<&str> {
        self.families.get(&family)?.aliases.resolve(raw)
    }

    pub fn resolve(&self, family: MediaFamily, raw: &str) -> Option<&ModelCapability> {
        let canonical_id = self.canonical_id(family, raw)?;
        self.lookup(family, canonical_id)
    }

    pub fn aliases(&self, family: MediaFamily) -> Option<&AliasIndex> {
        self.families.get(&family).map(|table| &table.aliases)
    }

    /// Models of one family in catalog declaration order.
    pub fn list(&self, family: MediaFamily) -> impl Iterator<Item = &ModelCapability> {
        self.families
            .get(&family)
            .into_iter()
            .flat_map(|table| table.models.values())
    }

    pub fn sorted_ids(&self, family: MediaFamily) -> Vec<&str> {
        let mut ids = self
            .list(family)
            .map(|model| model.canonical_id.as_str())
            .collect::<Vec<&str>>();
        ids.sort_unstable();
        ids
    }

    pub fn describe(&self, family: MediaFamily) -> String {
        describe_family(self, family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::capability::{CapabilityLimits, FeatureFlags};

    fn image_model(id: &str, aliases: &[&str]) -> ModelCapability {
        ModelCapability {
            canonical_id: id.to_string(),
            aliases: aliases.iter().map(|alias| (*alias).to_string()).collect(),
            features: FeatureFlags::default(),
            limits: CapabilityLimits::Image {
                max_outputs: 2,
                aspect_ratios: vec!["1:1".to_string()],
                output_sizes: Vec::new(),
            },
        }
    }

    #[test]
    fn builtin_registry_resolves_every_alias_of_every_model() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        for family in MediaFamily::ALL {
            for model in registry.list(family) {
                assert_eq!(
                    registry.canonical_id(family, &model.canonical_id),
                    Some(model.canonical_id.as_str())
                );
                for alias in &model.aliases {
                    assert_eq!(
                        registry.canonical_id(family, alias),
                        Some(model.canonical_id.as_str())
                    );
                }
            }
        }
        Ok(())
    }

    #[test]
    fn veo_aliases_resolve_case_insensitively() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        let family = MediaFamily::Video;
        assert_eq!(
            registry.canonical_id(family, "  Veo 2  "),
            registry.canonical_id(family, "veo 2")
        );
        assert_eq!(
            registry.canonical_id(family, "VEO-2.0-GENERATE-001"),
            Some("veo-2.0-generate-001")
        );
        assert_eq!(
            registry.canonical_id(family, "Veo 3 Fast"),
            Some("veo-3.0-fast-generate-001")
        );
        Ok(())
    }

    #[test]
    fn families_are_isolated() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::builtin()?;
        assert!(registry.resolve(MediaFamily::Image, "Veo 2").is_none());
        assert!(registry.resolve(MediaFamily::Multimodal, "nano banana").is_some());
        Ok(())
    }

    #[test]
    fn duplicate_canonical_ids_fail_fast() {
        let err = CapabilityRegistry::from_models(vec![
            image_model("imagen-x", &[]),
            image_model("imagen-x", &["Other"]),
        ]);
        assert!(matches!(err, Err(RegistryError::DuplicateModel { .. })));
    }

    #[test]
    fn list_keeps_declaration_order_and_sorted_ids_sort() -> anyhow::Result<()> {
        let registry = CapabilityRegistry::from_models(vec![
            image_model("zeta", &[]),
            image_model("alpha", &[]),
            image_model("mid", &[]),
        ])?;
        let declared = registry
            .list(MediaFamily::Image)
            .map(|model| model.canonical_id.as_str())
            .collect::<Vec<&str>>();
        assert_eq!(declared, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.sorted_ids(MediaFamily::Image), vec!["alpha", "mid", "zeta"]);
        assert_eq!(registry.list(MediaFamily::Video).count(), 0);
        assert!(registry.aliases(MediaFamily::Video).is_some_and(AliasIndex::is_empty));
        Ok(())
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CapabilityRegistry>();
    }
}
