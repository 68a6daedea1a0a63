use std::collections::HashMap;

use super::capability::{MediaFamily, ModelCapability};
use crate::error::RegistryError;

/// Case-insensitive lookup from any canonical id or alias to the canonical id.
///
/// Keys are trimmed and lower-cased once at build time; `resolve` applies the
/// same normalization to its input and does an exact match, nothing fuzzier.
#[derive(Debug, Clone)]
pub struct AliasIndex {
    family: MediaFamily,
    entries: HashMap<String, String>,
}

impl AliasIndex {
    /// Builds the index for one family. Two models claiming the same name is a
    /// catalog defect and fails the build instead of picking a winner.
    pub fn build<'a>(
        family: MediaFamily,
        models: impl IntoIterator<Item = &'a ModelCapability>,
    ) -> Result<Self, RegistryError> {
        let mut entries: HashMap<String, String> = HashMap::new();
        for model in models {
            let names = std::iter::once(model.canonical_id.as_str())
                .chain(model.aliases.iter().map(String::as_str));
            for name in names {
                let key = normalize(name);
                match entries.get(&key) {
                    Some(existing) if existing != &model.canonical_id => {
                        return Err(RegistryError::AliasCollision {
                            family,
                            alias: name.trim().to_string(),
                            first: existing.clone(),
                            second: model.canonical_id.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        entries.insert(key, model.canonical_id.clone());
                    }
                }
            }
        }
        Ok(Self { family, entries })
    }

    pub fn family(&self) -> MediaFamily {
        self.family
    }

    pub fn resolve(&self, raw: &str) -> Option<&str> {
        self.entries.get(&normalize(raw)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}
