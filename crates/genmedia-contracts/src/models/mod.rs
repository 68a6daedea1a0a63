mod aliases;
mod capability;
mod catalog;
mod describe;
mod registry;
mod selectors;

pub use aliases::AliasIndex;
pub use capability::{CapabilityLimits, FeatureFlags, MediaFamily, ModelCapability, ReferenceRole};
pub use catalog::{
    ImageModelEntry, ModelCatalog, MultimodalModelEntry, VideoModelEntry, DEFAULT_MODELS_JSON,
};
pub use describe::describe_family;
pub use registry::CapabilityRegistry;
pub use selectors::{ModelSelection, ModelSelector};
