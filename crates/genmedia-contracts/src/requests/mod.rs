mod args;
mod config;
mod descriptor;
mod mime;
mod operation;
mod params;
mod resources;
mod validate;

pub use args::{ToolArgs, ToolArguments};
pub use config::{
    normalize_bucket_uri, FamilyDefaults, ResolverDefaults, BUCKET_ENV, GCS_SCHEME,
    IMAGE_MODEL_ENV, MULTIMODAL_MODEL_ENV, VIDEO_MODEL_ENV,
};
pub use descriptor::ValidatedDescriptor;
pub use mime::{infer_mime_type, normalize_mime_type, SUPPORTED_MIME_TYPES};
pub use operation::Operation;
pub use params::{ParameterResolver, RequestParameters};
pub use resources::{
    parse_primary_resource, AuxiliaryParse, AuxiliaryResource, AuxiliaryResourceParser,
    ResourceRef,
};
pub use validate::ConstraintValidator;
