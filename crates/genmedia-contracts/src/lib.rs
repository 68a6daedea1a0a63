pub mod error;
pub mod events;
pub mod models;
pub mod requests;

pub use error::{RegistryError, ValidationError};
