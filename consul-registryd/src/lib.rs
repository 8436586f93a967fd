pub mod api;
pub mod config;
pub mod consul;
pub mod controller;
pub mod error;
pub mod hash;
pub mod registry;

pub use controller::Controller;
pub use error::RegistryError;
pub use registry::{CatalogRecord, Registry};
