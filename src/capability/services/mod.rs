//! Registry, discovery, and instance services for vision tools.

mod catalog;
mod finder;
mod instance;
mod registry;

pub use catalog::ModelCatalog;
pub use finder::{FuzzyFinder, relevance_score};
pub use instance::CapabilityInstance;
pub use registry::{CapabilityRegistry, CapabilityRegistryError, CapabilityRegistryResult};
