//! Port contracts implemented by vision tools and model backends.

mod capability;
mod model;

pub use capability::{Capability, CapabilityFactory, capability_factory};
pub use model::{ModelLoader, ModelSpec, PredictRequest, VisionModel, model_loader};
