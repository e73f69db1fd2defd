//! Domain model for vision tools and their metadata.
//!
//! Tool descriptors, parameter metadata, argument resolution, and image
//! handles live here. Model inference and process concerns remain outside
//! this boundary.

mod arguments;
mod descriptor;
mod error;
mod ids;
mod image;
mod instance;

pub use arguments::{ToolArguments, bool_argument, number_argument, text_argument};
pub use descriptor::{ParameterType, ToolDescriptor, ToolParameter};
pub use error::{CapabilityDomainError, CapabilityError, CapabilityResult};
pub use ids::ToolId;
pub use image::ImageRef;
pub use instance::InstanceState;
