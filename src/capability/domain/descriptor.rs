//! Tool descriptor and parameter metadata value objects.

use super::{CapabilityDomainError, CapabilityError, CapabilityResult, ToolArguments, ToolId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Type tag of a tool input or output parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    /// An image handle.
    Image,
    /// Free text.
    Text,
    /// Floating-point or integer number.
    Number,
    /// Integer number.
    Integer,
    /// Boolean flag.
    Boolean,
    /// Arbitrary JSON value.
    Json,
}

impl ParameterType {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Text => "text",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Json => "json",
        }
    }

    /// Returns whether `value` has a shape compatible with this type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Image | Self::Text => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Json => true,
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Metadata for a single tool input or output parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    name: String,
    parameter_type: ParameterType,
    description: String,
    optional: bool,
    default: Option<Value>,
}

impl ToolParameter {
    /// Creates a required parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyParameterName`] when `name` is
    /// empty after trimming.
    pub fn new(
        name: impl Into<String>,
        parameter_type: ParameterType,
    ) -> Result<Self, CapabilityDomainError> {
        let normalized = name.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(CapabilityDomainError::EmptyParameterName);
        }

        Ok(Self {
            name: normalized,
            parameter_type,
            description: String::new(),
            optional: false,
            default: None,
        })
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into().trim().to_owned();
        self
    }

    /// Marks the parameter optional without a default value.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the parameter optional and records its default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.optional = true;
        self.default = Some(default);
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameter type tag.
    #[must_use]
    pub const fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    /// Returns the parameter description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns whether callers may omit the parameter.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the default value, if any.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Descriptive metadata for a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    identifier: ToolId,
    description: String,
    inputs: Vec<ToolParameter>,
    outputs: Vec<ToolParameter>,
}

impl ToolDescriptor {
    /// Creates a descriptor without parameter metadata.
    #[must_use]
    pub fn new(identifier: ToolId, description: impl Into<String>) -> Self {
        Self {
            identifier,
            description: description.into().trim().to_owned(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Appends an input parameter.
    #[must_use]
    pub fn with_input(mut self, parameter: ToolParameter) -> Self {
        self.inputs.push(parameter);
        self
    }

    /// Appends an output parameter.
    #[must_use]
    pub fn with_output(mut self, parameter: ToolParameter) -> Self {
        self.outputs.push(parameter);
        self
    }

    /// Rebinds the descriptor to another identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: ToolId) -> Self {
        self.identifier = identifier;
        self
    }

    /// Returns the tool identifier.
    #[must_use]
    pub const fn identifier(&self) -> &ToolId {
        &self.identifier
    }

    /// Returns the tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns input parameters in declaration order.
    #[must_use]
    pub fn inputs(&self) -> &[ToolParameter] {
        &self.inputs
    }

    /// Returns output parameters in declaration order.
    #[must_use]
    pub fn outputs(&self) -> &[ToolParameter] {
        &self.outputs
    }

    /// Validates caller arguments against declared inputs and fills defaults.
    ///
    /// Image inputs are skipped because the image travels separately from
    /// keyword arguments. Keys that match no declared input are passed
    /// through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::MissingArgument`] when a required input is
    /// absent and [`CapabilityError::InvalidArgument`] when a supplied value
    /// does not match the declared type.
    pub fn resolve_arguments(&self, arguments: &ToolArguments) -> CapabilityResult<ToolArguments> {
        let mut resolved = arguments.clone();
        for parameter in &self.inputs {
            if parameter.parameter_type == ParameterType::Image {
                continue;
            }

            match arguments.get(parameter.name()) {
                Some(value) if !parameter.parameter_type.accepts(value) => {
                    return Err(CapabilityError::InvalidArgument {
                        name: parameter.name().to_owned(),
                        reason: format!("expected {}, got {value}", parameter.parameter_type),
                    });
                }
                Some(_) => {}
                None => match parameter.default_value() {
                    Some(default) => {
                        resolved.insert(parameter.name().to_owned(), default.clone());
                    }
                    None if parameter.is_optional() => {}
                    None => {
                        return Err(CapabilityError::MissingArgument(parameter.name().to_owned()));
                    }
                },
            }
        }
        Ok(resolved)
    }
}
