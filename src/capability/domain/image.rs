//! Opaque image handle passed to capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Reference to an image that a capability resolves to pixel data itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(PathBuf);

impl ImageRef {
    /// Creates an image reference from a filesystem path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Returns the referenced path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Returns whether the referenced file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.0.is_file()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.display())
    }
}
