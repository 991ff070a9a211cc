use serde::{Deserialize, Serialize};

use crate::core::Result;

/// Change-tracking configuration
///
/// Consumed when shadow collection accessors are built for a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Fail accessor construction for a navigation whose target has a
    /// runtime type that was never registered. When disabled the navigation
    /// degrades to an untyped (shadow-shadow) collection instead.
    pub strict_element_types: bool,

    /// Initial capacity of newly created shadow collections
    pub collection_capacity: usize,
}

impl TrackingConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self {
            strict_element_types: true,
            collection_capacity: 0,
        }
    }

    /// Set strict element type resolution
    pub fn strict_element_types(mut self, strict: bool) -> Self {
        self.strict_element_types = strict;
        self
    }

    /// Set initial collection capacity
    pub fn collection_capacity(mut self, capacity: usize) -> Self {
        self.collection_capacity = capacity;
        self
    }

    /// Load a configuration from JSON; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self::new()
    }
}
