//! Editor settings.
//!
//! Every field has a default matching the stock flow builder, so a host only
//! needs to set what it changes:
//!
//! ```
//! use chatflow_editor::{EditorConfig, ValidationMode};
//!
//! let config = EditorConfig::from_json(r#"{ "validationMode": "reachability" }"#).unwrap();
//! assert_eq!(config.validation_mode, ValidationMode::Reachability);
//! assert_eq!(config.handle_radius, 8.0);
//! ```

use crate::document::{DEFAULT_DOCUMENT_NAME, DOCUMENT_VERSION};
use crate::error::ConfigError;
use crate::geometry::DROP_CENTER_OFFSET;
use crate::graph::{CompositeRule, HandleDirectionRule};
use crate::model::Position;
use crate::validate::ValidationMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Subtracted from a palette drop point so the new node is centered.
    pub drop_center_offset: Position,
    /// Hit radius of connection handles.
    pub handle_radius: f32,
    /// Max distance at which a connection curve counts as hovered.
    pub connection_hover_distance: f32,
    /// Line segments used to approximate a curve when hit testing.
    pub hit_samples: usize,
    pub validation_mode: ValidationMode,
    /// Refuse connections out of `end` nodes and into `start` nodes.
    pub enforce_handle_direction: bool,
    /// How long the UI shows a validation banner, in milliseconds.
    pub validation_banner_ms: u64,
    pub document_name: String,
    pub document_version: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drop_center_offset: DROP_CENTER_OFFSET,
            handle_radius: 8.0,
            connection_hover_distance: 6.0,
            hit_samples: 20,
            validation_mode: ValidationMode::Connectivity,
            enforce_handle_direction: false,
            validation_banner_ms: 3000,
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
            document_version: DOCUMENT_VERSION.to_string(),
        }
    }
}

impl EditorConfig {
    /// Load from JSON; missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    pub fn validation_banner_duration(&self) -> Duration {
        Duration::from_millis(self.validation_banner_ms)
    }

    /// Connection rules implied by these settings.
    pub fn connection_rules(&self) -> CompositeRule {
        let rules = CompositeRule::standard();
        if self.enforce_handle_direction {
            rules.add(HandleDirectionRule)
        } else {
            rules
        }
    }

    /// Set the handle hit radius (default: 8.0).
    pub fn set_handle_radius(&mut self, radius: f32) {
        self.handle_radius = radius;
    }

    /// Set the validation mode (default: connectivity).
    pub fn set_validation_mode(&mut self, mode: ValidationMode) {
        self.validation_mode = mode;
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.handle_radius.is_nan() || self.handle_radius < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "handleRadius must be non-negative, got {}",
                self.handle_radius
            )));
        }
        if self.connection_hover_distance.is_nan() || self.connection_hover_distance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "connectionHoverDistance must be non-negative, got {}",
                self.connection_hover_distance
            )));
        }
        if self.document_version.is_empty() {
            return Err(ConfigError::Invalid("documentVersion must not be empty".to_string()));
        }
        Ok(())
    }
}
