//! Canvas configuration.

use serde::{Deserialize, Serialize};

use crate::geometry::{Dimensions, GRID_SIZE};
use crate::history::DEFAULT_MAX_HISTORY;
use crate::{CanvasError, CanvasResult};

/// Initial values for a new canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Snapshots kept on each of the undo and redo stacks.
    pub max_history: usize,
    /// Initial brush diameter.
    pub brush_size: f32,
    /// Initial eraser diameter.
    pub eraser_size: f32,
    /// Initial bounding box size.
    pub bounding_box: Dimensions,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            brush_size: 50.0,
            eraser_size: 50.0,
            bounding_box: Dimensions::new(512.0, 512.0),
        }
    }
}

impl CanvasConfig {
    /// Set the history bound.
    #[must_use]
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Check that sizes are usable.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] for non-positive tool sizes or a
    /// bounding box smaller than one grid cell.
    pub fn validate(&self) -> CanvasResult<()> {
        if !(self.brush_size.is_finite() && self.brush_size > 0.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "brush_size must be positive, got {}",
                self.brush_size
            )));
        }
        if !(self.eraser_size.is_finite() && self.eraser_size > 0.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "eraser_size must be positive, got {}",
                self.eraser_size
            )));
        }
        let Dimensions { width, height } = self.bounding_box;
        if width < GRID_SIZE || height < GRID_SIZE {
            return Err(CanvasError::InvalidConfig(format!(
                "bounding_box must be at least {GRID_SIZE}x{GRID_SIZE}, got {width}x{height}"
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails [`CanvasConfig::validate`].
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CanvasConfig::default();
        assert_eq!(config.max_history, 128);
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CanvasConfig::from_json(r#"{"max_history": 4}"#).expect("parse");
        assert_eq!(config.max_history, 4);
        assert!((config.brush_size - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_tiny_bounding_box() {
        let result =
            CanvasConfig::from_json(r#"{"bounding_box": {"width": 32.0, "height": 512.0}}"#);
        assert!(matches!(result, Err(CanvasError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_brush() {
        let config = CanvasConfig {
            brush_size: 0.0,
            ..CanvasConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
