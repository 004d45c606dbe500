//! Canonical serialized representation of a canvas session.

use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerObject};
use crate::{CanvasResult, CanvasState};

/// A persisted canvas session.
///
/// History stacks are not part of the document; a restored session starts
/// with empty undo and redo stacks but keeps its history bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// Session identifier.
    pub session_id: String,
    /// Timestamp in milliseconds.
    pub timestamp: u64,
    /// Canvas contents and UI state.
    pub state: CanvasState,
}

impl CanvasDocument {
    /// Build a document from a runtime state.
    #[must_use]
    pub fn from_state(session_id: impl Into<String>, state: &CanvasState, timestamp: u64) -> Self {
        Self {
            session_id: session_id.into(),
            timestamp,
            state: state.clone(),
        }
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid document.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Object and history counts for a canvas, for logs and tooling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSummary {
    /// Strokes on the base layer.
    pub base_lines: usize,
    /// Strokes on the mask layer.
    pub mask_lines: usize,
    /// Placed images.
    pub images: usize,
    /// Staged candidates.
    pub staged_images: usize,
    /// Previewed candidate.
    pub selected_staged_image: Option<usize>,
    /// Available undo steps.
    pub past: usize,
    /// Available redo steps.
    pub future: usize,
    /// History bound.
    pub max_history: usize,
}

impl From<&CanvasState> for CanvasSummary {
    fn from(state: &CanvasState) -> Self {
        let layer_state = state.layer_state();
        let mut summary = Self {
            staged_images: layer_state.staging_area.images().len(),
            selected_staged_image: layer_state.staging_area.selected_image_index(),
            past: state.history().past().len(),
            future: state.history().future().len(),
            max_history: state.history().max_history(),
            ..Self::default()
        };
        for object in &layer_state.objects {
            match object {
                LayerObject::Line(line) if line.layer == Layer::Mask => summary.mask_lines += 1,
                LayerObject::Line(_) => summary.base_lines += 1,
                LayerObject::Image(_) => summary.images += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layer::ImageRef;

    #[test]
    fn test_document_round_trip_drops_history() {
        let mut state = CanvasState::new();
        state.set_max_history(16);
        state.add_line(vec![0.0, 0.0, 4.0, 4.0]);
        state.add_image_to_staging_area(
            Some(Rect::new(0.0, 0.0, 64.0, 64.0)),
            Some(ImageRef::new("a.png", 64, 64)),
        );

        let doc = CanvasDocument::from_state("default", &state, 42);
        let json = doc.to_json().expect("serialize");
        let restored = CanvasDocument::from_json(&json).expect("deserialize");

        assert_eq!(restored.session_id, "default");
        assert_eq!(restored.timestamp, 42);
        assert_eq!(restored.state.layer_state(), state.layer_state());
        assert_eq!(restored.state.history().max_history(), 16);
        assert!(!restored.state.history().can_undo());
    }

    #[test]
    fn test_summary_counts() {
        let mut state = CanvasState::new();
        state.add_line(vec![0.0, 0.0]);
        state.set_is_mask_enabled(true);
        state.add_line(vec![1.0, 1.0]);
        state.add_line(vec![2.0, 2.0]);
        state.undo();

        let summary = CanvasSummary::from(&state);
        assert_eq!(summary.base_lines, 1);
        assert_eq!(summary.mask_lines, 1);
        assert_eq!(summary.images, 0);
        assert_eq!(summary.past, 2);
        assert_eq!(summary.future, 1);
        assert_eq!(summary.max_history, 128);
    }
}
