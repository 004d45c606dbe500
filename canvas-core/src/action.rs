//! Named canvas transitions.
//!
//! Every transition the canvas supports is a [`CanvasAction`] variant, so
//! they can be logged, replayed, and sent across process boundaries as JSON:
//!
//! ```json
//! {"type": "add_line", "data": [0.0, 0.0, 10.0, 10.0]}
//! {"type": "undo"}
//! ```

use serde::{Deserialize, Serialize};

use crate::geometry::{Dimensions, Rect, RgbaColor, Vector2d};
use crate::layer::{ImageRef, Layer, Tool};
use crate::state::{CanvasState, DisplayFlag, InteractionFlag};
use crate::CanvasResult;

/// A single canvas transition and its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CanvasAction {
    /// Start a stroke at the given interleaved points.
    AddLine(Vec<f32>),
    /// Extend the current stroke.
    AddPointToCurrentLine(Vec<f32>),
    /// Remove all mask strokes.
    ClearMask,
    /// Stage a generated image.
    AddImageToStagingArea {
        /// Where the image renders.
        bounding_box: Option<Rect>,
        /// The generated image.
        image: Option<ImageRef>,
    },
    /// Accept the selected staged image.
    CommitStagingAreaImage,
    /// Throw away staged images.
    DiscardStagedImages,
    /// Preview the next staged image.
    NextStagingAreaImage,
    /// Preview the previous staged image.
    PrevStagingAreaImage,
    /// Empty the canvas.
    ResetCanvas,
    /// Start over from a base image.
    SetInitialCanvasImage(ImageRef),
    /// Step back one snapshot.
    Undo,
    /// Step forward one snapshot.
    Redo,
    /// Forget undo and redo history.
    ClearHistory,
    /// Change the history bound.
    SetMaxHistory(usize),
    /// Select a tool.
    SetTool(Tool),
    /// Swap brush and eraser.
    ToggleTool,
    /// Select the drawing layer.
    SetLayer(Layer),
    /// Set the brush color.
    SetBrushColor(RgbaColor),
    /// Set the brush diameter.
    SetBrushSize(f32),
    /// Set the eraser diameter.
    SetEraserSize(f32),
    /// Set the mask color.
    SetMaskColor(RgbaColor),
    /// Enable or disable the mask.
    SetIsMaskEnabled(bool),
    /// Flip mask visibility.
    ToggleShouldShowMask,
    /// Flip preserve-masked-area.
    ToggleShouldInvertMask,
    /// Set preserve-masked-area.
    SetShouldPreserveMaskedArea(bool),
    /// Track the pointer.
    SetCursorPosition(Option<Vector2d>),
    /// Mark a stroke in progress.
    SetIsDrawing(bool),
    /// Resize the stage.
    SetStageDimensions(Dimensions),
    /// Move the stage.
    SetStageCoordinates(Vector2d),
    /// Zoom the stage.
    SetStageScale(f32),
    /// Resize the bounding box.
    SetBoundingBoxDimensions(Dimensions),
    /// Move the bounding box.
    SetBoundingBoxCoordinates(Vector2d),
    /// Set the fill outside the bounding box.
    SetBoundingBoxPreviewFill(RgbaColor),
    /// Record the container size.
    SetCanvasContainerDimensions(Dimensions),
    /// Match the stage to the container.
    ResizeCanvas,
    /// Fit the stage around the base image.
    ResizeAndScaleCanvas,
    /// Fit a content rectangle into the stage.
    ResetCanvasView(Rect),
    /// Pull the bounding box back inside the stage.
    FitBoundingBoxToStage,
    /// Fit to the base image instead of the container.
    SetShouldLockToInitialImage(bool),
    /// Mark that the stage needs refitting.
    SetDoesCanvasNeedScaling(bool),
    /// Use the inpaint replacement strength.
    SetShouldUseInpaintReplace(bool),
    /// Set the inpaint replacement strength.
    SetInpaintReplace(f32),
    /// Set a display preference.
    SetDisplayFlag {
        /// Which preference.
        flag: DisplayFlag,
        /// New value.
        value: bool,
    },
    /// Flip a display preference.
    ToggleDisplayFlag(DisplayFlag),
    /// Set a pointer-interaction flag.
    SetInteractionFlag {
        /// Which flag.
        flag: InteractionFlag,
        /// New value.
        value: bool,
    },
}

impl CanvasAction {
    /// Whether applying this action may record an undo snapshot.
    #[must_use]
    pub const fn is_history_affecting(&self) -> bool {
        matches!(
            self,
            Self::AddLine(_)
                | Self::ClearMask
                | Self::AddImageToStagingArea { .. }
                | Self::CommitStagingAreaImage
                | Self::ResetCanvas
                | Self::SetInitialCanvasImage(_)
        )
    }

    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddLine(_) => "add_line",
            Self::AddPointToCurrentLine(_) => "add_point_to_current_line",
            Self::ClearMask => "clear_mask",
            Self::AddImageToStagingArea { .. } => "add_image_to_staging_area",
            Self::CommitStagingAreaImage => "commit_staging_area_image",
            Self::DiscardStagedImages => "discard_staged_images",
            Self::NextStagingAreaImage => "next_staging_area_image",
            Self::PrevStagingAreaImage => "prev_staging_area_image",
            Self::ResetCanvas => "reset_canvas",
            Self::SetInitialCanvasImage(_) => "set_initial_canvas_image",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::ClearHistory => "clear_history",
            Self::SetMaxHistory(_) => "set_max_history",
            Self::SetTool(_) => "set_tool",
            Self::ToggleTool => "toggle_tool",
            Self::SetLayer(_) => "set_layer",
            Self::SetBrushColor(_) => "set_brush_color",
            Self::SetBrushSize(_) => "set_brush_size",
            Self::SetEraserSize(_) => "set_eraser_size",
            Self::SetMaskColor(_) => "set_mask_color",
            Self::SetIsMaskEnabled(_) => "set_is_mask_enabled",
            Self::ToggleShouldShowMask => "toggle_should_show_mask",
            Self::ToggleShouldInvertMask => "toggle_should_invert_mask",
            Self::SetShouldPreserveMaskedArea(_) => "set_should_preserve_masked_area",
            Self::SetCursorPosition(_) => "set_cursor_position",
            Self::SetIsDrawing(_) => "set_is_drawing",
            Self::SetStageDimensions(_) => "set_stage_dimensions",
            Self::SetStageCoordinates(_) => "set_stage_coordinates",
            Self::SetStageScale(_) => "set_stage_scale",
            Self::SetBoundingBoxDimensions(_) => "set_bounding_box_dimensions",
            Self::SetBoundingBoxCoordinates(_) => "set_bounding_box_coordinates",
            Self::SetBoundingBoxPreviewFill(_) => "set_bounding_box_preview_fill",
            Self::SetCanvasContainerDimensions(_) => "set_canvas_container_dimensions",
            Self::ResizeCanvas => "resize_canvas",
            Self::ResizeAndScaleCanvas => "resize_and_scale_canvas",
            Self::ResetCanvasView(_) => "reset_canvas_view",
            Self::FitBoundingBoxToStage => "fit_bounding_box_to_stage",
            Self::SetShouldLockToInitialImage(_) => "set_should_lock_to_initial_image",
            Self::SetDoesCanvasNeedScaling(_) => "set_does_canvas_need_scaling",
            Self::SetShouldUseInpaintReplace(_) => "set_should_use_inpaint_replace",
            Self::SetInpaintReplace(_) => "set_inpaint_replace",
            Self::SetDisplayFlag { .. } => "set_display_flag",
            Self::ToggleDisplayFlag(_) => "toggle_display_flag",
            Self::SetInteractionFlag { .. } => "set_interaction_flag",
        }
    }

    /// Parse a JSON array of actions.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a list of valid actions.
    pub fn list_from_json(json: &str) -> CanvasResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }
}

impl CanvasState {
    /// Apply one action in place.
    pub fn apply(&mut self, action: CanvasAction) {
        tracing::trace!(
            action = action.name(),
            history = action.is_history_affecting(),
            "Applying canvas action"
        );
        match action {
            CanvasAction::AddLine(points) => self.add_line(points),
            CanvasAction::AddPointToCurrentLine(points) => self.add_point_to_current_line(&points),
            CanvasAction::ClearMask => self.clear_mask(),
            CanvasAction::AddImageToStagingArea {
                bounding_box,
                image,
            } => self.add_image_to_staging_area(bounding_box, image),
            CanvasAction::CommitStagingAreaImage => self.commit_staging_area_image(),
            CanvasAction::DiscardStagedImages => self.discard_staged_images(),
            CanvasAction::NextStagingAreaImage => self.next_staging_area_image(),
            CanvasAction::PrevStagingAreaImage => self.prev_staging_area_image(),
            CanvasAction::ResetCanvas => self.reset_canvas(),
            CanvasAction::SetInitialCanvasImage(image) => self.set_initial_canvas_image(image),
            CanvasAction::Undo => self.undo(),
            CanvasAction::Redo => self.redo(),
            CanvasAction::ClearHistory => self.clear_history(),
            CanvasAction::SetMaxHistory(max) => self.set_max_history(max),
            CanvasAction::SetTool(tool) => self.set_tool(tool),
            CanvasAction::ToggleTool => self.toggle_tool(),
            CanvasAction::SetLayer(layer) => self.layer = layer,
            CanvasAction::SetBrushColor(color) => self.brush_color = color,
            CanvasAction::SetBrushSize(size) => self.brush_size = size,
            CanvasAction::SetEraserSize(size) => self.eraser_size = size,
            CanvasAction::SetMaskColor(color) => self.mask_color = color,
            CanvasAction::SetIsMaskEnabled(enabled) => self.set_is_mask_enabled(enabled),
            CanvasAction::ToggleShouldShowMask => self.toggle_should_show_mask(),
            CanvasAction::ToggleShouldInvertMask => self.toggle_should_invert_mask(),
            CanvasAction::SetShouldPreserveMaskedArea(value) => {
                self.should_preserve_masked_area = value;
            }
            CanvasAction::SetCursorPosition(position) => self.cursor_position = position,
            CanvasAction::SetIsDrawing(value) => self.is_drawing = value,
            CanvasAction::SetStageDimensions(dimensions) => self.set_stage_dimensions(dimensions),
            CanvasAction::SetStageCoordinates(coordinates) => {
                self.set_stage_coordinates(coordinates);
            }
            CanvasAction::SetStageScale(scale) => self.stage_scale = scale,
            CanvasAction::SetBoundingBoxDimensions(dimensions) => {
                self.bounding_box_dimensions = dimensions;
            }
            CanvasAction::SetBoundingBoxCoordinates(coordinates) => {
                self.set_bounding_box_coordinates(coordinates);
            }
            CanvasAction::SetBoundingBoxPreviewFill(color) => {
                self.bounding_box_preview_fill = color;
            }
            CanvasAction::SetCanvasContainerDimensions(dimensions) => {
                self.canvas_container_dimensions = dimensions;
            }
            CanvasAction::ResizeCanvas => self.resize_canvas(),
            CanvasAction::ResizeAndScaleCanvas => self.resize_and_scale_canvas(),
            CanvasAction::ResetCanvasView(content_rect) => self.reset_canvas_view(content_rect),
            CanvasAction::FitBoundingBoxToStage => self.fit_bounding_box_to_stage(),
            CanvasAction::SetShouldLockToInitialImage(value) => {
                self.should_lock_to_initial_image = value;
            }
            CanvasAction::SetDoesCanvasNeedScaling(value) => self.does_canvas_need_scaling = value,
            CanvasAction::SetShouldUseInpaintReplace(value) => {
                self.should_use_inpaint_replace = value;
            }
            CanvasAction::SetInpaintReplace(value) => self.inpaint_replace = value,
            CanvasAction::SetDisplayFlag { flag, value } => self.set_display_flag(flag, value),
            CanvasAction::ToggleDisplayFlag(flag) => self.toggle_display_flag(flag),
            CanvasAction::SetInteractionFlag { flag, value } => {
                self.set_interaction_flag(flag, value);
            }
        }
    }

    /// Apply actions in order.
    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = CanvasAction>) {
        for action in actions {
            self.apply(action);
        }
    }
}

/// Pure transition: consume a state and return the state after `action`.
#[must_use]
pub fn reduce(mut state: CanvasState, action: CanvasAction) -> CanvasState {
    state.apply(action);
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_json_shape() {
        let json = serde_json::to_value(CanvasAction::AddLine(vec![0.0, 0.0, 10.0, 10.0]))
            .expect("serialize");
        assert_eq!(json["type"], "add_line");
        assert_eq!(json["data"][2], 10.0);

        let undo = serde_json::to_value(CanvasAction::Undo).expect("serialize");
        assert_eq!(undo["type"], "undo");
    }

    #[test]
    fn test_list_from_json() {
        let actions = CanvasAction::list_from_json(
            r#"[
                {"type": "set_tool", "data": "eraser"},
                {"type": "add_line", "data": [1, 2, 3, 4]},
                {"type": "add_image_to_staging_area", "data": {}},
                {"type": "set_display_flag", "data": {"flag": "show_grid", "value": false}},
                {"type": "undo"}
            ]"#,
        )
        .expect("parse");

        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0], CanvasAction::SetTool(Tool::Eraser));
        assert_eq!(
            actions[2],
            CanvasAction::AddImageToStagingArea {
                bounding_box: None,
                image: None
            }
        );
    }

    #[test]
    fn test_list_from_json_rejects_unknown_action() {
        let result = CanvasAction::list_from_json(r#"[{"type": "paint_everything"}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_reduce_matches_apply() {
        let actions = vec![
            CanvasAction::AddLine(vec![0.0, 0.0]),
            CanvasAction::AddPointToCurrentLine(vec![1.0, 1.0]),
            CanvasAction::SetTool(Tool::Eraser),
            CanvasAction::AddLine(vec![2.0, 2.0]),
            CanvasAction::Undo,
        ];

        let reduced = actions
            .iter()
            .cloned()
            .fold(CanvasState::new(), reduce);

        let mut applied = CanvasState::new();
        applied.apply_all(actions);

        assert_eq!(reduced, applied);
        assert_eq!(applied.layer_state().objects.len(), 1);
        assert_eq!(applied.history().future().len(), 1);
    }

    #[test]
    fn test_history_classification() {
        assert!(CanvasAction::AddLine(vec![]).is_history_affecting());
        assert!(CanvasAction::ResetCanvas.is_history_affecting());
        assert!(!CanvasAction::AddPointToCurrentLine(vec![]).is_history_affecting());
        assert!(!CanvasAction::DiscardStagedImages.is_history_affecting());
        assert!(!CanvasAction::Undo.is_history_affecting());
    }
}
