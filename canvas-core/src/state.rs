//! Canvas state management.
//!
//! [`CanvasState`] owns the current [`LayerState`], its undo/redo
//! [`History`], and the UI-mode fields (tool, colors, stage transform,
//! bounding box) that change independently of history.
//!
//! Transitions never fail. Missing or out-of-range input leaves the state
//! untouched.

use serde::{Deserialize, Serialize};

use crate::config::CanvasConfig;
use crate::geometry::{
    calculate_coordinates, calculate_scale, centered_box_offset, clamp, default_box_edge,
    floor_coordinates, round_down_to_multiple, Dimensions, Rect, RgbaColor, Vector2d,
    FIT_PADDING, GRID_SIZE,
};
use crate::history::History;
use crate::layer::{CanvasImage, CanvasLine, ImageRef, Layer, LayerObject, LayerState, Tool};

/// Boolean display preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFlag {
    /// Draw the snapping grid.
    ShowGrid,
    /// Snap the bounding box to the grid while moving it.
    SnapToGrid,
    /// Draw the bounding box outline.
    ShowBoundingBox,
    /// Dim everything outside the bounding box.
    DarkenOutsideBoundingBox,
    /// Prevent moving or resizing the bounding box.
    LockBoundingBox,
    /// Show intermediate generation steps in the staging area.
    ShowIntermediates,
    /// Draw the brush cursor.
    ShowBrush,
    /// Draw the brush preview circle.
    ShowBrushPreview,
    /// Draw a checkerboard behind transparent pixels.
    ShowCheckerboardTransparency,
    /// Save committed images to the gallery automatically.
    AutoSave,
}

/// Display preferences.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Draw the snapping grid.
    pub show_grid: bool,
    /// Snap the bounding box to the grid.
    pub snap_to_grid: bool,
    /// Draw the bounding box outline.
    pub show_bounding_box: bool,
    /// Dim everything outside the bounding box.
    pub darken_outside_bounding_box: bool,
    /// Prevent moving or resizing the bounding box.
    pub lock_bounding_box: bool,
    /// Show intermediate generation steps.
    pub show_intermediates: bool,
    /// Draw the brush cursor.
    pub show_brush: bool,
    /// Draw the brush preview circle.
    pub show_brush_preview: bool,
    /// Draw a checkerboard behind transparent pixels.
    pub show_checkerboard_transparency: bool,
    /// Save committed images automatically.
    pub auto_save: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_grid: true,
            snap_to_grid: true,
            show_bounding_box: true,
            darken_outside_bounding_box: false,
            lock_bounding_box: false,
            show_intermediates: true,
            show_brush: true,
            show_brush_preview: false,
            show_checkerboard_transparency: false,
            auto_save: false,
        }
    }
}

impl DisplayOptions {
    fn flag_mut(&mut self, flag: DisplayFlag) -> &mut bool {
        match flag {
            DisplayFlag::ShowGrid => &mut self.show_grid,
            DisplayFlag::SnapToGrid => &mut self.snap_to_grid,
            DisplayFlag::ShowBoundingBox => &mut self.show_bounding_box,
            DisplayFlag::DarkenOutsideBoundingBox => &mut self.darken_outside_bounding_box,
            DisplayFlag::LockBoundingBox => &mut self.lock_bounding_box,
            DisplayFlag::ShowIntermediates => &mut self.show_intermediates,
            DisplayFlag::ShowBrush => &mut self.show_brush,
            DisplayFlag::ShowBrushPreview => &mut self.show_brush_preview,
            DisplayFlag::ShowCheckerboardTransparency => {
                &mut self.show_checkerboard_transparency
            }
            DisplayFlag::AutoSave => &mut self.auto_save,
        }
    }

    /// Read a flag.
    #[must_use]
    pub fn get(&self, flag: DisplayFlag) -> bool {
        let mut copy = *self;
        *copy.flag_mut(flag)
    }
}

/// Transient pointer-interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionFlag {
    /// The stage is being dragged.
    MovingStage,
    /// The bounding box is being dragged.
    MovingBoundingBox,
    /// The bounding box is being resized.
    TransformingBoundingBox,
    /// The pointer hovers the bounding box.
    MouseOverBoundingBox,
    /// The move-bounding-box modifier key is down.
    MoveBoundingBoxKeyHeld,
    /// The move-stage modifier key is down.
    MoveStageKeyHeld,
}

/// Transient pointer-interaction state.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// The stage is being dragged.
    pub moving_stage: bool,
    /// The bounding box is being dragged.
    pub moving_bounding_box: bool,
    /// The bounding box is being resized.
    pub transforming_bounding_box: bool,
    /// The pointer hovers the bounding box.
    pub mouse_over_bounding_box: bool,
    /// The move-bounding-box modifier key is down.
    pub move_bounding_box_key_held: bool,
    /// The move-stage modifier key is down.
    pub move_stage_key_held: bool,
}

impl Interaction {
    fn flag_mut(&mut self, flag: InteractionFlag) -> &mut bool {
        match flag {
            InteractionFlag::MovingStage => &mut self.moving_stage,
            InteractionFlag::MovingBoundingBox => &mut self.moving_bounding_box,
            InteractionFlag::TransformingBoundingBox => &mut self.transforming_bounding_box,
            InteractionFlag::MouseOverBoundingBox => &mut self.mouse_over_bounding_box,
            InteractionFlag::MoveBoundingBoxKeyHeld => &mut self.move_bounding_box_key_held,
            InteractionFlag::MoveStageKeyHeld => &mut self.move_stage_key_held,
        }
    }
}

/// The complete canvas state.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    /// Current layer contents.
    layer_state: LayerState,
    /// Undo/redo snapshots of `layer_state`.
    history: History,
    /// Active tool.
    pub tool: Tool,
    /// Layer new strokes land on.
    pub layer: Layer,
    /// Brush stroke color on the base layer.
    pub brush_color: RgbaColor,
    /// Brush diameter.
    pub brush_size: f32,
    /// Eraser diameter.
    pub eraser_size: f32,
    /// Color the mask renders with.
    pub mask_color: RgbaColor,
    /// Whether the mask is shown and applied.
    pub is_mask_enabled: bool,
    /// Keep the masked area instead of regenerating it.
    pub should_preserve_masked_area: bool,
    /// Bounding box top-left corner.
    pub bounding_box_coordinates: Vector2d,
    /// Bounding box size.
    pub bounding_box_dimensions: Dimensions,
    /// Fill drawn outside the bounding box.
    pub bounding_box_preview_fill: RgbaColor,
    /// Stage offset.
    pub stage_coordinates: Vector2d,
    /// Stage size.
    pub stage_dimensions: Dimensions,
    /// Stage zoom.
    pub stage_scale: f32,
    /// Zoom at which the base image fits the container.
    pub minimum_stage_scale: f32,
    /// Size of the element hosting the stage.
    pub canvas_container_dimensions: Dimensions,
    /// Pointer position over the stage.
    pub cursor_position: Option<Vector2d>,
    /// A stroke is in progress.
    pub is_drawing: bool,
    /// The stage has been fitted to the base image.
    pub is_canvas_initialized: bool,
    /// The stage must be refitted before rendering.
    pub does_canvas_need_scaling: bool,
    /// Fit the stage to the base image rather than the container.
    pub should_lock_to_initial_image: bool,
    /// Use `inpaint_replace` when inpainting.
    pub should_use_inpaint_replace: bool,
    /// Inpainting replacement strength.
    pub inpaint_replace: f32,
    /// Display preferences.
    pub display: DisplayOptions,
    /// Pointer interaction state.
    pub interaction: Interaction,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasState {
    /// Create an empty canvas with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&CanvasConfig::default())
    }

    /// Create an empty canvas from a configuration.
    #[must_use]
    pub fn with_config(config: &CanvasConfig) -> Self {
        Self {
            layer_state: LayerState::default(),
            history: History::new(config.max_history),
            tool: Tool::Brush,
            layer: Layer::Base,
            brush_color: RgbaColor::new(90, 90, 255, 1.0),
            brush_size: config.brush_size,
            eraser_size: config.eraser_size,
            mask_color: RgbaColor::new(255, 90, 90, 1.0),
            is_mask_enabled: true,
            should_preserve_masked_area: false,
            bounding_box_coordinates: Vector2d::default(),
            bounding_box_dimensions: config.bounding_box,
            bounding_box_preview_fill: RgbaColor::new(0, 0, 0, 0.5),
            stage_coordinates: Vector2d::default(),
            stage_dimensions: Dimensions::default(),
            stage_scale: 1.0,
            minimum_stage_scale: 1.0,
            canvas_container_dimensions: Dimensions::default(),
            cursor_position: None,
            is_drawing: false,
            is_canvas_initialized: false,
            does_canvas_need_scaling: false,
            should_lock_to_initial_image: false,
            should_use_inpaint_replace: false,
            inpaint_replace: 0.1,
            display: DisplayOptions::default(),
            interaction: Interaction::default(),
        }
    }

    /// Current layer contents.
    #[must_use]
    pub fn layer_state(&self) -> &LayerState {
        &self.layer_state
    }

    /// Undo/redo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    // -----------------------------------------------------------------------
    // History-affecting transitions
    // -----------------------------------------------------------------------

    /// Start a stroke with the active tool, layer, color and size.
    ///
    /// No-op while the move tool is active.
    pub fn add_line(&mut self, points: Vec<f32>) {
        let (stroke_width, color) = match self.tool {
            Tool::Move => {
                tracing::trace!("add_line with move tool; ignoring");
                return;
            }
            Tool::Brush => (
                self.brush_size / 2.0,
                (self.layer == Layer::Base).then_some(self.brush_color),
            ),
            Tool::Eraser => (self.eraser_size / 2.0, None),
        };

        self.history.record(&self.layer_state);
        self.layer_state.objects.push(LayerObject::Line(CanvasLine {
            layer: self.layer,
            tool: self.tool,
            stroke_width,
            points,
            color,
        }));
    }

    /// Remove every mask stroke and stop preserving the masked area.
    pub fn clear_mask(&mut self) {
        self.history.record(&self.layer_state);
        let removed = self.layer_state.remove_mask_lines();
        self.should_preserve_masked_area = false;
        tracing::debug!(removed, "Cleared mask");
    }

    /// Stage a generated image at `bounding_box` and select it.
    ///
    /// No-op unless both arguments are present.
    pub fn add_image_to_staging_area(
        &mut self,
        bounding_box: Option<Rect>,
        image: Option<ImageRef>,
    ) {
        let (Some(bounds), Some(image)) = (bounding_box, image) else {
            tracing::trace!("add_image_to_staging_area without box or image; ignoring");
            return;
        };

        self.history.record(&self.layer_state);
        let staging_area = &mut self.layer_state.staging_area;
        staging_area.bounds = Some(bounds);
        staging_area.push(CanvasImage {
            layer: Layer::Base,
            bounds,
            image,
        });
    }

    /// Make the selected staged image a permanent base-layer object and empty
    /// the staging area.
    ///
    /// No-op when nothing is selected.
    pub fn commit_staging_area_image(&mut self) {
        let Some(selected) = self.layer_state.staging_area.selected_image().cloned() else {
            tracing::trace!("commit_staging_area_image with no selection; ignoring");
            return;
        };

        self.history.record(&self.layer_state);
        tracing::debug!(image = %selected.image.uuid, "Committed staged image");
        self.layer_state.objects.push(LayerObject::Image(selected));
        self.layer_state.staging_area.clear();
    }

    /// Replace the layer state with an empty one.
    pub fn reset_canvas(&mut self) {
        self.history.record(&self.layer_state);
        self.layer_state = LayerState::default();
    }

    /// Start over from a new base image, sizing and centring the bounding
    /// box on it.
    pub fn set_initial_canvas_image(&mut self, image: ImageRef) {
        let size = image.dimensions();
        let box_dimensions =
            Dimensions::new(default_box_edge(size.width), default_box_edge(size.height));

        self.bounding_box_dimensions = box_dimensions;
        self.bounding_box_coordinates = Vector2d::new(
            centered_box_offset(size.width, box_dimensions.width),
            centered_box_offset(size.height, box_dimensions.height),
        );

        self.history.record(&self.layer_state);
        self.layer_state = LayerState {
            objects: vec![LayerObject::Image(CanvasImage {
                layer: Layer::Base,
                bounds: Rect::new(0.0, 0.0, size.width, size.height),
                image,
            })],
            ..LayerState::default()
        };

        self.is_canvas_initialized = false;
        self.does_canvas_need_scaling = true;
    }

    // -----------------------------------------------------------------------
    // Layer transitions outside history
    // -----------------------------------------------------------------------

    /// Extend the most recent stroke. No-op if there is none.
    pub fn add_point_to_current_line(&mut self, points: &[f32]) {
        match self.layer_state.last_line_mut() {
            Some(line) => line.points.extend_from_slice(points),
            None => tracing::trace!("add_point_to_current_line without a line; ignoring"),
        }
    }

    /// Throw away all staged candidates.
    pub fn discard_staged_images(&mut self) {
        self.layer_state.staging_area.clear();
    }

    /// Preview the next staged candidate, stopping at the last.
    pub fn next_staging_area_image(&mut self) {
        self.layer_state.staging_area.select_next();
    }

    /// Preview the previous staged candidate, stopping at the first.
    pub fn prev_staging_area_image(&mut self) {
        self.layer_state.staging_area.select_prev();
    }

    /// Step back one snapshot.
    pub fn undo(&mut self) {
        self.history.undo(&mut self.layer_state);
    }

    /// Step forward one snapshot.
    pub fn redo(&mut self) {
        self.history.redo(&mut self.layer_state);
    }

    /// Forget all undo and redo snapshots.
    pub fn clear_history(&mut self) {
        self.history.clear();
        tracing::debug!("Cleared canvas history");
    }

    /// Change how many snapshots each history stack keeps.
    pub fn set_max_history(&mut self, max_history: usize) {
        self.history.set_max_history(max_history);
    }

    // -----------------------------------------------------------------------
    // Tools and colors
    // -----------------------------------------------------------------------

    /// Select a tool. Drawing tools cancel any stage or bounding box drag.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        if tool != Tool::Move {
            self.interaction.transforming_bounding_box = false;
            self.interaction.mouse_over_bounding_box = false;
            self.interaction.moving_bounding_box = false;
            self.interaction.moving_stage = false;
        }
    }

    /// Swap brush and eraser. No-op with the move tool.
    pub fn toggle_tool(&mut self) {
        self.tool = match self.tool {
            Tool::Brush => Tool::Eraser,
            Tool::Eraser => Tool::Brush,
            Tool::Move => Tool::Move,
        };
    }

    /// Enable or disable the mask, switching to the matching layer.
    pub fn set_is_mask_enabled(&mut self, enabled: bool) {
        self.is_mask_enabled = enabled;
        self.layer = if enabled { Layer::Mask } else { Layer::Base };
    }

    /// Flip mask visibility without changing the active layer.
    pub fn toggle_should_show_mask(&mut self) {
        self.is_mask_enabled = !self.is_mask_enabled;
    }

    /// Flip between regenerating and preserving the masked area.
    pub fn toggle_should_invert_mask(&mut self) {
        self.should_preserve_masked_area = !self.should_preserve_masked_area;
    }

    // -----------------------------------------------------------------------
    // Stage and bounding box
    // -----------------------------------------------------------------------

    /// Resize the stage, shrinking the bounding box to fit it on the grid.
    pub fn set_stage_dimensions(&mut self, dimensions: Dimensions) {
        self.stage_dimensions = dimensions;

        let fit = |edge: f32, stage_edge: f32, scale: f32| {
            round_down_to_multiple(clamp(edge, GRID_SIZE, stage_edge / scale), GRID_SIZE)
        };
        let current = self.bounding_box_dimensions;
        self.bounding_box_dimensions = Dimensions::new(
            fit(current.width, dimensions.width, self.stage_scale),
            fit(current.height, dimensions.height, self.stage_scale),
        );
    }

    /// Move the stage to whole-unit coordinates.
    pub fn set_stage_coordinates(&mut self, coordinates: Vector2d) {
        self.stage_coordinates = floor_coordinates(coordinates);
    }

    /// Move the bounding box to whole-unit coordinates.
    pub fn set_bounding_box_coordinates(&mut self, coordinates: Vector2d) {
        self.bounding_box_coordinates = floor_coordinates(coordinates);
    }

    /// Match the stage to its container.
    pub fn resize_canvas(&mut self) {
        let container = self.canvas_container_dimensions;
        self.stage_dimensions = Dimensions::new(container.width.floor(), container.height.floor());
    }

    fn fit_padding(&self) -> f32 {
        if self.should_lock_to_initial_image {
            1.0
        } else {
            FIT_PADDING
        }
    }

    /// Fit the stage around the base image. No-op without one.
    pub fn resize_and_scale_canvas(&mut self) {
        let Some(base) = self.layer_state.base_image() else {
            tracing::trace!("resize_and_scale_canvas without base image; ignoring");
            return;
        };
        let image_size = base.bounds.dimensions();
        let container = self.canvas_container_dimensions;

        let scale = calculate_scale(container, image_size, self.fit_padding());
        let dimensions = if self.should_lock_to_initial_image {
            Dimensions::new(
                (image_size.width * scale).floor(),
                (image_size.height * scale).floor(),
            )
        } else {
            Dimensions::new(container.width.floor(), container.height.floor())
        };
        let coordinates = calculate_coordinates(
            dimensions,
            Rect::new(0.0, 0.0, image_size.width, image_size.height),
            scale,
        );

        self.stage_scale = scale;
        self.minimum_stage_scale = scale;
        self.stage_coordinates = coordinates;
        self.stage_dimensions = dimensions;
        self.is_canvas_initialized = true;
    }

    /// Zoom and pan so `content_rect` fills the stage. No-op without a base
    /// image.
    pub fn reset_canvas_view(&mut self, content_rect: Rect) {
        if self.layer_state.base_image().is_none() {
            tracing::trace!("reset_canvas_view without base image; ignoring");
            return;
        }
        let scale = calculate_scale(
            self.stage_dimensions,
            content_rect.dimensions(),
            self.fit_padding(),
        );
        self.stage_scale = scale;
        self.stage_coordinates = calculate_coordinates(self.stage_dimensions, content_rect, scale);
    }

    /// Pull an out-of-stage bounding box back to a default size, centred.
    pub fn fit_bounding_box_to_stage(&mut self) {
        let stage = self.stage_dimensions;
        let origin = self.bounding_box_coordinates;
        let size = self.bounding_box_dimensions;

        let escapes = origin.x < 0.0
            || origin.x + size.width > stage.width
            || origin.y < 0.0
            || origin.y + size.height > stage.height;
        if !escapes {
            return;
        }

        let fitted = Dimensions::new(default_box_edge(stage.width), default_box_edge(stage.height));
        self.bounding_box_dimensions = fitted;
        self.bounding_box_coordinates = Vector2d::new(
            centered_box_offset(stage.width, fitted.width),
            centered_box_offset(stage.height, fitted.height),
        );
    }

    // -----------------------------------------------------------------------
    // Flags
    // -----------------------------------------------------------------------

    /// Set a display preference.
    pub fn set_display_flag(&mut self, flag: DisplayFlag, value: bool) {
        *self.display.flag_mut(flag) = value;
    }

    /// Flip a display preference.
    pub fn toggle_display_flag(&mut self, flag: DisplayFlag) {
        let slot = self.display.flag_mut(flag);
        *slot = !*slot;
    }

    /// Set a pointer-interaction flag.
    pub fn set_interaction_flag(&mut self, flag: InteractionFlag, value: bool) {
        *self.interaction.flag_mut(flag) = value;
    }
}
