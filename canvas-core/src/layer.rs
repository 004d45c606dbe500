//! Layer objects, the staging area, and the layer state snapshotted by history.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Dimensions, Rect, RgbaColor};

/// Drawing tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Paint strokes.
    #[default]
    Brush,
    /// Erase strokes.
    Eraser,
    /// Pan the stage or move the bounding box. Never draws.
    Move,
}

/// Drawing surface a layer object belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// The visible image layer.
    #[default]
    Base,
    /// The inpainting mask.
    Mask,
}

/// Reference to an image owned by the upload/generation subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Image identifier.
    pub uuid: Uuid,
    /// Where the image can be fetched from.
    pub url: String,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Opaque generation metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ImageRef {
    /// Create a reference with a fresh identifier.
    #[must_use]
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            url: url.into(),
            width,
            height,
            metadata: None,
        }
    }

    /// Image size in canvas units.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Image edges are far below f32's exact integer range
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width as f32, self.height as f32)
    }
}

/// A freehand stroke.
///
/// `points` holds interleaved `x, y` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasLine {
    /// Layer the stroke was drawn on.
    pub layer: Layer,
    /// Tool that drew the stroke.
    pub tool: Tool,
    /// Stroke width (half the brush or eraser size).
    pub stroke_width: f32,
    /// Interleaved `x, y` coordinates.
    pub points: Vec<f32>,
    /// Stroke color; only brush strokes on the base layer carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<RgbaColor>,
}

/// An image placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasImage {
    /// Layer the image belongs to.
    pub layer: Layer,
    /// Where the image renders.
    #[serde(flatten)]
    pub bounds: Rect,
    /// The image itself.
    pub image: ImageRef,
}

/// Anything drawn on a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayerObject {
    /// A stroke.
    Line(CanvasLine),
    /// A placed image.
    Image(CanvasImage),
}

impl LayerObject {
    /// Whether this is a stroke on the mask layer.
    #[must_use]
    pub fn is_mask_line(&self) -> bool {
        match self {
            Self::Line(line) => line.layer == Layer::Mask,
            Self::Image(_) => false,
        }
    }

    /// The image, if this is an image on the base layer.
    #[must_use]
    pub fn as_base_image(&self) -> Option<&CanvasImage> {
        match self {
            Self::Image(image) if image.layer == Layer::Base => Some(image),
            Self::Image(_) | Self::Line(_) => None,
        }
    }

    /// Layer this object belongs to.
    #[must_use]
    pub const fn layer(&self) -> Layer {
        match self {
            Self::Line(line) => line.layer,
            Self::Image(image) => image.layer,
        }
    }
}

/// Holding pen for generated candidates awaiting acceptance.
///
/// `selected_image_index` is `None` exactly when `images` is empty, and
/// otherwise a valid index into `images`. Deserialization restores that
/// invariant for documents that violate it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStagingArea")]
pub struct StagingArea {
    /// Where staged images render, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    /// Staged candidates in arrival order.
    images: Vec<CanvasImage>,
    /// Currently previewed candidate.
    selected_image_index: Option<usize>,
}

/// Wire form of [`StagingArea`], checked before use.
#[derive(Deserialize)]
struct RawStagingArea {
    #[serde(default)]
    bounds: Option<Rect>,
    #[serde(default)]
    images: Vec<CanvasImage>,
    #[serde(default)]
    selected_image_index: Option<usize>,
}

impl From<RawStagingArea> for StagingArea {
    fn from(raw: RawStagingArea) -> Self {
        // Out-of-range or missing selections fall back to the last candidate.
        let selected_image_index = raw
            .images
            .len()
            .checked_sub(1)
            .map(|last| raw.selected_image_index.map_or(last, |index| index.min(last)));
        Self {
            bounds: raw.bounds,
            images: raw.images,
            selected_image_index,
        }
    }
}

impl StagingArea {
    /// Staged candidates.
    #[must_use]
    pub fn images(&self) -> &[CanvasImage] {
        &self.images
    }

    /// Index of the previewed candidate.
    #[must_use]
    pub const fn selected_image_index(&self) -> Option<usize> {
        self.selected_image_index
    }

    /// The previewed candidate.
    #[must_use]
    pub fn selected_image(&self) -> Option<&CanvasImage> {
        self.selected_image_index.and_then(|i| self.images.get(i))
    }

    /// Whether nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Stage a candidate and select it.
    pub fn push(&mut self, image: CanvasImage) {
        self.images.push(image);
        self.selected_image_index = Some(self.images.len() - 1);
    }

    /// Select the next candidate, stopping at the last one.
    pub fn select_next(&mut self) {
        let Some(last) = self.images.len().checked_sub(1) else {
            self.selected_image_index = None;
            return;
        };
        if let Some(index) = self.selected_image_index {
            self.selected_image_index = Some(index.saturating_add(1).min(last));
        }
    }

    /// Select the previous candidate, stopping at the first one.
    pub fn select_prev(&mut self) {
        let Some(last) = self.images.len().checked_sub(1) else {
            self.selected_image_index = None;
            return;
        };
        if let Some(index) = self.selected_image_index {
            self.selected_image_index = Some(index.min(last).saturating_sub(1));
        }
    }

    /// Drop all candidates.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Objects on the canvas plus the staging area. The unit of undo/redo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerState {
    /// Drawn objects, oldest first.
    pub objects: Vec<LayerObject>,
    /// Generated candidates.
    pub staging_area: StagingArea,
}

impl LayerState {
    /// The most recently added stroke, on any layer.
    pub fn last_line_mut(&mut self) -> Option<&mut CanvasLine> {
        self.objects.iter_mut().rev().find_map(|object| match object {
            LayerObject::Line(line) => Some(line),
            LayerObject::Image(_) => None,
        })
    }

    /// The first image on the base layer.
    #[must_use]
    pub fn base_image(&self) -> Option<&CanvasImage> {
        self.objects.iter().find_map(LayerObject::as_base_image)
    }

    /// Remove every mask stroke, returning how many were removed.
    pub fn remove_mask_lines(&mut self) -> usize {
        let before = self.objects.len();
        self.objects.retain(|object| !object.is_mask_line());
        before - self.objects.len()
    }
}
