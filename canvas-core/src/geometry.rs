//! Geometric primitives and viewport fitting helpers.
//!
//! Canvas sizing snaps to a 64-unit grid; see [`GRID_SIZE`].

use serde::{Deserialize, Serialize};

/// Grid unit that bounding box sizes and positions snap to.
pub const GRID_SIZE: f32 = 64.0;

/// Largest default bounding box edge.
pub const MAX_DEFAULT_BOX_SIZE: f32 = 512.0;

/// Padding factor used when fitting content that is not locked to the
/// initial image.
pub const FIT_PADDING: f32 = 0.95;

/// A 2D point or offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2d {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Vector2d {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in canvas units.
    pub width: f32,
    /// Height in canvas units.
    pub height: f32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Width and height.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// An RGBA color with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbaColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha (0.0 to 1.0).
    pub a: f32,
}

impl RgbaColor {
    /// Create a new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Round `value` to the nearest multiple of `multiple`.
///
/// Halfway cases round towards positive infinity.
#[must_use]
pub fn round_to_multiple(value: f32, multiple: f32) -> f32 {
    (value / multiple + 0.5).floor() * multiple
}

/// Round `value` down to a multiple of `multiple`.
#[must_use]
pub fn round_down_to_multiple(value: f32, multiple: f32) -> f32 {
    (value / multiple).floor() * multiple
}

/// Clamp `value` into `[lower, upper]`.
///
/// Unlike [`f32::clamp`] this never panics: when `upper < lower` the lower
/// bound wins.
#[must_use]
pub fn clamp(value: f32, lower: f32, upper: f32) -> f32 {
    value.min(upper).max(lower)
}

/// Floor both coordinates.
#[must_use]
pub fn floor_coordinates(coordinates: Vector2d) -> Vector2d {
    Vector2d::new(coordinates.x.floor(), coordinates.y.floor())
}

/// Scale that fits content into a container, never enlarging past 1.0.
///
/// Degenerate results (zero or non-finite) fall back to 1.0.
#[must_use]
pub fn calculate_scale(container: Dimensions, content: Dimensions, padding: f32) -> f32 {
    let scale_x = container.width * padding / content.width;
    let scale_y = container.height * padding / content.height;
    let scale = 1.0_f32.min(scale_x.min(scale_y));
    if scale.abs() < f32::EPSILON || !scale.is_finite() {
        1.0
    } else {
        scale
    }
}

/// Stage offset that centres `content` (scaled by `scale`) within `container`.
#[must_use]
pub fn calculate_coordinates(container: Dimensions, content: Rect, scale: f32) -> Vector2d {
    Vector2d::new(
        ((container.width - content.width * scale) / 2.0 - content.x * scale).floor(),
        ((container.height - content.height * scale) / 2.0 - content.y * scale).floor(),
    )
}

/// Default bounding box size for a stage or image edge: clamped to
/// `[64, 512]` and rounded down to the grid.
#[must_use]
pub fn default_box_edge(edge: f32) -> f32 {
    round_down_to_multiple(clamp(edge, GRID_SIZE, MAX_DEFAULT_BOX_SIZE), GRID_SIZE)
}

/// Grid-snapped offset that centres a box edge within a container edge.
#[must_use]
pub fn centered_box_offset(container_edge: f32, box_edge: f32) -> f32 {
    round_to_multiple(container_edge / 2.0 - box_edge / 2.0, GRID_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_round_to_multiple() {
        assert!(approx(round_to_multiple(95.0, 64.0), 64.0));
        assert!(approx(round_to_multiple(96.0, 64.0), 128.0));
        assert!(approx(round_to_multiple(-20.0, 64.0), 0.0));
        assert!(approx(round_to_multiple(-40.0, 64.0), -64.0));
    }

    #[test]
    fn test_round_down_to_multiple() {
        assert!(approx(round_down_to_multiple(127.0, 64.0), 64.0));
        assert!(approx(round_down_to_multiple(128.0, 64.0), 128.0));
        assert!(approx(round_down_to_multiple(-1.0, 64.0), -64.0));
    }

    #[test]
    fn test_clamp_inverted_bounds_prefers_lower() {
        assert!(approx(clamp(100.0, 64.0, 32.0), 64.0));
        assert!(approx(clamp(10.0, 64.0, 512.0), 64.0));
        assert!(approx(clamp(1000.0, 64.0, 512.0), 512.0));
    }

    #[test]
    fn test_default_box_edge() {
        assert!(approx(default_box_edge(1000.0), 512.0));
        assert!(approx(default_box_edge(300.0), 256.0));
        assert!(approx(default_box_edge(10.0), 64.0));
    }

    #[test]
    fn test_centered_box_offset() {
        // 800/2 - 512/2 = 144 -> nearest multiple of 64 is 128
        assert!(approx(centered_box_offset(800.0, 512.0), 128.0));
        assert!(approx(centered_box_offset(512.0, 512.0), 0.0));
    }

    #[test]
    fn test_floor_coordinates() {
        let v = floor_coordinates(Vector2d::new(1.9, -0.5));
        assert!(approx(v.x, 1.0));
        assert!(approx(v.y, -1.0));
    }

    #[test]
    fn test_calculate_scale_shrinks_large_content() {
        let scale = calculate_scale(
            Dimensions::new(500.0, 500.0),
            Dimensions::new(1000.0, 2000.0),
            1.0,
        );
        assert!(approx(scale, 0.25));
    }

    #[test]
    fn test_calculate_scale_never_enlarges() {
        let scale = calculate_scale(
            Dimensions::new(2000.0, 2000.0),
            Dimensions::new(100.0, 100.0),
            FIT_PADDING,
        );
        assert!(approx(scale, 1.0));
    }

    #[test]
    fn test_calculate_scale_degenerate_falls_back() {
        let zero_container = calculate_scale(
            Dimensions::new(0.0, 0.0),
            Dimensions::new(100.0, 100.0),
            FIT_PADDING,
        );
        assert!(approx(zero_container, 1.0));

        let zero_content =
            calculate_scale(Dimensions::new(0.0, 0.0), Dimensions::new(0.0, 0.0), 1.0);
        assert!(approx(zero_content, 1.0));
    }

    #[test]
    fn test_calculate_coordinates_centres_content() {
        let coords = calculate_coordinates(
            Dimensions::new(800.0, 600.0),
            Rect::new(0.0, 0.0, 400.0, 400.0),
            1.0,
        );
        assert!(approx(coords.x, 200.0));
        assert!(approx(coords.y, 100.0));

        let offset = calculate_coordinates(
            Dimensions::new(800.0, 600.0),
            Rect::new(100.0, 50.0, 400.0, 400.0),
            0.5,
        );
        assert!(approx(offset.x, 250.0));
        assert!(approx(offset.y, 175.0));
    }
}
