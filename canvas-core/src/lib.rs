//! # Studio Canvas Core
//!
//! Layered canvas state for an image-generation studio: strokes and images
//! on a base and a mask layer, a staging area for generated candidates, and
//! bounded undo/redo over both.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               CanvasStore                   │
//! │  session id -> CanvasState, JSON on disk    │
//! ├─────────────────────────────────────────────┤
//! │  CanvasState                                │
//! │  - LayerState (objects + staging area)      │
//! │  - History (bounded past / future)          │
//! │  - Tool, colors, stage, bounding box        │
//! ├─────────────────────────────────────────────┤
//! │  CanvasAction  ->  CanvasState::apply       │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod config;
pub mod error;
pub mod geometry;
pub mod history;
pub mod layer;
pub mod schema;
pub mod state;
pub mod store;

pub use action::{reduce, CanvasAction};
pub use config::CanvasConfig;
pub use error::{CanvasError, CanvasResult};
pub use geometry::{Dimensions, Rect, RgbaColor, Vector2d};
pub use history::{History, DEFAULT_MAX_HISTORY};
pub use layer::{
    CanvasImage, CanvasLine, ImageRef, Layer, LayerObject, LayerState, StagingArea, Tool,
};
pub use schema::{CanvasDocument, CanvasSummary};
pub use state::{CanvasState, DisplayFlag, DisplayOptions, Interaction, InteractionFlag};
pub use store::{CanvasStore, StoreError};

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
