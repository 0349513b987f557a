//! Overlayer composes a base photograph with interactively placed overlays (bitmap stickers and
//! short text labels) onto a square CPU raster surface.
//!
//! The engine is split along the data flow of one editing loop:
//!
//! - [`layout`] derives the square drawing-surface size from the available layout width
//! - [`assets`] resolves resource identifiers to decoded bitmaps out-of-band
//! - [`render`] turns (base, overlays, bitmaps, selection, viewport) into a frame
//! - [`interact`] turns pointer and wheel input into the next overlay collection
//! - [`session`] ties the above together as a reference owner of the overlay collection
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Image resource resolution, decoding and the resolved-bitmap cache.
pub mod assets;
/// Pointer and wheel manipulation of overlays.
pub mod interact;
/// Drawing-surface sizing.
pub mod layout;
/// Overlay data model and the JSON scene document.
pub mod model;
/// Frame planning and CPU rasterization.
pub mod render;
/// Reference controller owning the overlay collection.
pub mod session;

pub use crate::foundation::core::{Affine, Point, Rect, Rgba8, Vec2, Viewport};
pub use crate::foundation::error::{OverlayerError, OverlayerResult};

pub use crate::assets::cache::ImageResourceCache;
pub use crate::assets::decode::Bitmap;
pub use crate::assets::executor::{DecodeExecutor, DecodeJob, InlineExecutor, RayonExecutor};
pub use crate::assets::source::{FsResourceLoader, ResourceLoader};
pub use crate::interact::controller::{
    HIT_RADIUS, InteractionController, InteractionState, NoCapture, PointerCapture, PointerEvent,
    WheelEvent, WheelOutcome, hit_test,
};
pub use crate::layout::viewport::{MAX_VIEWPORT, MIN_VIEWPORT, viewport_for, viewport_size};
pub use crate::model::overlay::{OverlayItem, OverlayKind};
pub use crate::model::scene::{InteractionEvent, SceneDoc};
pub use crate::render::cpu::CpuRenderer;
pub use crate::render::plan::{CoverFit, DrawOp, FrameInput, RenderStyle, cover_fit, plan_frame};
pub use crate::render::surface::FrameRGBA;
pub use crate::render::text::TextPainter;
pub use crate::session::editor::{EditorOpts, EditorSession};
