use crate::foundation::core::Viewport;
use crate::foundation::error::OverlayerResult;

/// Smallest logical edge of the drawing surface.
pub const MIN_VIEWPORT: f64 = 320.0;
/// Largest logical edge of the drawing surface.
pub const MAX_VIEWPORT: f64 = 900.0;

/// Logical edge length of the square surface for an available layout width.
///
/// NaN (an unmeasured layout) falls back to the minimum; infinities clamp like any other width.
pub fn viewport_size(layout_width: f64) -> f64 {
    if layout_width.is_nan() {
        return MIN_VIEWPORT;
    }
    layout_width.clamp(MIN_VIEWPORT, MAX_VIEWPORT)
}

/// Viewport for a layout width and device pixel ratio.
pub fn viewport_for(layout_width: f64, dpr: f64) -> OverlayerResult<Viewport> {
    Viewport::new(viewport_size(layout_width), dpr)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/viewport.rs"]
mod tests;
