use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::OverlayerResult;
use crate::model::overlay::{OverlayItem, find, with_updated};

/// Largest anchor distance, in logical pixels, that still selects an overlay.
pub const HIT_RADIUS: f64 = 120.0;
/// Lower bound for scales produced by wheel zoom.
pub const MIN_SCALE: f64 = 0.2;
/// Upper bound for scales produced by wheel zoom.
pub const MAX_SCALE: f64 = 4.0;
/// Scale factor of one wheel tick away from the user.
pub const ZOOM_OUT_FACTOR: f64 = 0.92;
/// Scale factor of one wheel tick towards the user.
pub const ZOOM_IN_FACTOR: f64 = 1.08;
/// Rotation of one modifier-held wheel tick, radians.
pub const ROTATE_STEP: f64 = 0.08;

/// Pointer press, move or release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Position in device (client) coordinates.
    pub position: Point,
    /// Platform pointer id, forwarded to capture hints.
    pub pointer_id: u64,
}

impl PointerEvent {
    /// Event for the primary pointer.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            pointer_id: 0,
        }
    }
}

/// One wheel tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelEvent {
    /// Vertical delta; positive is away from the user. Only the sign is used, and anything not
    /// positive zooms in.
    pub delta_y: f64,
    /// Rotate instead of scale.
    pub modifier: bool,
}

/// Result of a wheel tick.
#[derive(Clone, Debug, PartialEq)]
pub struct WheelOutcome {
    /// Whether the host must suppress the default page scroll.
    pub prevent_default: bool,
    /// Next overlay collection, when something changed.
    pub next: Option<Vec<OverlayItem>>,
}

/// Host hook for keeping pointer events flowing while the pointer leaves the surface.
pub trait PointerCapture {
    /// Ask the host to route `pointer_id` to the surface.
    fn capture(&mut self, pointer_id: u64);
    /// Stop routing `pointer_id`. Failures are tolerated by the caller.
    fn release(&mut self, pointer_id: u64) -> OverlayerResult<()>;
}

/// Capture hook for hosts without pointer capture.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn capture(&mut self, _pointer_id: u64) {}

    fn release(&mut self, _pointer_id: u64) -> OverlayerResult<()> {
        Ok(())
    }
}

/// Controller state.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    /// No drag in progress.
    #[default]
    Idle,
    /// Dragging `id`; the anchor follows the pointer minus `grab_offset`.
    Dragging {
        /// Dragged overlay.
        id: String,
        /// Pointer position minus anchor, fixed at drag start.
        grab_offset: Vec2,
    },
}

/// Overlay nearest to `p` by anchor distance, if within [`HIT_RADIUS`].
///
/// Visual bounds are ignored. On equal distances the earlier (lower) overlay wins.
pub fn hit_test(overlays: &[OverlayItem], p: Point) -> Option<&OverlayItem> {
    let mut best: Option<(&OverlayItem, f64)> = None;
    for item in overlays {
        let d = item.position.distance(p);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((item, d));
        }
    }
    best.filter(|(_, d)| *d <= HIT_RADIUS).map(|(item, _)| item)
}

/// Translates pointer and wheel input into overlay-collection updates.
///
/// The controller never mutates a collection in place: every change is returned as a complete
/// next collection for the owner to adopt. It holds only the selection and the drag state.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
    selected: Option<String>,
    surface_origin: Point,
}

impl InteractionController {
    /// Idle controller with the surface at the device origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Device position of the surface's top-left corner.
    pub fn set_surface_origin(&mut self, origin: Point) {
        self.surface_origin = origin;
    }

    /// Selected overlay id.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Current state.
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Drop the selection and any drag.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.state = InteractionState::Idle;
    }

    /// Drop a selection or drag that refers to an overlay no longer in `overlays`.
    pub fn prune_selection(&mut self, overlays: &[OverlayItem]) {
        if let Some(id) = &self.selected
            && find(overlays, id).is_none()
        {
            tracing::debug!(%id, "selected overlay removed; clearing selection");
            self.clear_selection();
        }
    }

    fn to_surface(&self, device: Point) -> Point {
        device - self.surface_origin.to_vec2()
    }

    /// Select the overlay under the pointer and start dragging it.
    ///
    /// Returns the new selection.
    pub fn pointer_down(
        &mut self,
        ev: PointerEvent,
        overlays: &[OverlayItem],
        capture: &mut dyn PointerCapture,
    ) -> Option<&str> {
        let p = self.to_surface(ev.position);
        match hit_test(overlays, p) {
            Some(item) => {
                let grab_offset = item.offset_to(p);
                tracing::trace!(id = %item.id, ?grab_offset, "drag start");
                self.selected = Some(item.id.clone());
                self.state = InteractionState::Dragging {
                    id: item.id.clone(),
                    grab_offset,
                };
                capture.capture(ev.pointer_id);
            }
            None => {
                self.selected = None;
                self.state = InteractionState::Idle;
            }
        }
        self.selected()
    }

    /// Move the dragged overlay so the initial grab point stays under the pointer.
    ///
    /// Returns the next collection, or `None` when idle or the dragged overlay is gone.
    pub fn pointer_move(
        &mut self,
        ev: PointerEvent,
        overlays: &[OverlayItem],
    ) -> Option<Vec<OverlayItem>> {
        let InteractionState::Dragging { id, grab_offset } = &self.state else {
            return None;
        };
        let position = self.to_surface(ev.position) - *grab_offset;
        with_updated(overlays, id, |o| o.position = position)
    }

    /// End any drag and release pointer capture; release failures are ignored.
    pub fn pointer_up(&mut self, ev: PointerEvent, capture: &mut dyn PointerCapture) {
        self.state = InteractionState::Idle;
        if let Err(e) = capture.release(ev.pointer_id) {
            tracing::trace!(pointer_id = ev.pointer_id, "pointer capture release failed: {e}");
        }
    }

    /// Scale (or, with the modifier, rotate) the selected overlay.
    pub fn wheel(&mut self, ev: WheelEvent, overlays: &[OverlayItem]) -> WheelOutcome {
        let Some(id) = self.selected.as_deref() else {
            return WheelOutcome {
                prevent_default: false,
                next: None,
            };
        };

        // A zero delta has direction 0: no rotation, but it takes the zoom-in factor.
        let direction = if ev.delta_y > 0.0 {
            1.0
        } else if ev.delta_y < 0.0 {
            -1.0
        } else {
            0.0
        };

        let next = if ev.modifier {
            with_updated(overlays, id, |o| o.rotation += direction * ROTATE_STEP)
        } else {
            let factor = if direction > 0.0 {
                ZOOM_OUT_FACTOR
            } else {
                ZOOM_IN_FACTOR
            };
            with_updated(overlays, id, |o| {
                o.scale = (o.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
            })
        };
        WheelOutcome {
            prevent_default: true,
            next,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/controller.rs"]
mod tests;
