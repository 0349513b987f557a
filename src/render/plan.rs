use std::collections::HashMap;

use crate::assets::decode::Bitmap;
use crate::foundation::core::{Affine, Point, Rect, Rgba8, Vec2, Viewport};
use crate::model::overlay::{OverlayItem, OverlayKind};

/// Palette and fixed metrics of a frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderStyle {
    /// Fill behind everything.
    pub background: Rgba8,
    /// Fill used when no base photo is resolved.
    pub placeholder: Rgba8,
    /// Instructional label drawn over the placeholder.
    pub placeholder_label: String,
    /// Top-left of the placeholder label, logical pixels.
    pub placeholder_label_origin: Point,
    /// Placeholder label font size.
    pub placeholder_label_size: f32,
    /// Placeholder label color.
    pub placeholder_label_color: Rgba8,
    /// Font size of text overlays before overlay scale.
    pub text_size: f32,
    /// Color of text overlays.
    pub text_color: Rgba8,
    /// Nominal local box outlined around a selected text overlay.
    pub text_box: (f64, f64),
    /// Selection outline color.
    pub outline_color: Rgba8,
    /// Selection outline width in local units.
    pub outline_width: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Rgba8::opaque(0x11, 0x11, 0x14),
            placeholder: Rgba8::opaque(0x26, 0x26, 0x2b),
            placeholder_label: "Choose a photo to start decorating".to_string(),
            placeholder_label_origin: Point::new(24.0, 24.0),
            placeholder_label_size: 18.0,
            placeholder_label_color: Rgba8::opaque(0xc8, 0xc8, 0xd0),
            text_size: 48.0,
            text_color: Rgba8::opaque(255, 255, 255),
            text_box: (240.0, 72.0),
            outline_color: Rgba8::new(255, 255, 255, 150),
            outline_width: 2.0,
        }
    }
}

/// Everything a frame is a function of.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    /// Resolved base photo.
    pub base: Option<&'a Bitmap>,
    /// Overlays in paint order.
    pub overlays: &'a [OverlayItem],
    /// Resolved overlay bitmaps keyed by overlay id.
    pub bitmaps: &'a HashMap<String, Bitmap>,
    /// Selected overlay id.
    pub selected: Option<&'a str>,
    /// Surface size and density.
    pub viewport: Viewport,
}

/// Cover-fit placement of a bitmap inside a target rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform scale `max(w / iw, h / ih)`.
    pub scale: f64,
    /// Top-left of the scaled bitmap, centered on the target.
    pub offset: Vec2,
    /// Scaled bitmap size.
    pub size: (f64, f64),
}

impl CoverFit {
    /// Transform mapping bitmap pixels to target coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Scaled bitmap bounds in target coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.offset.x + self.size.0,
            self.offset.y + self.size.1,
        )
    }
}

/// Scale a `(iw, ih)` bitmap to cover a `(w, h)` target without distortion, cropping the excess
/// equally on both sides of the longer axis.
pub fn cover_fit(iw: f64, ih: f64, w: f64, h: f64) -> CoverFit {
    let scale = (w / iw).max(h / ih);
    let size = (iw * scale, ih * scale);
    let offset = Vec2::new((w - size.0) / 2.0, (h - size.1) / 2.0);
    CoverFit {
        scale,
        offset,
        size,
    }
}

/// Local frame of an overlay: translate to the anchor, rotate, then scale uniformly.
///
/// Shapes are drawn centered on the local origin.
pub fn overlay_transform(item: &OverlayItem) -> Affine {
    Affine::translate(item.position.to_vec2())
        * Affine::rotate(item.rotation)
        * Affine::scale(item.scale)
}

/// One step of a frame, in paint order.
///
/// Transforms are absolute in logical coordinates; the executor prepends the device scale. No
/// op depends on state left behind by a previous op.
#[derive(Clone, Debug)]
pub enum DrawOp<'a> {
    /// Fill the whole viewport.
    Fill {
        /// Fill color.
        color: Rgba8,
    },
    /// Base photo under a cover-fit placement.
    Base {
        /// Photo bitmap.
        bitmap: &'a Bitmap,
        /// Placement.
        fit: CoverFit,
    },
    /// Untransformed label with its layout box's top-left at `origin`.
    Label {
        /// Label text.
        text: &'a str,
        /// Top-left position.
        origin: Point,
        /// Font size.
        size: f32,
        /// Text color.
        color: Rgba8,
    },
    /// Image overlay drawn centered on its local origin at natural size.
    OverlayImage {
        /// Overlay id.
        id: &'a str,
        /// Resolved bitmap.
        bitmap: &'a Bitmap,
        /// Overlay local frame.
        transform: Affine,
    },
    /// Text overlay centered on its local origin.
    OverlayText {
        /// Overlay id.
        id: &'a str,
        /// Label content.
        text: &'a str,
        /// Font size before overlay scale.
        size: f32,
        /// Text color.
        color: Rgba8,
        /// Overlay local frame.
        transform: Affine,
    },
    /// Outline framing the selected overlay's local bounds.
    SelectionOutline {
        /// Overlay id.
        id: &'a str,
        /// Local bounds, centered on the origin.
        bounds: Rect,
        /// Overlay local frame.
        transform: Affine,
        /// Stroke color.
        color: Rgba8,
        /// Stroke width in local units.
        width: f64,
    },
}

impl DrawOp<'_> {
    /// Overlay this op belongs to, if any.
    pub fn overlay_id(&self) -> Option<&str> {
        match self {
            DrawOp::OverlayImage { id, .. }
            | DrawOp::OverlayText { id, .. }
            | DrawOp::SelectionOutline { id, .. } => Some(*id),
            DrawOp::Fill { .. } | DrawOp::Base { .. } | DrawOp::Label { .. } => None,
        }
    }
}

/// Plan a full repaint of the frame described by `input`.
pub fn plan_frame<'a>(input: &FrameInput<'a>, style: &'a RenderStyle) -> Vec<DrawOp<'a>> {
    let vp = input.viewport;
    let mut ops = Vec::with_capacity(3 + input.overlays.len() * 2);

    ops.push(DrawOp::Fill {
        color: style.background,
    });

    match input.base {
        Some(bitmap) => ops.push(DrawOp::Base {
            bitmap,
            fit: cover_fit(
                f64::from(bitmap.width()),
                f64::from(bitmap.height()),
                vp.width(),
                vp.height(),
            ),
        }),
        None => {
            ops.push(DrawOp::Fill {
                color: style.placeholder,
            });
            ops.push(DrawOp::Label {
                text: &style.placeholder_label,
                origin: style.placeholder_label_origin,
                size: style.placeholder_label_size,
                color: style.placeholder_label_color,
            });
        }
    }

    for item in input.overlays {
        let transform = overlay_transform(item);
        let id = item.id.as_str();

        let bounds = match &item.kind {
            OverlayKind::Image { .. } => {
                // Unresolved (pending or failed) images draw nothing, outline included.
                let Some(bitmap) = input.bitmaps.get(id) else {
                    continue;
                };
                ops.push(DrawOp::OverlayImage {
                    id,
                    bitmap,
                    transform,
                });
                centered_rect(f64::from(bitmap.width()), f64::from(bitmap.height()))
            }
            OverlayKind::Text { text } => {
                ops.push(DrawOp::OverlayText {
                    id,
                    text,
                    size: style.text_size,
                    color: style.text_color,
                    transform,
                });
                centered_rect(style.text_box.0, style.text_box.1)
            }
        };

        if input.selected == Some(id) {
            ops.push(DrawOp::SelectionOutline {
                id,
                bounds,
                transform,
                color: style.outline_color,
                width: style.outline_width,
            });
        }
    }

    ops
}

fn centered_rect(w: f64, h: f64) -> Rect {
    Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0)
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
