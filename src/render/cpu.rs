use crate::foundation::core::{Affine, Rect, Rgba8, Viewport};
use crate::foundation::error::OverlayerResult;
use crate::render::plan::{DrawOp, FrameInput, RenderStyle, plan_frame};
use crate::render::surface::FrameRGBA;
use crate::render::text::{ShapedText, TextPainter};

/// CPU renderer powered by `vello_cpu`.
///
/// Every call repaints the whole frame. The render context is reused across frames of the same
/// pixel size.
pub struct CpuRenderer {
    style: RenderStyle,
    text: TextPainter,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuRenderer {
    /// Renderer with the given palette and text painter.
    pub fn new(style: RenderStyle, text: TextPainter) -> Self {
        Self {
            style,
            text,
            ctx: None,
        }
    }

    /// Active palette.
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Plan and rasterize one frame.
    #[tracing::instrument(level = "debug", skip_all, fields(overlays = input.overlays.len(), size = input.viewport.size))]
    pub fn render(&mut self, input: &FrameInput<'_>) -> OverlayerResult<FrameRGBA> {
        let (w, h) = input.viewport.pixel_size()?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let ops = plan_frame(input, &self.style);
        let device = input.viewport.device_transform();
        for op in &ops {
            exec_op(&mut ctx, &mut self.text, op, device, input.viewport)?;
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: u32::from(w),
            height: u32::from(h),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn exec_op(
    ctx: &mut vello_cpu::RenderContext,
    text: &mut TextPainter,
    op: &DrawOp<'_>,
    device: Affine,
    viewport: Viewport,
) -> OverlayerResult<()> {
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::Fill { color } => {
            ctx.set_transform(affine_to_cpu(device));
            ctx.set_paint(color_to_cpu(*color));
            ctx.fill_rect(&rect_to_cpu(viewport.logical_rect()));
        }
        DrawOp::Base { bitmap, fit } => {
            ctx.set_transform(affine_to_cpu(device * fit.transform()));
            ctx.set_paint(bitmap.paint());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(bitmap.width()),
                f64::from(bitmap.height()),
            ));
        }
        DrawOp::Label {
            text: label,
            origin,
            size,
            color,
        } => {
            if let Some(shaped) = text.shape(label, *size, *color)? {
                let tr = device * Affine::translate(origin.to_vec2());
                fill_text(ctx, &shaped, tr);
            }
        }
        DrawOp::OverlayImage {
            bitmap, transform, ..
        } => {
            let (w, h) = (f64::from(bitmap.width()), f64::from(bitmap.height()));
            let tr = device * *transform * Affine::translate((-w / 2.0, -h / 2.0));
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint(bitmap.paint());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        }
        DrawOp::OverlayText {
            id,
            text: label,
            size,
            color,
            transform,
        } => match text.shape(label, *size, *color)? {
            Some(shaped) => {
                let tr = device
                    * *transform
                    * Affine::translate((-shaped.width() / 2.0, -shaped.height() / 2.0));
                fill_text(ctx, &shaped, tr);
            }
            None => tracing::trace!(%id, "no display font loaded; skipping text glyphs"),
        },
        DrawOp::SelectionOutline {
            bounds,
            transform,
            color,
            width,
            ..
        } => {
            ctx.set_transform(affine_to_cpu(device * *transform));
            ctx.set_paint(color_to_cpu(*color));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
            ctx.stroke_rect(&rect_to_cpu(*bounds));
        }
    }
    Ok(())
}

fn fill_text(ctx: &mut vello_cpu::RenderContext, shaped: &ShapedText, tr: Affine) {
    ctx.set_transform(affine_to_cpu(tr));
    for line in shaped.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            // Layout-space positions: pen advance plus the line baseline.
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&shaped.font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
