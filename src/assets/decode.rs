use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{OverlayerError, OverlayerResult};

/// Decoded image ready to be painted.
///
/// The pixmap holds premultiplied RGBA8 at the image's natural size. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl Bitmap {
    /// Build a bitmap from tightly packed premultiplied RGBA8 bytes.
    pub fn from_premul_rgba8(bytes: &[u8], width: u32, height: u32) -> OverlayerResult<Self> {
        let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
        Ok(Self {
            width,
            height,
            pixmap: Arc::new(pixmap),
        })
    }

    /// Natural width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Natural height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    #[cfg(test)]
    pub(crate) fn premul_bytes(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

/// Decode raster (PNG, JPEG, ...) or SVG bytes into a [`Bitmap`].
///
/// SVG documents are rasterized once at their intrinsic size so they behave like any other
/// sticker under the overlay transform.
pub fn decode_bitmap(bytes: &[u8]) -> OverlayerResult<Bitmap> {
    if looks_like_svg(bytes) {
        let tree = parse_svg(bytes)?;
        let (w, h) = svg_intrinsic_size(&tree)?;
        let rgba = rasterize_svg(&tree, w, h)?;
        return Bitmap::from_premul_rgba8(&rgba, w, h);
    }

    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| OverlayerError::decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Bitmap::from_premul_rgba8(&rgba8_premul, width, height)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let trimmed = head.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && head.contains("<svg"))
}

fn parse_svg(bytes: &[u8]) -> OverlayerResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| OverlayerError::decode(format!("parse svg tree: {e}")))
}

fn svg_intrinsic_size(tree: &usvg::Tree) -> OverlayerResult<(u32, u32)> {
    fn to_px(v: f32) -> OverlayerResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(OverlayerError::decode("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let w = to_px(size.width())?;
    let h = to_px(size.height())?;

    const MAX_DIM: u32 = u16::MAX as u32;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(OverlayerError::decode(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> OverlayerResult<Vec<u8>> {
    let mut canvas = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| OverlayerError::decode(format!("no room for a {width}x{height} sticker")))?;
    let size = tree.size();
    let fit = resvg::tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(tree, fit, &mut canvas.as_mut());
    Ok(canvas.take())
}

/// Convert straight-alpha RGBA8 to premultiplied, rounding to nearest.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let alpha = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * alpha + 127) / 255) as u8;
        }
    }
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> OverlayerResult<vello_cpu::Pixmap> {
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(OverlayerError::decode(format!(
            "{width}x{height} bitmap is larger than a surface can hold"
        )));
    };
    if w == 0 || h == 0 {
        return Err(OverlayerError::decode("empty bitmap"));
    }
    let expected = usize::from(w) * usize::from(h) * 4;
    if bytes.len() != expected {
        return Err(OverlayerError::decode(format!(
            "expected {expected} bytes for {w}x{h}, got {}",
            bytes.len()
        )));
    }

    let translucent = bytes.chunks_exact(4).any(|px| px[3] < 255);
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        translucent,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
