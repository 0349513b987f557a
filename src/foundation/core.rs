use crate::foundation::error::{OverlayerError, OverlayerResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Straight-alpha RGBA8 color used by the render palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied channel bytes `[r*a, g*a, b*a, a]`.
    pub fn to_premul_array(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

/// Square drawing surface: logical edge length plus device pixel density.
///
/// All drawing coordinates are logical; the backing pixel buffer is `size * dpr` on each axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Logical width and height (the surface is always square).
    pub size: f64,
    /// Device pixels per logical pixel.
    pub dpr: f64,
}

impl Viewport {
    /// Create a validated viewport.
    pub fn new(size: f64, dpr: f64) -> OverlayerResult<Self> {
        if !size.is_finite() || size <= 0.0 {
            return Err(OverlayerError::validation(
                "viewport size must be finite and > 0",
            ));
        }
        if !dpr.is_finite() || dpr <= 0.0 {
            return Err(OverlayerError::validation(
                "device pixel ratio must be finite and > 0",
            ));
        }
        Ok(Self { size, dpr })
    }

    /// Logical width.
    pub fn width(self) -> f64 {
        self.size
    }

    /// Logical height.
    pub fn height(self) -> f64 {
        self.size
    }

    /// Logical bounds `(0, 0, size, size)`.
    pub fn logical_rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.size, self.size)
    }

    /// Backing pixel buffer dimensions.
    pub fn pixel_size(self) -> OverlayerResult<(u16, u16)> {
        let px = (self.size * self.dpr).round();
        if !(1.0..=f64::from(u16::MAX)).contains(&px) {
            return Err(OverlayerError::render(format!(
                "surface pixel size {px} out of range (1..={})",
                u16::MAX
            )));
        }
        let px = px as u16;
        Ok((px, px))
    }

    /// Transform mapping logical coordinates to device pixels.
    pub fn device_transform(self) -> Affine {
        Affine::scale(self.dpr)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
