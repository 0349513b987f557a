use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{OverlayerError, OverlayerResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayoutKey {
    text: String,
    size_bits: u32,
    brush: TextBrushRgba8,
}

/// Shaped single-line label ready to be drawn.
pub(crate) struct ShapedText {
    pub(crate) layout: Arc<parley::Layout<TextBrushRgba8>>,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl ShapedText {
    pub(crate) fn width(&self) -> f64 {
        f64::from(self.layout.width())
    }

    pub(crate) fn height(&self) -> f64 {
        f64::from(self.layout.height())
    }
}

struct LoadedFont {
    family_name: String,
    data: vello_cpu::peniko::FontData,
}

/// Shapes labels with one fixed display font.
///
/// Without a font, text is silently skipped: the overlay stays in the collection and remains
/// selectable, only its glyphs are missing from the frame.
pub struct TextPainter {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    font: Option<LoadedFont>,
    layouts: HashMap<LayoutKey, Arc<parley::Layout<TextBrushRgba8>>>,
}

impl Default for TextPainter {
    fn default() -> Self {
        Self::without_font()
    }
}

impl TextPainter {
    /// Painter that draws no glyphs.
    pub fn without_font() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            font: None,
            layouts: HashMap::new(),
        }
    }

    /// Painter using the font contained in `font_bytes`.
    pub fn with_font_bytes(font_bytes: Vec<u8>) -> OverlayerResult<Self> {
        let mut out = Self::without_font();

        let families = out.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font_bytes.clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            OverlayerError::validation("no font families registered from font bytes")
        })?;
        let family_name = out
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| OverlayerError::validation("registered font family has no name"))?
            .to_string();

        out.font = Some(LoadedFont {
            family_name,
            data: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
        });
        Ok(out)
    }

    /// Painter using the font file at `path`.
    pub fn from_font_path(path: impl AsRef<Path>) -> OverlayerResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            OverlayerError::validation(format!("read font '{}': {e}", path.display()))
        })?;
        Self::with_font_bytes(bytes)
    }

    /// Whether a font is loaded.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Shape `text` at `size_px`, reusing an earlier layout for identical input.
    pub(crate) fn shape(
        &mut self,
        text: &str,
        size_px: f32,
        color: Rgba8,
    ) -> OverlayerResult<Option<ShapedText>> {
        let Some(font) = &self.font else {
            return Ok(None);
        };
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(OverlayerError::render("text size must be finite and > 0"));
        }

        let key = LayoutKey {
            text: text.to_string(),
            size_bits: size_px.to_bits(),
            brush: color.into(),
        };
        if let Some(layout) = self.layouts.get(&key) {
            return Ok(Some(ShapedText {
                layout: Arc::clone(layout),
                font: font.data.clone(),
            }));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(font.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(key.brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let layout = Arc::new(layout);
        self.layouts.insert(key, Arc::clone(&layout));
        Ok(Some(ShapedText {
            layout,
            font: font.data.clone(),
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
