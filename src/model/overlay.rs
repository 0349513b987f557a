use crate::foundation::core::{Point, Vec2};

/// Kind-specific payload of an overlay.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Bitmap sticker resolved from a resource identifier.
    Image {
        /// Resource identifier (path, `file://` or `data:` URI).
        source: String,
    },
    /// Short text label.
    Text {
        /// Label content.
        text: String,
    },
}

/// One placed element.
///
/// `position` is the anchor: scale and rotation are applied about it, and hit-testing measures
/// distance to it. Collection order is paint order (index 0 is painted first, at the bottom).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayItem {
    /// Caller-assigned id, unique within the collection.
    pub id: String,
    /// Payload.
    pub kind: OverlayKind,
    /// Anchor in logical surface coordinates.
    pub position: Point,
    /// Uniform scale about the anchor.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Rotation about the anchor in radians; never normalized.
    #[serde(default)]
    pub rotation: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl OverlayItem {
    /// Image overlay with identity scale and rotation.
    pub fn image(id: impl Into<String>, source: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            kind: OverlayKind::Image {
                source: source.into(),
            },
            position,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    /// Text overlay with identity scale and rotation.
    pub fn text(id: impl Into<String>, text: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            kind: OverlayKind::Text { text: text.into() },
            position,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    /// Builder-style scale override.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Builder-style rotation override.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Resource identifier for image overlays.
    pub fn image_source(&self) -> Option<&str> {
        match &self.kind {
            OverlayKind::Image { source } => Some(source),
            OverlayKind::Text { .. } => None,
        }
    }

    /// Label content for text overlays.
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            OverlayKind::Text { text } => Some(text),
            OverlayKind::Image { .. } => None,
        }
    }

    /// Vector from the anchor to `p`.
    pub fn offset_to(&self, p: Point) -> Vec2 {
        p - self.position
    }
}

/// Find an overlay by id.
pub fn find<'a>(overlays: &'a [OverlayItem], id: &str) -> Option<&'a OverlayItem> {
    overlays.iter().find(|o| o.id == id)
}

/// Next collection with `f` applied to the overlay named `id`.
///
/// Order and every other overlay are preserved. Returns `None` when no overlay has that id, so
/// callers can skip handing back an unchanged collection.
pub fn with_updated(
    overlays: &[OverlayItem],
    id: &str,
    f: impl FnOnce(&mut OverlayItem),
) -> Option<Vec<OverlayItem>> {
    let idx = overlays.iter().position(|o| o.id == id)?;
    let mut next = overlays.to_vec();
    f(&mut next[idx]);
    Some(next)
}

/// Next collection with `item` appended on top.
pub fn appended(overlays: &[OverlayItem], item: OverlayItem) -> Vec<OverlayItem> {
    let mut next = Vec::with_capacity(overlays.len() + 1);
    next.extend_from_slice(overlays);
    next.push(item);
    next
}

/// Next collection with the topmost overlay removed.
pub fn without_last(overlays: &[OverlayItem]) -> Vec<OverlayItem> {
    let keep = overlays.len().saturating_sub(1);
    overlays[..keep].to_vec()
}

#[cfg(test)]
#[path = "../../tests/unit/model/overlay.rs"]
mod tests;
