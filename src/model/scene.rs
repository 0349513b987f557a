use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::model::overlay::OverlayItem;

/// Recorded input event, replayed through the interaction controller.
///
/// Coordinates are relative to the drawing surface origin.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionEvent {
    /// Pointer pressed.
    PointerDown {
        /// Surface-relative x.
        x: f64,
        /// Surface-relative y.
        y: f64,
    },
    /// Pointer moved.
    PointerMove {
        /// Surface-relative x.
        x: f64,
        /// Surface-relative y.
        y: f64,
    },
    /// Pointer released.
    PointerUp,
    /// Wheel tick.
    Wheel {
        /// Vertical delta; only its sign is used.
        delta_y: f64,
        /// Whether the rotate modifier is held.
        #[serde(default)]
        modifier: bool,
    },
}

/// JSON-facing scene: base photo, overlays and an optional interaction script.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDoc {
    /// Base photo resource identifier; absent means no photo loaded.
    #[serde(default)]
    pub base: Option<String>,
    /// Available layout width in logical pixels.
    #[serde(default)]
    pub layout_width: Option<f64>,
    /// Device pixel ratio.
    #[serde(default)]
    pub dpr: Option<f64>,
    /// Overlays in paint order.
    #[serde(default)]
    pub overlays: Vec<OverlayItem>,
    /// Input events replayed after decodes settle.
    #[serde(default)]
    pub interactions: Vec<InteractionEvent>,
}

impl SceneDoc {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> OverlayerResult<Self> {
        let doc: SceneDoc = serde_json::from_reader(r)
            .map_err(|e| OverlayerError::serde(format!("parse scene JSON: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> OverlayerResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            OverlayerError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check the invariants a loaded document must hold before it reaches the engine.
    pub fn validate(&self) -> OverlayerResult<()> {
        let mut seen = HashSet::with_capacity(self.overlays.len());
        for o in &self.overlays {
            if !seen.insert(o.id.as_str()) {
                return Err(OverlayerError::validation(format!(
                    "duplicate overlay id '{}'",
                    o.id
                )));
            }
        }
        if let Some(w) = self.layout_width
            && !w.is_finite()
        {
            return Err(OverlayerError::validation("layout_width must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/scene.rs"]
mod tests;
