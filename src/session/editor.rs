use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::assets::cache::ImageResourceCache;
use crate::assets::executor::{DecodeExecutor, RayonExecutor};
use crate::assets::source::FsResourceLoader;
use crate::foundation::core::{Point, Viewport};
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::interact::controller::{
    InteractionController, NoCapture, PointerCapture, PointerEvent, WheelEvent,
};
use crate::layout::viewport::{MAX_VIEWPORT, viewport_for};
use crate::model::overlay::{OverlayItem, appended, without_last};
use crate::render::cpu::CpuRenderer;
use crate::render::plan::{FrameInput, RenderStyle};
use crate::render::surface::FrameRGBA;
use crate::render::text::TextPainter;

/// Initial scale of image overlays created by [`EditorSession::add_image`].
pub const NEW_IMAGE_SCALE: f64 = 0.6;
/// Initial scale of text overlays created by [`EditorSession::add_text`].
pub const NEW_TEXT_SCALE: f64 = 1.0;

/// Options for an [`EditorSession`].
#[derive(Clone, Debug)]
pub struct EditorOpts {
    /// Directory relative resource paths are resolved against.
    pub assets_root: PathBuf,
    /// Decode pool size. `None` uses rayon's default.
    pub decode_threads: Option<usize>,
    /// Display font for text overlays and the placeholder label. Without one, no glyphs are drawn.
    pub font_path: Option<PathBuf>,
    /// Device pixels per logical pixel.
    pub device_pixel_ratio: f64,
    /// Palette and fixed metrics.
    pub style: RenderStyle,
}

impl Default for EditorOpts {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("."),
            decode_threads: None,
            font_path: None,
            device_pixel_ratio: 1.0,
            style: RenderStyle::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct FrameKey {
    overlays_revision: u64,
    cache_revision: u64,
    selected: Option<String>,
    viewport: Viewport,
}

/// Owner of one editing session's overlay collection.
///
/// Every change to the collection is adopted as a whole new collection with a fresh revision.
/// Adoption immediately re-syncs the resource cache, so decodes requested for an older revision
/// are superseded. Frames are memoized on the collection revision, the cache revision, the
/// selection and the viewport.
pub struct EditorSession {
    overlays: Vec<OverlayItem>,
    overlays_revision: u64,
    next_id: u64,

    layout_width: f64,
    dpr: f64,

    cache: ImageResourceCache,
    controller: InteractionController,
    capture: Box<dyn PointerCapture + Send>,

    renderer: CpuRenderer,
    memo: Option<(FrameKey, FrameRGBA)>,
}

impl EditorSession {
    /// Session decoding on a dedicated rayon pool.
    pub fn new(opts: EditorOpts) -> OverlayerResult<Self> {
        let executor = Arc::new(RayonExecutor::new(opts.decode_threads)?);
        Self::with_executor(opts, executor)
    }

    /// Session decoding through `executor`.
    pub fn with_executor(
        opts: EditorOpts,
        executor: Arc<dyn DecodeExecutor>,
    ) -> OverlayerResult<Self> {
        let layout_width = MAX_VIEWPORT;
        viewport_for(layout_width, opts.device_pixel_ratio)?;

        let text = match &opts.font_path {
            Some(path) => TextPainter::from_font_path(path)?,
            None => TextPainter::without_font(),
        };
        let loader = Arc::new(FsResourceLoader::new(opts.assets_root));

        Ok(Self {
            overlays: Vec::new(),
            overlays_revision: 0,
            next_id: 0,
            layout_width,
            dpr: opts.device_pixel_ratio,
            cache: ImageResourceCache::new(loader, executor),
            controller: InteractionController::new(),
            capture: Box::new(NoCapture),
            renderer: CpuRenderer::new(opts.style, text),
            memo: None,
        })
    }

    /// Route pointer-capture hints to the host.
    pub fn set_pointer_capture(&mut self, capture: Box<dyn PointerCapture + Send>) {
        self.capture = capture;
    }

    /// Current overlay collection in paint order.
    pub fn overlays(&self) -> &[OverlayItem] {
        &self.overlays
    }

    /// Revision of the current overlay collection.
    pub fn overlays_revision(&self) -> u64 {
        self.overlays_revision
    }

    /// Resource cache.
    pub fn cache(&self) -> &ImageResourceCache {
        &self.cache
    }

    /// Interaction controller.
    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Selected overlay id.
    pub fn selection(&self) -> Option<&str> {
        self.controller.selected()
    }

    /// Viewport for the current layout width and density.
    pub fn viewport(&self) -> OverlayerResult<Viewport> {
        viewport_for(self.layout_width, self.dpr)
    }

    /// Report the width available to the surface.
    pub fn set_layout_width(&mut self, layout_width: f64) {
        self.layout_width = layout_width;
    }

    /// Change the device pixel ratio.
    pub fn set_device_pixel_ratio(&mut self, dpr: f64) -> OverlayerResult<()> {
        viewport_for(self.layout_width, dpr)?;
        self.dpr = dpr;
        Ok(())
    }

    /// Device position of the surface's top-left corner.
    pub fn set_surface_origin(&mut self, origin: Point) {
        self.controller.set_surface_origin(origin);
    }

    /// Point the base photo at `source` (or clear it). Returns whether it changed.
    pub fn set_base_source(&mut self, source: Option<&str>) -> bool {
        self.cache.set_base_source(source)
    }

    /// Replace the whole collection.
    pub fn set_overlays(&mut self, overlays: Vec<OverlayItem>) -> OverlayerResult<()> {
        for (i, o) in overlays.iter().enumerate() {
            if overlays[..i].iter().any(|prev| prev.id == o.id) {
                return Err(OverlayerError::validation(format!(
                    "duplicate overlay id '{}'",
                    o.id
                )));
            }
        }
        self.adopt(overlays);
        Ok(())
    }

    /// Append an image sticker at the surface center. Returns its id.
    pub fn add_image(&mut self, source: impl Into<String>) -> OverlayerResult<String> {
        let id = self.fresh_id();
        let item = OverlayItem::image(id.clone(), source, self.center()?)
            .with_scale(NEW_IMAGE_SCALE);
        self.adopt(appended(&self.overlays, item));
        Ok(id)
    }

    /// Append a text label at the surface center. Returns its id.
    pub fn add_text(&mut self, text: impl Into<String>) -> OverlayerResult<String> {
        let id = self.fresh_id();
        let item =
            OverlayItem::text(id.clone(), text, self.center()?).with_scale(NEW_TEXT_SCALE);
        self.adopt(appended(&self.overlays, item));
        Ok(id)
    }

    /// Remove the topmost overlay. Returns whether anything was removed.
    pub fn undo_last(&mut self) -> bool {
        if self.overlays.is_empty() {
            return false;
        }
        self.adopt(without_last(&self.overlays));
        true
    }

    /// Remove every overlay.
    pub fn clear(&mut self) {
        if !self.overlays.is_empty() {
            self.adopt(Vec::new());
        }
    }

    /// Forward a pointer press. Returns the new selection.
    pub fn pointer_down(&mut self, ev: PointerEvent) -> Option<&str> {
        self.controller
            .pointer_down(ev, &self.overlays, self.capture.as_mut())
    }

    /// Forward a pointer move. Returns whether the collection changed.
    pub fn pointer_move(&mut self, ev: PointerEvent) -> bool {
        match self.controller.pointer_move(ev, &self.overlays) {
            Some(next) => {
                self.adopt(next);
                true
            }
            None => false,
        }
    }

    /// Forward a pointer release.
    pub fn pointer_up(&mut self, ev: PointerEvent) {
        self.controller.pointer_up(ev, self.capture.as_mut());
    }

    /// Forward a wheel tick. Returns whether the host must suppress page scrolling.
    pub fn wheel(&mut self, ev: WheelEvent) -> bool {
        let outcome = self.controller.wheel(ev, &self.overlays);
        if let Some(next) = outcome.next {
            self.adopt(next);
        }
        outcome.prevent_default
    }

    /// Apply decode completions that have arrived. Returns how many changed visible state.
    pub fn pump(&mut self) -> usize {
        self.cache.pump()
    }

    /// Wait for outstanding decodes, up to `timeout`. Returns whether the cache is idle.
    pub fn pump_until_idle(&mut self, timeout: Duration) -> bool {
        self.cache.pump_until_idle(timeout)
    }

    /// Current frame, re-rendered only when one of its inputs changed.
    pub fn frame(&mut self) -> OverlayerResult<&FrameRGBA> {
        let key = FrameKey {
            overlays_revision: self.overlays_revision,
            cache_revision: self.cache.revision(),
            selected: self.controller.selected().map(str::to_owned),
            viewport: self.viewport()?,
        };
        let memo = match self.memo.take() {
            Some((k, frame)) if k == key => (k, frame),
            _ => {
                let frame = self.render(key.viewport)?;
                (key, frame)
            }
        };
        Ok(&self.memo.insert(memo).1)
    }

    /// Render the current frame and write it as a PNG.
    pub fn export_png(&mut self, path: impl AsRef<Path>) -> OverlayerResult<()> {
        self.frame()?.write_png(path)
    }

    fn render(&mut self, viewport: Viewport) -> OverlayerResult<FrameRGBA> {
        let input = FrameInput {
            base: self.cache.base(),
            overlays: &self.overlays,
            bitmaps: self.cache.overlay_bitmaps(),
            selected: self.controller.selected(),
            viewport,
        };
        self.renderer.render(&input)
    }

    fn adopt(&mut self, next: Vec<OverlayItem>) {
        self.overlays = next;
        self.overlays_revision += 1;
        self.controller.prune_selection(&self.overlays);
        self.cache.sync_overlays(&self.overlays);
    }

    fn fresh_id(&mut self) -> String {
        self.next_id += 1;
        format!("ov-{}", self.next_id)
    }

    fn center(&self) -> OverlayerResult<Point> {
        let half = self.viewport()?.size / 2.0;
        Ok(Point::new(half, half))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
