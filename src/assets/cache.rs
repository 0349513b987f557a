use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::assets::decode::{Bitmap, decode_bitmap};
use crate::assets::executor::DecodeExecutor;
use crate::assets::source::ResourceLoader;
use crate::foundation::error::OverlayerResult;
use crate::model::overlay::OverlayItem;

#[derive(Debug)]
enum Target {
    Base,
    Overlay(String),
}

struct Completion {
    target: Target,
    // Request revision; compared against the live revision when the result is applied.
    revision: u64,
    result: OverlayerResult<Bitmap>,
}

/// Asynchronous resolver for the base photo and per-overlay bitmaps.
///
/// Decodes run on a [`DecodeExecutor`] and report back through a channel. Results are applied
/// only when the owner calls [`ImageResourceCache::pump`], on the owner's thread, so application
/// never races input handling or rendering.
///
/// Each request carries the revision of the slot it was issued for (the base identifier
/// revision, or the overlay-collection revision). A result whose revision is no longer current
/// was superseded and is dropped unapplied.
///
/// Overlay bitmaps are keyed by overlay id rather than by resource identifier: two overlays
/// sharing one source decode it twice and hold independent entries.
pub struct ImageResourceCache {
    loader: Arc<dyn ResourceLoader>,
    executor: Arc<dyn DecodeExecutor>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    in_flight: usize,

    base_source: Option<String>,
    base_revision: u64,
    base: Option<Bitmap>,

    overlay_revision: u64,
    overlays: HashMap<String, Bitmap>,
    failed: HashSet<String>,

    revision: u64,
}

impl ImageResourceCache {
    /// Empty cache decoding through `executor` with bytes from `loader`.
    pub fn new(loader: Arc<dyn ResourceLoader>, executor: Arc<dyn DecodeExecutor>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            loader,
            executor,
            tx,
            rx,
            in_flight: 0,
            base_source: None,
            base_revision: 0,
            base: None,
            overlay_revision: 0,
            overlays: HashMap::new(),
            failed: HashSet::new(),
            revision: 0,
        }
    }

    /// Point the base slot at a new identifier.
    ///
    /// A change clears the slot and starts a fresh decode; any decode still in flight for the
    /// previous identifier is superseded. Setting the current identifier again is a no-op.
    /// Returns whether the identifier changed.
    pub fn set_base_source(&mut self, source: Option<&str>) -> bool {
        if self.base_source.as_deref() == source {
            return false;
        }
        self.base_source = source.map(str::to_owned);
        self.base_revision += 1;
        if self.base.take().is_some() {
            self.revision += 1;
        }

        if let Some(src) = source {
            tracing::debug!(revision = self.base_revision, "requesting base decode");
            self.spawn_decode(Target::Base, self.base_revision, src.to_owned());
        }
        true
    }

    /// Current base identifier.
    pub fn base_source(&self) -> Option<&str> {
        self.base_source.as_deref()
    }

    /// Decoded base photo, if resolved.
    pub fn base(&self) -> Option<&Bitmap> {
        self.base.as_ref()
    }

    /// React to a new overlay-collection revision.
    ///
    /// Supersedes every overlay decode issued for earlier revisions, then requests a decode for
    /// each image overlay that has neither a cached bitmap nor a recorded failure. Returns the
    /// number of decodes started.
    pub fn sync_overlays(&mut self, overlays: &[OverlayItem]) -> usize {
        self.overlay_revision += 1;
        let revision = self.overlay_revision;

        let mut started = 0;
        for item in overlays {
            let Some(source) = item.image_source() else {
                continue;
            };
            if self.overlays.contains_key(&item.id) || self.failed.contains(&item.id) {
                continue;
            }
            self.spawn_decode(
                Target::Overlay(item.id.clone()),
                revision,
                source.to_owned(),
            );
            started += 1;
        }
        if started > 0 {
            tracing::debug!(revision, started, "requested overlay decodes");
        }
        started
    }

    /// Resolved bitmap for an overlay id.
    pub fn overlay_bitmap(&self, id: &str) -> Option<&Bitmap> {
        self.overlays.get(id)
    }

    /// All resolved overlay bitmaps, keyed by overlay id.
    pub fn overlay_bitmaps(&self) -> &HashMap<String, Bitmap> {
        &self.overlays
    }

    /// Whether the overlay's decode failed; failed ids are never re-requested.
    pub fn is_failed(&self, id: &str) -> bool {
        self.failed.contains(id)
    }

    /// Number of decodes whose completion has not been drained yet (stale ones included).
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// `true` once every issued decode has been drained.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// Counter bumped whenever a resolved bitmap is added, replaced or cleared.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply every completion that has arrived, without blocking.
    ///
    /// Returns the number of completions that changed visible state.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(c) = self.rx.try_recv() {
            if self.apply(c) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until every issued decode has completed or `timeout` elapses.
    ///
    /// Returns `true` when the cache is idle. Intended for batch callers; interactive owners use
    /// [`ImageResourceCache::pump`].
    pub fn pump_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.pump();
        while self.in_flight > 0 {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok(c) => {
                    self.apply(c);
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.in_flight == 0
    }

    fn spawn_decode(&mut self, target: Target, revision: u64, source: String) {
        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.executor.spawn(Box::new(move || {
            let result = loader.load(&source).and_then(|bytes| decode_bitmap(&bytes));
            // The receiver lives as long as the cache; a send error means nobody is listening.
            let _ = tx.send(Completion {
                target,
                revision,
                result,
            });
        }));
    }

    fn apply(&mut self, c: Completion) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        match c.target {
            Target::Base => {
                if c.revision != self.base_revision {
                    tracing::debug!(
                        revision = c.revision,
                        current = self.base_revision,
                        "discarding superseded base decode"
                    );
                    return false;
                }
                match c.result {
                    Ok(bitmap) => self.base = Some(bitmap),
                    Err(e) => {
                        tracing::warn!(
                            source = self.base_source.as_deref().unwrap_or_default(),
                            "base image failed to decode: {e}"
                        );
                        if self.base.take().is_none() {
                            return false;
                        }
                    }
                }
            }
            Target::Overlay(id) => {
                if c.revision != self.overlay_revision {
                    tracing::debug!(
                        %id,
                        revision = c.revision,
                        current = self.overlay_revision,
                        "discarding superseded overlay decode"
                    );
                    return false;
                }
                match c.result {
                    // Merge against the live map, not a snapshot taken at request time.
                    Ok(bitmap) => {
                        self.overlays.entry(id).or_insert(bitmap);
                    }
                    Err(e) => {
                        tracing::warn!(%id, "overlay image failed to decode: {e}");
                        self.failed.insert(id);
                        return false;
                    }
                }
            }
        }
        self.revision += 1;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
