/// Resolved-bitmap cache with revision-based stale suppression.
pub mod cache;
/// Bytes to premultiplied bitmaps.
pub mod decode;
/// Out-of-band executors for decode jobs.
pub mod executor;
/// Resource identifier resolution.
pub mod source;
