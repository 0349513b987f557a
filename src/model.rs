/// Placed overlays and collection helpers.
pub mod overlay;
/// JSON scene document consumed by the CLI.
pub mod scene;
