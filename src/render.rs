/// Execution of frame plans with `vello_cpu`.
pub mod cpu;
/// Pure frame planning.
pub mod plan;
/// Rendered frames and PNG export.
pub mod surface;
/// Text shaping for overlay labels.
pub mod text;
