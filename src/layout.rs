/// Square viewport sizing from layout width.
pub mod viewport;
