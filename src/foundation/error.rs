/// Convenience result type used across Overlayer.
pub type OverlayerResult<T> = Result<T, OverlayerError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Decode and capture failures on the interactive path never surface through this type; they
/// degrade to an empty slot or are swallowed. What remains are configuration and IO errors.
#[derive(thiserror::Error, Debug)]
pub enum OverlayerError {
    /// Invalid caller-provided configuration or scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A resource identifier could not be resolved to bytes.
    #[error("resource error: {0}")]
    Resource(String),

    /// Bytes could not be decoded into a bitmap.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors while preparing or rasterizing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayerError {
    /// Build an [`OverlayerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`OverlayerError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build an [`OverlayerError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build an [`OverlayerError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build an [`OverlayerError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
