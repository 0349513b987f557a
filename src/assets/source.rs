use std::path::{Path, PathBuf};

use base64::Engine as _;

use crate::foundation::error::{OverlayerError, OverlayerResult};

/// Resolve an opaque resource identifier to raw bytes.
///
/// Implementations run on decode worker threads.
pub trait ResourceLoader: Send + Sync {
    /// Fetch the bytes behind `uri`.
    fn load(&self, uri: &str) -> OverlayerResult<Vec<u8>>;
}

/// Loader for `data:` URIs, `file://` URIs and filesystem paths.
///
/// Relative paths are resolved against `root` after normalization.
#[derive(Clone, Debug)]
pub struct FsResourceLoader {
    root: PathBuf,
}

impl FsResourceLoader {
    /// Loader resolving relative paths under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root used for relative paths.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceLoader for FsResourceLoader {
    fn load(&self, uri: &str) -> OverlayerResult<Vec<u8>> {
        if let Some(rest) = uri.strip_prefix("data:") {
            return decode_data_uri(rest);
        }

        let path = if let Some(rest) = uri.strip_prefix("file://") {
            PathBuf::from(rest)
        } else if Path::new(uri).is_absolute() {
            PathBuf::from(uri)
        } else {
            self.root.join(normalize_rel_path(uri)?)
        };

        std::fs::read(&path).map_err(|e| {
            OverlayerError::resource(format!("failed to read '{}': {e}", path.display()))
        })
    }
}

/// Clean up a relative resource path: backslashes become `/` and empty or `.` segments go.
/// Any `..` is refused so identifiers stay under the loader root.
pub(crate) fn normalize_rel_path(source: &str) -> OverlayerResult<String> {
    let unified = source.replace('\\', "/");
    let mut segments = Vec::new();
    for seg in unified.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if seg == ".." {
            return Err(OverlayerError::resource(format!(
                "'{source}' escapes the assets root"
            )));
        }
        segments.push(seg);
    }
    if segments.is_empty() {
        return Err(OverlayerError::resource(format!(
            "'{source}' does not name a file"
        )));
    }
    Ok(segments.join("/"))
}

// `rest` is everything after `data:`: `<mime>[;params][;base64],<payload>`.
fn decode_data_uri(rest: &str) -> OverlayerResult<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| OverlayerError::resource("data URI is missing ','"))?;

    if meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        return base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| OverlayerError::resource(format!("invalid base64 in data URI: {e}")));
    }

    Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
