use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Per-mesh import settings.
///
/// Every field has a default, so meta files only need to name what they
/// change.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(default)]
pub(crate) struct ObjMeta {
    /// Mirror positions and normals along the marked axes.
    pub(crate) flip_axis: [bool; 3],
    /// Derive per-vertex tangents from the uv layout after welding.
    pub(crate) calculate_tangents: bool,
}

impl ObjMeta {
    pub(crate) fn parse(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read meta file: {}", path.display()))?;
        let meta = toml::from_str(&data)
            .with_context(|| format!("Malformed meta file: {}", path.display()))?;
        Ok(meta)
    }
}
