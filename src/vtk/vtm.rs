//! `.vtm` multi-block container resolution.
//!
//! Only the first leaf dataset is used: blocks are searched depth-first in
//! document order for a `DataSet` with a non-empty `file` attribute.

use std::path::{Path, PathBuf};

use super::resolve_relative;
use super::xml::VtkDocument;
use crate::util::{Error, Result};

/// Resolve a multi-block container to the path of its first PolyData file.
pub fn resolve_first_dataset(path: &Path) -> Result<PathBuf> {
    let doc = VtkDocument::load(path)?;
    let xml = doc.parse()?;
    doc.file_info(&xml)?;

    let file = xml
        .descendants()
        .filter(|n| n.has_tag_name("DataSet"))
        .find_map(|n| n.attribute("file").filter(|f| !f.is_empty()))
        .ok_or_else(|| Error::MissingDataset(path.to_path_buf()))?;

    let resolved = resolve_relative(path, file);
    match resolved.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("vtp") => Ok(resolved),
        other => Err(Error::NotPolyData {
            path: resolved.clone(),
            kind: format!(".{}", other.unwrap_or_default()),
        }),
    }
}
