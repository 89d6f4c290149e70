//! VTK XML readers.
//!
//! - [`pvd`] - `.pvd` collection manifests (timestep, group, file records)
//! - [`vtm`] - `.vtm` multi-block containers, resolved to their first dataset
//! - [`vtp`] - `.vtp` PolyData meshes
//! - [`xml`] - shared document loading and `DataArray` decoding

pub mod pvd;
pub mod vtm;
pub mod vtp;
pub mod xml;

use std::path::{Path, PathBuf};

pub use pvd::{read_manifest, ManifestRecord};
pub use vtm::resolve_first_dataset;
pub use vtp::{read_poly_data, MeshSnapshot};
pub use xml::{ArrayValues, DataArray, VtkDocument};

/// Resolve a `file` attribute against the directory of the referencing file.
pub fn resolve_relative(referrer: &Path, file: &str) -> PathBuf {
    let file = Path::new(file);
    if file.is_absolute() {
        return file.to_path_buf();
    }
    match referrer.parent() {
        Some(dir) => dir.join(file),
        None => file.to_path_buf(),
    }
}
