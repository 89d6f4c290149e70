//! VTK time series to Alembic conversion.
//!
//! [`run`] opens the output archive, reads the manifest, feeds every record
//! through a [`CollectionDriver`] and closes the archive.

pub mod color;
pub mod config;
pub mod driver;
pub mod extract;
pub mod session;
pub mod track;

use std::path::Path;

use crate::core::TimeSampling;
use crate::util::Result;
use crate::vtk::read_manifest;

pub use color::derive_colors;
pub use config::{ConvertConfig, VisibilitySeeds};
pub use driver::{CollectionDriver, ConversionSummary, MeshSource, TrackSummary, VtkMeshSource};
pub use extract::{extract, ColorSample, ExtractedFrame, GeometrySample};
pub use session::ArchiveSession;
pub use track::ObjectTrack;

/// Convert the collection described by `manifest` into `output`.
pub fn run(manifest: &Path, output: &Path, config: &ConvertConfig) -> Result<ConversionSummary> {
    run_with_source(manifest, output, config, VtkMeshSource)
}

/// [`run`] with a custom mesh loader.
pub fn run_with_source<S: MeshSource>(
    manifest: &Path,
    output: &Path,
    config: &ConvertConfig,
    source: S,
) -> Result<ConversionSummary> {
    config.validate()?;

    let description = format!("Exported from: {}", manifest.display());
    let mut session = ArchiveSession::create(output, config, &description)?;
    let ts_index =
        session.add_time_sampling(TimeSampling::uniform(config.time_per_frame(), config.start_time));

    let records = read_manifest(manifest)?;
    let mut driver = CollectionDriver::new(config, source, ts_index);
    driver.process_records(&records)?;

    let summary = driver.finish(&mut session);
    session.close()?;

    tracing::info!(
        "wrote {} groups over {} timesteps to {}",
        summary.tracks.len(),
        summary.num_timesteps,
        output.display()
    );
    Ok(summary)
}
