//! Manifest-driven conversion loop.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::util::{Error, Result};
use crate::vtk::{read_poly_data, resolve_first_dataset, ManifestRecord, MeshSnapshot};

use super::config::ConvertConfig;
use super::extract::extract;
use super::session::ArchiveSession;
use super::track::ObjectTrack;

/// Loads the mesh snapshot a manifest record points at.
pub trait MeshSource {
    fn load(&mut self, path: &Path) -> Result<MeshSnapshot>;
}

/// Reads `.vtm` containers (first PolyData leaf) and bare `.vtp` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct VtkMeshSource;

impl MeshSource for VtkMeshSource {
    fn load(&mut self, path: &Path) -> Result<MeshSnapshot> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "vtm" => read_poly_data(&resolve_first_dataset(path)?),
            "vtp" => read_poly_data(path),
            _ => Err(Error::Unsupported(format!("dataset file {}", path.display()))),
        }
    }
}

/// Per-group outcome of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSummary {
    pub group: String,
    pub mesh_samples: usize,
    pub color_samples: usize,
    pub visibility: Vec<bool>,
}

/// Outcome of a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Tracks in creation order.
    pub tracks: Vec<TrackSummary>,
    /// Distinct timestep strings seen in the manifest.
    pub num_timesteps: usize,
    pub time_sampling_index: u32,
}

impl ConversionSummary {
    /// Summary of one group.
    pub fn track(&self, group: &str) -> Option<&TrackSummary> {
        self.tracks.iter().find(|t| t.group == group)
    }
}

/// Maps groups to tracks and feeds them one record at a time.
pub struct CollectionDriver<'a, S: MeshSource> {
    config: &'a ConvertConfig,
    source: S,
    time_sampling_index: u32,
    tracks: Vec<ObjectTrack>,
    track_index: HashMap<String, usize>,
    last_file: HashMap<String, String>,
    timesteps: HashSet<String>,
}

impl<'a, S: MeshSource> CollectionDriver<'a, S> {
    pub fn new(config: &'a ConvertConfig, source: S, time_sampling_index: u32) -> Self {
        let last_file = config
            .visibility_seeds
            .iter()
            .map(|(group, file)| (group.clone(), file.clone()))
            .collect();

        Self {
            config,
            source,
            time_sampling_index,
            tracks: Vec::new(),
            track_index: HashMap::new(),
            last_file,
            timesteps: HashSet::new(),
        }
    }

    /// Process records in manifest order, stopping at the first error.
    pub fn process_records(&mut self, records: &[ManifestRecord]) -> Result<()> {
        for record in records {
            self.process_record(record)?;
        }
        Ok(())
    }

    /// Load, extract and append one record.
    pub fn process_record(&mut self, record: &ManifestRecord) -> Result<()> {
        info!("{}: {}", record.timestep, record.group);
        self.timesteps.insert(record.timestep.clone());

        let idx = self.track_for(&record.group);
        let visible = self
            .last_file
            .get(&record.group)
            .map_or(true, |last| *last != record.file);

        let snapshot = self.source.load(&record.path)?;
        let frame = extract(&snapshot, self.config)?;
        debug!("{}: {} cells", record.group, frame.geometry.num_faces());

        let track = &mut self.tracks[idx];
        track.append_mesh_sample(&frame.geometry, visible);
        if let Some(color) = &frame.color {
            track.append_color_sample(color);
        }

        self.last_file.insert(record.group.clone(), record.file.clone());
        Ok(())
    }

    fn track_for(&mut self, group: &str) -> usize {
        if let Some(&idx) = self.track_index.get(group) {
            return idx;
        }
        debug!("new track {}", group);
        let idx = self.tracks.len();
        self.tracks.push(ObjectTrack::new(
            group,
            self.time_sampling_index,
            &self.config.color_set_name,
        ));
        self.track_index.insert(group.to_string(), idx);
        idx
    }

    /// Tracks in creation order.
    pub fn tracks(&self) -> &[ObjectTrack] {
        &self.tracks
    }

    /// Distinct timesteps seen so far.
    pub fn num_timesteps(&self) -> usize {
        self.timesteps.len()
    }

    /// Hand the tracks to the session and write `<tsIndex>.samples`.
    pub fn finish(self, session: &mut ArchiveSession) -> ConversionSummary {
        let num_timesteps = self.timesteps.len();
        let mut tracks = Vec::with_capacity(self.tracks.len());

        for track in self.tracks {
            if track.num_mesh_samples() != num_timesteps {
                warn!(
                    "{} has {} samples for {} timesteps",
                    track.name(),
                    track.num_mesh_samples(),
                    num_timesteps
                );
            }
            tracks.push(TrackSummary {
                group: track.name().to_string(),
                mesh_samples: track.num_mesh_samples(),
                color_samples: track.num_color_samples(),
                visibility: track.visibility().to_vec(),
            });
            session.attach(track);
        }

        session.set_top_u32(
            &format!("{}.samples", self.time_sampling_index),
            num_timesteps as u32,
        );

        ConversionSummary {
            tracks,
            num_timesteps,
            time_sampling_index: self.time_sampling_index,
        }
    }
}
