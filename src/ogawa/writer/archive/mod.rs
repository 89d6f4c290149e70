//! Ogawa archive writer (core write path).
//!
//! Split by concern:
//! - `data` - raw and keyed data blocks, groups
//! - `metadata` - indexed metadata and time sampling tables
//! - `objects` - object hierarchy and object headers
//! - `properties` - property sample groups and property headers

mod data;
mod metadata;
mod objects;
mod properties;
mod types;

use std::collections::HashMap;
use std::path::Path;

use super::constants::{ALEMBIC_LIBRARY_VERSION, OGAWA_FILE_VERSION};
use super::object::OObject;
use super::stream::OStream;
use super::write_util::format_alembic_version;
use crate::core::{ArraySampleContentKey, MetaData, TimeSampling};
use crate::ogawa::format::*;
use crate::util::{Error, Result};

/// Ogawa archive writer.
pub struct OArchive {
    name: String,
    stream: OStream,
    frozen: bool,
    time_samplings: Vec<TimeSampling>,
    max_samples: Vec<u32>,
    indexed_metadata: Vec<MetaData>,
    metadata_map: HashMap<String, usize>,
    archive_metadata: MetaData,
    /// Deduplication map: content key -> file position.
    dedup_map: HashMap<ArraySampleContentKey, u64>,
    dedup_hits: usize,
}

impl OArchive {
    /// Create a new Alembic file for writing.
    ///
    /// The header is written immediately with the frozen flag cleared and a
    /// placeholder root position.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let name = path.as_ref().to_string_lossy().to_string();
        let mut stream = OStream::create(&path)?;

        stream.write_bytes(OGAWA_MAGIC)?;
        stream.write_u8(NOT_FROZEN_FLAG)?;
        stream.write_bytes(&CURRENT_VERSION.to_be_bytes())?;
        stream.write_u64(0)?;

        Ok(Self {
            name,
            stream,
            frozen: false,
            time_samplings: vec![TimeSampling::identity()],
            max_samples: vec![0],
            indexed_metadata: vec![MetaData::new()], // Index 0 is always empty.
            metadata_map: HashMap::new(),
            archive_metadata: MetaData::new(),
            dedup_map: HashMap::new(),
            dedup_hits: 0,
        })
    }

    /// Get the archive name/path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the application name (`_ai_Application`).
    pub fn set_app_name(&mut self, name: &str) {
        self.archive_metadata.set("_ai_Application", name);
    }

    /// Set the date written (`_ai_DateWritten`).
    pub fn set_date_written(&mut self, date: &str) {
        self.archive_metadata.set("_ai_DateWritten", date);
    }

    /// Set the user description (`_ai_Description`).
    pub fn set_user_description(&mut self, desc: &str) {
        self.archive_metadata.set("_ai_Description", desc);
    }

    /// Archive-level metadata written on close.
    pub fn archive_metadata(&self) -> &MetaData {
        &self.archive_metadata
    }

    /// Add a time sampling and return its index.
    ///
    /// Equivalent samplings share one index.
    pub fn add_time_sampling(&mut self, ts: TimeSampling) -> u32 {
        if let Some(i) = self.time_samplings.iter().position(|t| t.is_equivalent(&ts)) {
            return i as u32;
        }
        let index = self.time_samplings.len() as u32;
        self.time_samplings.push(ts);
        self.max_samples.push(0);
        index
    }

    /// Raise the recorded sample count for a time sampling.
    pub fn update_max_samples(&mut self, ts_index: u32, num_samples: u32) {
        if let Some(max) = self.max_samples.get_mut(ts_index as usize) {
            *max = (*max).max(num_samples);
        }
    }

    /// Largest sample count written against a time sampling.
    pub fn max_samples(&self, index: usize) -> Option<u32> {
        self.max_samples.get(index).copied()
    }

    /// Number of keyed blocks that were reused instead of written again.
    pub fn dedup_hits(&self) -> usize {
        self.dedup_hits
    }

    /// Check if the archive has been frozen (finalized).
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Write the complete archive with given root object and freeze it.
    pub fn write_archive(&mut self, root: &OObject) -> Result<()> {
        if self.frozen {
            return Err(Error::Frozen);
        }

        let version_pos = self.write_data(&OGAWA_FILE_VERSION.to_le_bytes())?;
        let file_version_pos = self.write_data(&ALEMBIC_LIBRARY_VERSION.to_le_bytes())?;
        let (root_obj_pos, _) = self.write_object(root, "")?;

        let mut archive_meta = self.archive_metadata.clone();
        archive_meta.set("_ai_AlembicVersion", format_alembic_version(ALEMBIC_LIBRARY_VERSION));
        let archive_meta_pos = self.write_data(archive_meta.serialize().as_bytes())?;

        let ts_data = self.serialize_time_samplings();
        let ts_pos = self.write_data(&ts_data)?;

        let idx_meta_data = self.serialize_indexed_metadata();
        let idx_meta_pos = self.write_data(&idx_meta_data)?;

        let root_children = [
            make_data_offset(version_pos),
            make_data_offset(file_version_pos),
            make_group_offset(root_obj_pos),
            make_data_offset(archive_meta_pos),
            make_data_offset(ts_pos),
            make_data_offset(idx_meta_pos),
        ];
        let root_pos = self.write_group(&root_children)?;

        self.frozen = true;

        self.stream.seek(FROZEN_OFFSET as u64)?;
        self.stream.write_u8(FROZEN_FLAG)?;
        self.stream.seek(ROOT_POS_OFFSET as u64)?;
        self.stream.write_u64(root_pos)?;

        self.stream.seek_end()?;
        self.stream.flush()?;

        Ok(())
    }

    /// Finalize and close the archive.
    ///
    /// An archive closed without [`OArchive::write_archive`] still gets an
    /// empty top object so the file is readable.
    pub fn close(mut self) -> Result<()> {
        if !self.frozen {
            let empty_root = OObject::new("");
            self.write_archive(&empty_root)?;
        }
        self.stream.flush()?;
        Ok(())
    }
}
