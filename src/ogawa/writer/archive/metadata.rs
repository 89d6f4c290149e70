//! Metadata and time-sampling serialization.

use super::OArchive;
use super::super::constants::INLINE_METADATA;
use crate::core::MetaData;

impl OArchive {
    /// Add or get indexed metadata, returns its index.
    ///
    /// Index 0 is the empty metadata. Strings longer than 255 bytes, or
    /// metadata beyond the 254-entry table, are stored inline (0xff).
    pub fn add_indexed_metadata(&mut self, md: &MetaData) -> u8 {
        let serialized = md.serialize();

        if serialized.is_empty() {
            return 0;
        }

        if let Some(&idx) = self.metadata_map.get(&serialized) {
            return idx as u8;
        }

        if self.indexed_metadata.len() >= 255 || serialized.len() > 255 {
            return INLINE_METADATA;
        }

        let idx = self.indexed_metadata.len();
        self.indexed_metadata.push(md.clone());
        self.metadata_map.insert(serialized, idx);
        idx as u8
    }

    /// Serialize time samplings and the max samples table.
    ///
    /// Per sampling: max samples (u32), time per cycle (f64),
    /// stored time count (u32), stored times (f64 each).
    pub(super) fn serialize_time_samplings(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        for (i, ts) in self.time_samplings.iter().enumerate() {
            let max_sample = self.max_samples.get(i).copied().unwrap_or(0);
            buf.extend_from_slice(&max_sample.to_le_bytes());

            let (tpc, samples) = ts.stored_times();
            buf.extend_from_slice(&tpc.to_le_bytes());
            buf.extend_from_slice(&(samples.len() as u32).to_le_bytes());
            for sample in samples {
                buf.extend_from_slice(&sample.to_le_bytes());
            }
        }

        buf
    }

    /// Serialize the indexed metadata table (length-prefixed strings).
    pub(super) fn serialize_indexed_metadata(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for md in self.indexed_metadata.iter().skip(1) {
            let serialized = md.serialize();
            buf.push(serialized.len() as u8);
            buf.extend_from_slice(serialized.as_bytes());
        }
        buf
    }
}
