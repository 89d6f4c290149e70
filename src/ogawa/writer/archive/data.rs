//! Low-level data/group block writing.

use super::OArchive;
use super::super::constants::DATA_KEY_SIZE;
use crate::core::ArraySampleContentKey;
use crate::util::{Error, PlainOldDataType, Result};

impl OArchive {
    /// Write a raw data block (size prefix + bytes) and return its position.
    ///
    /// Empty data is not written; position 0 stands for it.
    pub fn write_data(&mut self, data: &[u8]) -> Result<u64> {
        if self.frozen {
            return Err(Error::Frozen);
        }

        if data.is_empty() {
            return Ok(0);
        }

        let pos = self.stream.pos();
        self.stream.write_u64(data.len() as u64)?;
        self.stream.write_bytes(data)?;
        Ok(pos)
    }

    /// Write a sample block with a 16-byte content key prefix.
    ///
    /// Identical payloads are written once; later writes return the first
    /// block's position.
    pub fn write_keyed_data(
        &mut self,
        data: &[u8],
        pod: PlainOldDataType,
    ) -> Result<(u64, ArraySampleContentKey)> {
        if self.frozen {
            return Err(Error::Frozen);
        }

        let content_key = ArraySampleContentKey::from_data(data, pod);
        if data.is_empty() {
            return Ok((0, content_key));
        }

        if let Some(&existing_pos) = self.dedup_map.get(&content_key) {
            self.dedup_hits += 1;
            return Ok((existing_pos, content_key));
        }

        let pos = self.stream.pos();
        let total_size = DATA_KEY_SIZE + data.len();
        self.stream.write_u64(total_size as u64)?;
        self.stream.write_bytes(content_key.digest())?;
        self.stream.write_bytes(data)?;

        self.dedup_map.insert(content_key, pos);
        Ok((pos, content_key))
    }

    /// Write a group (child count + child offsets) and return its position.
    pub fn write_group(&mut self, children: &[u64]) -> Result<u64> {
        if self.frozen {
            return Err(Error::Frozen);
        }

        if children.is_empty() {
            return Ok(0);
        }

        let pos = self.stream.pos();
        self.stream.write_u64(children.len() as u64)?;
        for &child in children {
            self.stream.write_u64(child)?;
        }
        Ok(pos)
    }
}
