//! Read-back of written Ogawa archives: object headers, property headers
//! and sample payloads.

#![allow(dead_code)]

use std::path::Path;

use vtk2abc::ogawa::{extract_offset, is_data_offset, ROOT_POS_OFFSET};

/// Content key prepended to every sample block.
const KEY_SIZE: usize = 16;
/// Object headers end with the data and child hashes.
const OBJECT_HASH_SIZE: usize = 32;

pub const COMPOUND: u32 = 0;
pub const SCALAR: u32 = 1;

fn u16_at(bytes: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([bytes[pos], bytes[pos + 1]])
}

fn u32_at(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
}

fn u64_at(bytes: &[u8], pos: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[pos..pos + 8]);
    u64::from_le_bytes(buf)
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// An object as listed in its parent's headers.
pub struct ObjectEntry {
    pub name: String,
    pub meta: String,
    group: Vec<u64>,
}

/// A property as listed in its compound's headers.
pub struct PropertyEntry {
    pub name: String,
    pub kind: u32,
    pub pod: u8,
    pub extent: u8,
    pub num_samples: u32,
    pub first_changed: u32,
    pub last_changed: u32,
    pub time_sampling: u32,
    pub meta: String,
    group: Vec<u64>,
}

impl PropertyEntry {
    /// Index of the stored block backing logical sample `index`.
    fn stored_index(&self, index: u32) -> usize {
        let (first, last) = (self.first_changed, self.last_changed);
        let stored = if (first == 0 && last == 0) || index < first {
            0
        } else if index >= last {
            last - first + 1
        } else {
            index - first + 1
        };
        stored as usize
    }
}

/// A whole archive held in memory.
pub struct ArchiveBytes {
    bytes: Vec<u8>,
    metadata: Vec<String>,
}

impl ArchiveBytes {
    pub fn open(path: &Path) -> Self {
        let bytes = std::fs::read(path).expect("read archive");
        let mut archive = Self { bytes, metadata: Vec::new() };
        archive.metadata = archive.read_indexed_metadata();
        archive
    }

    /// Child offsets of a group; position 0 is the empty group.
    pub fn group(&self, offset: u64) -> Vec<u64> {
        assert!(!is_data_offset(offset), "expected a group offset");
        let pos = extract_offset(offset) as usize;
        if pos == 0 {
            return Vec::new();
        }
        let count = u64_at(&self.bytes, pos) as usize;
        (0..count).map(|i| u64_at(&self.bytes, pos + 8 + i * 8)).collect()
    }

    /// Payload of a data block; position 0 is the empty block.
    pub fn data(&self, offset: u64) -> &[u8] {
        assert!(is_data_offset(offset), "expected a data offset");
        let pos = extract_offset(offset) as usize;
        if pos == 0 {
            return &[];
        }
        let size = u64_at(&self.bytes, pos) as usize;
        &self.bytes[pos + 8..pos + 8 + size]
    }

    pub fn root(&self) -> Vec<u64> {
        self.group(u64_at(&self.bytes, ROOT_POS_OFFSET))
    }

    fn read_indexed_metadata(&self) -> Vec<String> {
        let data = self.data(self.root()[5]);
        let mut table = vec![String::new()];
        let mut pos = 0;
        while pos < data.len() {
            let len = data[pos] as usize;
            table.push(text(&data[pos + 1..pos + 1 + len]));
            pos += 1 + len;
        }
        table
    }

    /// The unnamed top object.
    pub fn top(&self) -> ObjectEntry {
        ObjectEntry {
            name: String::new(),
            meta: String::new(),
            group: self.group(self.root()[2]),
        }
    }

    pub fn children(&self, obj: &ObjectEntry) -> Vec<ObjectEntry> {
        let Some(&headers_offset) = obj.group.last() else {
            return Vec::new();
        };
        let headers = self.data(headers_offset);
        let end = headers.len() - OBJECT_HASH_SIZE;

        let mut out = Vec::new();
        let mut pos = 0;
        while pos < end {
            let name_len = u32_at(headers, pos) as usize;
            pos += 4;
            let name = text(&headers[pos..pos + name_len]);
            pos += name_len;
            let meta_idx = headers[pos];
            pos += 1;
            let meta = if meta_idx == 0xff {
                let len = u32_at(headers, pos) as usize;
                pos += 4;
                pos += len;
                text(&headers[pos - len..pos])
            } else {
                self.metadata[meta_idx as usize].clone()
            };
            // Slot 0 is the property group.
            let group = self.group(obj.group[out.len() + 1]);
            out.push(ObjectEntry { name, meta, group });
        }
        out
    }

    pub fn child(&self, obj: &ObjectEntry, name: &str) -> ObjectEntry {
        self.children(obj)
            .into_iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("no child object {name}"))
    }

    /// Properties of an object's top compound.
    pub fn properties(&self, obj: &ObjectEntry) -> Vec<PropertyEntry> {
        let group = obj.group.first().map(|&o| self.group(o)).unwrap_or_default();
        self.property_list(&group)
    }

    /// Children of a compound property.
    pub fn sub_properties(&self, compound: &PropertyEntry) -> Vec<PropertyEntry> {
        assert_eq!(compound.kind, COMPOUND, "{} is not a compound", compound.name);
        self.property_list(&compound.group)
    }

    /// Walk `path` down from an object's top compound.
    pub fn property(&self, obj: &ObjectEntry, path: &[&str]) -> PropertyEntry {
        let mut props = self.properties(obj);
        let mut found = None;
        for (depth, name) in path.iter().enumerate() {
            let idx = props
                .iter()
                .position(|p| p.name == *name)
                .unwrap_or_else(|| panic!("no property {}", path[..=depth].join("/")));
            let prop = props.swap_remove(idx);
            if depth + 1 < path.len() {
                props = self.sub_properties(&prop);
            }
            found = Some(prop);
        }
        found.expect("empty property path")
    }

    fn property_list(&self, group: &[u64]) -> Vec<PropertyEntry> {
        let Some(&headers_offset) = group.last() else {
            return Vec::new();
        };
        let headers = self.data(headers_offset);

        let mut out = Vec::new();
        let mut pos = 0;
        while pos < headers.len() {
            let info = u32_at(headers, pos);
            pos += 4;
            let hint = (info >> 2) & 0x03;
            let read = |pos: &mut usize| -> u32 {
                match hint {
                    0 => {
                        *pos += 1;
                        headers[*pos - 1] as u32
                    }
                    1 => {
                        *pos += 2;
                        u16_at(headers, *pos - 2) as u32
                    }
                    _ => {
                        *pos += 4;
                        u32_at(headers, *pos - 4)
                    }
                }
            };

            let kind = info & 0x03;
            let (mut num_samples, mut first_changed, mut last_changed, mut time_sampling) =
                (0, 0, 0, 0);
            if kind != COMPOUND {
                num_samples = read(&mut pos);
                if info & 0x0200 != 0 {
                    first_changed = read(&mut pos);
                    last_changed = read(&mut pos);
                } else if info & 0x0800 == 0 {
                    first_changed = 1;
                    last_changed = num_samples.saturating_sub(1);
                }
                if info & 0x0100 != 0 {
                    time_sampling = read(&mut pos);
                }
            }

            let name_len = read(&mut pos) as usize;
            let name = text(&headers[pos..pos + name_len]);
            pos += name_len;

            let meta_idx = ((info >> 20) & 0xff) as usize;
            let meta = if meta_idx == 0xff {
                let len = read(&mut pos) as usize;
                pos += len;
                text(&headers[pos - len..pos])
            } else {
                self.metadata[meta_idx].clone()
            };

            out.push(PropertyEntry {
                name,
                kind,
                pod: ((info >> 4) & 0x0f) as u8,
                extent: ((info >> 12) & 0xff) as u8,
                num_samples,
                first_changed,
                last_changed,
                time_sampling,
                meta,
                group: self.group(group[out.len()]),
            });
        }
        out
    }

    /// Bytes of logical sample `index`, without the content key.
    pub fn sample(&self, prop: &PropertyEntry, index: u32) -> &[u8] {
        assert_ne!(prop.kind, COMPOUND);
        assert!(index < prop.num_samples, "{} has {} samples", prop.name, prop.num_samples);
        // Arrays store a dimensions block after each data block.
        let stride = if prop.kind == SCALAR { 1 } else { 2 };
        let data = self.data(prop.group[prop.stored_index(index) * stride]);
        if data.is_empty() {
            data
        } else {
            &data[KEY_SIZE..]
        }
    }
}

pub fn f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
