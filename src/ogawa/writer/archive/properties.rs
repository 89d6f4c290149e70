//! Property writing and header serialization.
//!
//! A property group holds one data block per changed sample (plus a
//! dimensions block for arrays). Headers for all properties of a compound
//! are packed into a single data block at the end of its group.

use super::types::{ObjectHeadersContext, PropertySampleState, WrittenProperties};
use super::OArchive;
use super::super::constants::INLINE_METADATA;
use super::super::property::{OProperty, OPropertyData, OSample};
use super::super::write_util::{hash_dimensions, hash_property_header, size_hint_for, write_with_hint};
use crate::core::{ArraySampleContentKey, ContentHasher, TimeSampling};
use crate::ogawa::format::{make_data_offset, make_group_offset, EMPTY_DATA};
use crate::util::Result;

const PROPERTY_COMPOUND: u32 = 0;
const PROPERTY_SCALAR: u32 = 1;
const PROPERTY_ARRAY: u32 = 2;
const PROPERTY_SCALAR_LIKE_ARRAY: u32 = 3;

const INFO_HAS_TIME_SAMPLING: u32 = 0x0100;
const INFO_HAS_CHANGED_INDICES: u32 = 0x0200;
const INFO_HOMOGENOUS: u32 = 0x0400;
const INFO_CONSTANT: u32 = 0x0800;

impl OArchive {
    /// Write a property list and, when `obj_ctx` is set, the owning object's
    /// child headers (which embed the list's data hash).
    pub(super) fn write_properties(
        &mut self,
        props: &[OProperty],
        obj_ctx: Option<ObjectHeadersContext<'_>>,
    ) -> Result<WrittenProperties> {
        let mut states = Vec::with_capacity(props.len());
        for prop in props {
            states.push(self.collect_property_sample_data(prop)?);
        }

        // Groups are finalized last-to-first, matching the order AbcCoreOgawa
        // tears down its property writers in.
        let mut positions = vec![0u64; props.len()];
        let mut prop_hashes = vec![(0u64, 0u64); props.len()];
        for idx in (0..props.len()).rev() {
            let (pos, hash) = self.finalize_property_group(&props[idx], &states[idx])?;
            positions[idx] = pos;
            prop_hashes[idx] = hash;
        }

        let mut hasher = ContentHasher::new();
        for hash in &prop_hashes {
            hasher.update_pair(*hash);
        }
        let data_hash = hasher.finalize();

        let object_headers_pos = match obj_ctx {
            Some(ctx) => {
                let headers =
                    self.serialize_object_headers_with_hash(ctx.children, data_hash, ctx.child_hash);
                self.write_data(&headers)?
            }
            None => 0,
        };

        if props.is_empty() {
            return Ok(WrittenProperties {
                pos: 0,
                data_hash,
                object_headers_pos,
                prop_hashes,
            });
        }

        let headers = self.serialize_property_headers(props, &states);
        let headers_pos = self.write_data(&headers)?;

        let mut group: Vec<u64> = positions.into_iter().map(make_group_offset).collect();
        group.push(make_data_offset(headers_pos));
        let pos = self.write_group(&group)?;

        Ok(WrittenProperties {
            pos,
            data_hash,
            object_headers_pos,
            prop_hashes,
        })
    }

    /// Write the sample blocks of a property.
    ///
    /// Only the first sample and samples that differ from their predecessor
    /// get a block; repeats between two changes point back at the previous
    /// block.
    fn collect_property_sample_data(&mut self, prop: &OProperty) -> Result<PropertySampleState> {
        let pod = prop.data_type.pod;

        let samples: Vec<OSample> = match &prop.data {
            OPropertyData::Scalar(samples) => samples
                .iter()
                .map(|data| OSample { data: data.clone(), dims: Vec::new() })
                .collect(),
            OPropertyData::Array(samples) => samples.clone(),
            OPropertyData::Compound(_) => return Ok(PropertySampleState::default()),
        };
        let is_array = matches!(prop.data, OPropertyData::Array(_));

        let mut state = PropertySampleState::new(samples.len() as u32);
        let mut prev_key: Option<ArraySampleContentKey> = None;
        let mut prev_offsets: Vec<u64> = Vec::new();
        let mut prev_count: Option<usize> = None;

        for (index, sample) in samples.iter().enumerate() {
            let sample_index = index as u32;
            let content_key = ArraySampleContentKey::from_data(&sample.data, pod);

            let digest = if is_array {
                hash_dimensions(&sample.dims, content_key.halves())
            } else {
                content_key.halves()
            };
            state.push_hash(digest);

            if prev_key == Some(content_key) {
                continue;
            }

            if sample_index > 0 && state.first_changed_index != 0 {
                for _ in (state.last_changed_index + 1)..sample_index {
                    state.children.extend_from_slice(&prev_offsets);
                }
            }

            let (data_pos, _) = self.write_keyed_data(&sample.data, pod)?;
            let mut offsets = vec![make_data_offset(data_pos)];

            if is_array {
                let dims_offset = if sample.dims.len() <= 1 {
                    EMPTY_DATA
                } else {
                    let dims: Vec<u8> = sample
                        .dims
                        .iter()
                        .flat_map(|d| (*d as u64).to_le_bytes())
                        .collect();
                    make_data_offset(self.write_data(&dims)?)
                };
                offsets.push(dims_offset);

                let count: usize = sample.dims.iter().product();
                if prev_count.is_some_and(|prev| prev != count) {
                    state.is_homogenous = false;
                }
                prev_count = Some(count);
            }

            state.children.extend_from_slice(&offsets);
            state.mark_changed(sample_index);
            prev_offsets = offsets;
            prev_key = Some(content_key);
        }

        self.update_max_samples(prop.time_sampling_index, state.effective_samples());
        Ok(state)
    }

    /// Write the group for a property and return (position, property hash).
    fn finalize_property_group(
        &mut self,
        prop: &OProperty,
        state: &PropertySampleState,
    ) -> Result<(u64, (u64, u64))> {
        let time_sampling = self
            .time_samplings
            .get(prop.time_sampling_index as usize)
            .cloned()
            .unwrap_or_else(TimeSampling::identity);

        match &prop.data {
            OPropertyData::Scalar(_) | OPropertyData::Array(_) => {
                let pos = self.write_group(&state.children)?;

                let mut hasher = ContentHasher::new();
                hash_property_header(&mut hasher, prop, &time_sampling);
                if let Some(sample_hash) = state.sample_hash {
                    hasher.update_pair(sample_hash);
                }
                Ok((pos, hasher.finalize()))
            }
            OPropertyData::Compound(sub_props) => {
                let written = self.write_properties(sub_props, None)?;

                let mut hasher = ContentHasher::new();
                for hash in &written.prop_hashes {
                    hasher.update_pair(*hash);
                }
                hash_property_header(&mut hasher, prop, &time_sampling);
                Ok((written.pos, hasher.finalize()))
            }
        }
    }

    /// Serialize the headers of a property list.
    fn serialize_property_headers(
        &mut self,
        props: &[OProperty],
        states: &[PropertySampleState],
    ) -> Vec<u8> {
        let mut buf = Vec::new();

        for (prop, state) in props.iter().zip(states) {
            let info = self.build_property_info(prop, state);
            buf.extend_from_slice(&info.to_le_bytes());

            let size_hint = ((info >> 2) & 0x03) as u8;

            if !matches!(prop.data, OPropertyData::Compound(_)) {
                write_with_hint(&mut buf, state.num_samples, size_hint);

                if info & INFO_HAS_CHANGED_INDICES != 0 {
                    write_with_hint(&mut buf, state.first_changed_index, size_hint);
                    write_with_hint(&mut buf, state.last_changed_index, size_hint);
                }

                if info & INFO_HAS_TIME_SAMPLING != 0 {
                    write_with_hint(&mut buf, prop.time_sampling_index, size_hint);
                }
            }

            let name = prop.name.as_bytes();
            write_with_hint(&mut buf, name.len() as u32, size_hint);
            buf.extend_from_slice(name);

            let meta_idx = self.add_indexed_metadata(&prop.meta_data);
            if meta_idx == INLINE_METADATA {
                let meta = prop.meta_data.serialize();
                write_with_hint(&mut buf, meta.len() as u32, size_hint);
                buf.extend_from_slice(meta.as_bytes());
            }
        }

        buf
    }

    /// Build the 32-bit info word of a property header.
    ///
    /// Bits 0-1 property type, 2-3 size hint, 4-7 POD, 8 time sampling
    /// index present, 9 changed indices present, 10 homogenous, 11 constant,
    /// 12-19 extent, 20-27 metadata index.
    fn build_property_info(&mut self, prop: &OProperty, state: &PropertySampleState) -> u32 {
        let name_size = prop.name.len() as u32;
        let meta_size = prop.meta_data.serialize().len() as u32;
        let max_size = meta_size
            .max(name_size)
            .max(state.num_samples)
            .max(prop.time_sampling_index);

        let mut info = (size_hint_for(max_size) as u32 & 0x03) << 2;

        info |= match &prop.data {
            OPropertyData::Compound(_) => PROPERTY_COMPOUND,
            OPropertyData::Scalar(_) => PROPERTY_SCALAR,
            OPropertyData::Array(_) if prop.is_scalar_like => PROPERTY_SCALAR_LIKE_ARRAY,
            OPropertyData::Array(_) => PROPERTY_ARRAY,
        };

        if !matches!(prop.data, OPropertyData::Compound(_)) {
            info |= (prop.data_type.pod.code() as u32 & 0x0f) << 4;
            info |= (prop.data_type.extent as u32 & 0xff) << 12;

            if state.is_homogenous {
                info |= INFO_HOMOGENOUS;
            }

            if prop.time_sampling_index != 0 {
                info |= INFO_HAS_TIME_SAMPLING;
            }

            let (first, last) = (state.first_changed_index, state.last_changed_index);
            if first == 0 && last == 0 {
                info |= INFO_CONSTANT;
            } else if first != 1 || last != state.num_samples.saturating_sub(1) {
                info |= INFO_HAS_CHANGED_INDICES;
            }
        }

        let meta_idx = self.add_indexed_metadata(&prop.meta_data);
        info |= (meta_idx as u32) << 20;

        info
    }
}
