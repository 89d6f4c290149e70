//! Object write path (hierarchy + object headers).

use super::types::ObjectHeadersContext;
use super::OArchive;
use super::super::constants::{HINT_U32, HINT_U8, INLINE_METADATA};
use super::super::object::OObject;
use super::super::write_util::write_with_hint;
use crate::core::ContentHasher;
use crate::ogawa::format::{make_data_offset, make_group_offset};
use crate::util::Result;

impl OArchive {
    /// Write an object and return (position, hash).
    ///
    /// Children are written first. The object hash covers the children's
    /// hashes, the property data hash, the metadata and the name.
    pub(super) fn write_object(
        &mut self,
        obj: &OObject,
        parent_path: &str,
    ) -> Result<(u64, (u64, u64))> {
        let full_path = if parent_path.is_empty() {
            String::from("/")
        } else if parent_path == "/" {
            format!("/{}", obj.name)
        } else {
            format!("{}/{}", parent_path, obj.name)
        };
        tracing::trace!(path = %full_path, "writing object");

        let mut child_positions = Vec::with_capacity(obj.children.len());
        let mut child_hasher = ContentHasher::new();
        for child in &obj.children {
            let (child_pos, child_hash) = self.write_object(child, &full_path)?;
            child_positions.push(child_pos);
            child_hasher.update_pair(child_hash);
        }

        let child_hash = if obj.children.is_empty() {
            (0, 0)
        } else {
            child_hasher.finalize()
        };

        let ctx = ObjectHeadersContext {
            children: &obj.children,
            child_hash,
        };
        let written = self.write_properties(&obj.properties, Some(ctx))?;

        let mut group = Vec::with_capacity(child_positions.len() + 2);
        group.push(make_group_offset(written.pos));
        group.extend(child_positions.into_iter().map(make_group_offset));
        if written.object_headers_pos != 0 {
            group.push(make_data_offset(written.object_headers_pos));
        }
        let pos = self.write_group(&group)?;

        let mut hasher = ContentHasher::new();
        if !obj.children.is_empty() {
            hasher.update_pair(child_hash);
        }
        hasher.update_pair(written.data_hash);
        let meta = obj.meta_data.serialize();
        if !meta.is_empty() {
            hasher.update(meta.as_bytes());
        }
        hasher.update(obj.name.as_bytes());

        Ok((pos, hasher.finalize()))
    }

    /// Serialize the headers of `children`, followed by the 32-byte hash suffix.
    pub(super) fn serialize_object_headers_with_hash(
        &mut self,
        children: &[OObject],
        data_hash: (u64, u64),
        child_hash: (u64, u64),
    ) -> Vec<u8> {
        let mut buf = Vec::new();

        for child in children {
            let name = child.name.as_bytes();
            write_with_hint(&mut buf, name.len() as u32, HINT_U32);
            buf.extend_from_slice(name);

            let meta_idx = self.add_indexed_metadata(&child.meta_data);
            write_with_hint(&mut buf, meta_idx as u32, HINT_U8);

            if meta_idx == INLINE_METADATA {
                let meta = child.meta_data.serialize();
                write_with_hint(&mut buf, meta.len() as u32, HINT_U32);
                buf.extend_from_slice(meta.as_bytes());
            }
        }

        for h in [data_hash.0, data_hash.1, child_hash.0, child_hash.1] {
            buf.extend_from_slice(&h.to_le_bytes());
        }

        buf
    }
}
