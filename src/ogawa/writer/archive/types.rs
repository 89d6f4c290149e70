//! Shared types for archive writing.

use super::super::object::OObject;

/// Context for emitting object headers inside the property write pass.
///
/// Object headers embed the data hash of the parent's properties, so the
/// children and their combined hash travel alongside the property list.
pub(super) struct ObjectHeadersContext<'a> {
    pub(super) children: &'a [OObject],
    pub(super) child_hash: (u64, u64),
}

/// Accumulated property sample state, used for header writing.
#[derive(Default)]
pub(super) struct PropertySampleState {
    /// Child offsets of the property group (data blocks, dims blocks).
    pub(super) children: Vec<u64>,
    /// Running hash over every sample's digest.
    pub(super) sample_hash: Option<(u64, u64)>,
    pub(super) first_changed_index: u32,
    pub(super) last_changed_index: u32,
    pub(super) is_homogenous: bool,
    pub(super) num_samples: u32,
}

impl PropertySampleState {
    pub(super) fn new(num_samples: u32) -> Self {
        Self {
            num_samples,
            is_homogenous: true,
            ..Self::default()
        }
    }

    /// Record that `sample_index` carries data different from its predecessor.
    pub(super) fn mark_changed(&mut self, sample_index: u32) {
        if sample_index != 0 {
            if self.first_changed_index == 0 {
                self.first_changed_index = sample_index;
            }
            self.last_changed_index = sample_index;
        }
    }

    /// Samples the time sampling table needs to account for.
    pub(super) fn effective_samples(&self) -> u32 {
        if self.last_changed_index == 0 && self.num_samples > 0 {
            1
        } else {
            self.num_samples
        }
    }

    /// Fold one sample digest into the running hash.
    pub(super) fn push_hash(&mut self, digest: (u64, u64)) {
        self.sample_hash = Some(match self.sample_hash {
            None => digest,
            Some(prev) => crate::core::ContentHasher::mix(prev, digest),
        });
    }
}

/// Result of writing one compound's property list.
pub(super) struct WrittenProperties {
    /// Position of the property group.
    pub(super) pos: u64,
    /// Hash over every property hash in the list.
    pub(super) data_hash: (u64, u64),
    /// Position of the object headers block, 0 when none was written.
    pub(super) object_headers_pos: u64,
    /// Per-property hashes in creation order.
    pub(super) prop_hashes: Vec<(u64, u64)>,
}
