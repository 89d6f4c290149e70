//! Ogawa format constants and child-offset encoding.

/// Magic bytes at the start of an Ogawa file.
pub const OGAWA_MAGIC: &[u8; 5] = b"Ogawa";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Offset of the frozen flag in the header.
pub const FROZEN_OFFSET: usize = 5;

/// Offset of the version in the header.
pub const VERSION_OFFSET: usize = 6;

/// Offset of the root group position in the header.
pub const ROOT_POS_OFFSET: usize = 8;

/// Current Ogawa format version.
pub const CURRENT_VERSION: u16 = 1;

/// Frozen flag value once the archive is finalized.
pub const FROZEN_FLAG: u8 = 0xFF;

/// Frozen flag value while the archive is still being written.
pub const NOT_FROZEN_FLAG: u8 = 0x00;

/// Bit marking a child offset as data (set) or group (clear).
pub const TYPE_FLAG_MASK: u64 = 1 << 63;

/// Mask to extract the actual offset from a child pointer.
pub const OFFSET_MASK: u64 = !(1 << 63);

/// Empty data child: offset 0 with the data bit set.
/// Written in place of dimensions when they follow from the data size.
pub const EMPTY_DATA: u64 = TYPE_FLAG_MASK;

/// Check if a child offset represents data.
#[inline]
pub const fn is_data_offset(offset: u64) -> bool {
    (offset & TYPE_FLAG_MASK) != 0
}

/// Extract the actual position from a child offset.
#[inline]
pub const fn extract_offset(offset: u64) -> u64 {
    offset & OFFSET_MASK
}

/// Create a group child offset.
#[inline]
pub const fn make_group_offset(pos: u64) -> u64 {
    pos & OFFSET_MASK
}

/// Create a data child offset.
#[inline]
pub const fn make_data_offset(pos: u64) -> u64 {
    pos | TYPE_FLAG_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        let group_offset = make_group_offset(0x1234);
        assert!(!is_data_offset(group_offset));
        assert_eq!(group_offset, 0x1234);

        let data_offset = make_data_offset(0x5678);
        assert!(is_data_offset(data_offset));
        assert_eq!(extract_offset(data_offset), 0x5678);
        assert_eq!(data_offset, 0x8000000000005678);
    }

    #[test]
    fn test_empty_data_marker() {
        assert!(is_data_offset(EMPTY_DATA));
        assert_eq!(extract_offset(EMPTY_DATA), 0);
    }
}
