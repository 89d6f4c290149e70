//! Ogawa writer constants.

/// Library version recorded in written archives (1.8.10 => 10810).
pub(crate) const ALEMBIC_LIBRARY_VERSION: i32 = 10810;

/// Ogawa file format version.
pub(crate) const OGAWA_FILE_VERSION: i32 = 0;

/// Size of digest/key prefix in keyed data blocks.
pub(crate) const DATA_KEY_SIZE: usize = 16;

/// Size-hint values for header integers (1, 2 or 4 bytes).
pub(crate) const HINT_U8: u8 = 0;
pub(crate) const HINT_U16: u8 = 1;
pub(crate) const HINT_U32: u8 = 2;

/// Indexed metadata slot meaning "stored inline".
pub(crate) const INLINE_METADATA: u8 = 0xff;
