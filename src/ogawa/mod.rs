//! Ogawa binary container, write side.
//!
//! Ogawa is the binary layout used by modern Alembic files (.abc).
//!
//! ## File Structure
//!
//! ```text
//! +------------------+
//! | Magic: "Ogawa"   |  5 bytes
//! +------------------+
//! | Frozen flag      |  1 byte (0x00 while writing, 0xFF once closed)
//! +------------------+
//! | Version          |  2 bytes (big-endian {0, 1})
//! +------------------+
//! | Root Group Pos   |  8 bytes (u64 LE)
//! +------------------+
//! | ... Data ...     |
//! +------------------+
//! ```

mod format;
pub mod writer;

pub use format::*;
pub use writer::*;
