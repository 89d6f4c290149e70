//! Utility types shared by the reader and writer sides.
//!
//! - [`PlainOldDataType`] - Enum of basic data types
//! - [`DataType`] - POD + extent (dimensionality)
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam

mod pod;
mod data_type;
mod error;
mod math;

pub use pod::*;
pub use data_type::*;
pub use error::*;
pub use math::*;
