//! Core layer - fundamental types shared by the archive writer.
//!
//! - [`TimeSampling`] - Time sampling for animated properties
//! - [`MetaData`] - Key-value metadata storage
//! - [`GeometryScope`] - Geom param scope tags
//! - [`ArraySampleContentKey`] / [`ContentHasher`] - content keys and hashes

mod time_sampling;
mod metadata;
mod sample;
mod digest;

pub use time_sampling::{TimeSampling, TimeSamplingType};
pub use metadata::MetaData;
pub use sample::GeometryScope;
pub use digest::{ArraySampleContentKey, ContentHasher, SampleDigest, compute_digest};
