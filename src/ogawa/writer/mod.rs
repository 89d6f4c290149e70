//! Ogawa archive writer.
//!
//! Objects and properties are assembled in memory ([`OObject`], [`OProperty`])
//! and serialized bottom-up by [`OArchive::write_archive`], which also
//! de-duplicates identical sample payloads.

mod constants;
mod stream;
mod write_util;
mod object;
mod property;
mod archive;

pub mod schema;

pub use archive::OArchive;
pub use object::OObject;
pub use property::{OProperty, OPropertyData, OSample};

pub use schema::{
    OIndexedGeomParam,
    OPolyMesh, OPolyMeshSample,
    OXform,
};

#[cfg(test)]
mod tests;
