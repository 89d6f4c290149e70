//! Schema writers (AbcGeom).
//!
//! Higher-level writers that lay out objects and properties the way
//! AbcGeom readers expect them, on top of the Ogawa core types.

pub mod geom_param;
pub mod polymesh;
pub mod xform;

pub use geom_param::OIndexedGeomParam;
pub use polymesh::{OPolyMesh, OPolyMeshSample};
pub use xform::OXform;
