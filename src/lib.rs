//! # vtk2abc
//!
//! Converts a time series of VTK polygonal surfaces into one animated
//! Alembic (.abc, Ogawa) archive.
//!
//! A `.pvd` manifest lists `(timestep, group, file)` records. Each group
//! becomes a transform with a `<group>Shape` PolyMesh child that receives one
//! sample per record: positions, triangles, face-varying normals, a
//! `visible` flag and, when the mesh carries one of the configured scalar
//! fields, a grayscale `colorSet1`.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (POD, DataType, errors, bounds)
//! - [`core`] - Time sampling, metadata, content keys
//! - [`ogawa`] - Ogawa archive writer and AbcGeom schema writers
//! - [`vtk`] - VTK XML readers (.pvd, .vtm, .vtp)
//! - [`convert`] - The conversion pipeline
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use vtk2abc::convert::{run, ConvertConfig};
//!
//! let summary = run(Path::new("run.pvd"), Path::new("run.abc"), &ConvertConfig::default())?;
//! for track in &summary.tracks {
//!     println!("{}: {} samples", track.group, track.mesh_samples);
//! }
//! # Ok::<(), vtk2abc::Error>(())
//! ```

pub mod util;
pub mod core;
pub mod ogawa;
pub mod vtk;
pub mod convert;

// Re-export commonly used types
pub use util::{DataType, PlainOldDataType, Error, Result};
pub use convert::{run, ConversionSummary, ConvertConfig};
