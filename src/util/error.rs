//! Error types for the converter.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for conversion operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Malformed XML in a VTK file
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Required element missing from a VTK XML file
    #[error("{path}: missing <{element}> element")]
    MissingElement { path: PathBuf, element: String },

    /// Required attribute missing from an element
    #[error("<{element}> is missing the '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String },

    /// Multi-block container without a usable dataset
    #[error("{0}: container does not reference any dataset")]
    MissingDataset(PathBuf),

    /// Dataset is not a polygonal surface
    #[error("{path}: expected PolyData, got {kind}")]
    NotPolyData { path: PathBuf, kind: String },

    /// Encoding, compressor or data type not handled by the reader
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Base64 payload could not be decoded
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid data structure in file
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// Polygon with a vertex count other than three
    #[error("Face {face} has {vertices} vertices; only triangles are supported")]
    NonTriangularFace { face: usize, vertices: usize },

    /// Point data carries no normals
    #[error("Mesh has no point normals")]
    MissingNormals,

    /// Array with the wrong number of components
    #[error("Array '{array}' has {actual} components, expected {expected}")]
    InvalidComponents { array: String, expected: usize, actual: usize },

    /// Point id referencing a point that does not exist
    #[error("Point index {index} out of range (count: {count})")]
    IndexOutOfRange { index: i64, count: usize },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive is frozen (finalized)
    #[error("Archive is frozen and cannot be modified")]
    Frozen,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create a missing element error.
    pub fn missing_element(path: impl Into<PathBuf>, element: &str) -> Self {
        Self::MissingElement { path: path.into(), element: element.to_string() }
    }

    /// Create a missing attribute error.
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Self::MissingAttribute { element: element.to_string(), attribute: attribute.to_string() }
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;
