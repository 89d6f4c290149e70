//! Geometry scope tags for geom params.

/// Scope/extent of data in a geom schema sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeometryScope {
    /// Constant for entire object.
    #[default]
    Constant,
    /// Per-face varying.
    Uniform,
    /// Per-vertex.
    Varying,
    /// Per-face-vertex.
    Vertex,
    /// Per-face-corner.
    FaceVarying,
}

impl GeometryScope {
    /// Convert to short string for `geoScope` metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "con",
            Self::Uniform => "uni",
            Self::Varying => "var",
            Self::Vertex => "vtx",
            Self::FaceVarying => "fvr",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_scope() {
        assert_eq!(GeometryScope::FaceVarying.as_str(), "fvr");
        assert_eq!(GeometryScope::Vertex.as_str(), "vtx");
        assert_eq!(GeometryScope::default(), GeometryScope::Constant);
    }
}
