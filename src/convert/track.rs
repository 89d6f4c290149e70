//! Per-group animated object: transform, mesh, visibility and colors.

use crate::core::GeometryScope;
use crate::ogawa::writer::{OIndexedGeomParam, OObject, OPolyMesh, OPolyMeshSample, OProperty, OXform};
use crate::util::DataType;

use super::extract::{ColorSample, GeometrySample};

/// Visibility values stored in the `visible` property.
const VISIBLE: i8 = -1;
const HIDDEN: i8 = 0;

/// Accumulates the samples of one group until the archive is written.
pub struct ObjectTrack {
    name: String,
    xform: OXform,
    mesh: OPolyMesh,
    visible: OProperty,
    visibility: Vec<bool>,
    colors: Option<OIndexedGeomParam>,
    color_set_name: String,
    time_sampling_index: u32,
}

impl ObjectTrack {
    /// Create the transform `<name>`, its `<name>Shape` mesh and the
    /// `visible` property.
    pub fn new(name: &str, time_sampling_index: u32, color_set_name: &str) -> Self {
        Self {
            name: name.to_string(),
            xform: OXform::new(name),
            mesh: OPolyMesh::new(&format!("{name}Shape"), time_sampling_index),
            visible: OProperty::scalar("visible", DataType::INT8)
                .with_time_sampling(time_sampling_index),
            visibility: Vec::new(),
            colors: None,
            color_set_name: color_set_name.to_string(),
            time_sampling_index,
        }
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append one mesh sample and its visibility.
    pub fn append_mesh_sample(&mut self, geometry: &GeometrySample, visible: bool) {
        let sample = OPolyMeshSample::new(
            geometry.points.clone(),
            geometry.face_counts.clone(),
            geometry.face_indices.clone(),
        )
        .with_normals(geometry.normals.clone());
        self.mesh.add_sample(&sample);

        self.visible
            .add_scalar_pod(&if visible { VISIBLE } else { HIDDEN });
        self.visibility.push(visible);
    }

    /// Append one color sample; the color set is created on first use.
    pub fn append_color_sample(&mut self, color: &ColorSample) {
        let ts = self.time_sampling_index;
        let name = &self.color_set_name;
        let colors = self.colors.get_or_insert_with(|| {
            tracing::debug!("creating color set {}", name);
            OIndexedGeomParam::new(name, DataType::COLOR3F, GeometryScope::FaceVarying, "rgb", ts)
                .with_meta("mayaColorSet", "1")
        });
        colors.add_sample(&color.colors, &color.indices);
    }

    pub fn num_mesh_samples(&self) -> usize {
        self.mesh.num_samples()
    }

    pub fn num_color_samples(&self) -> usize {
        self.colors.as_ref().map_or(0, OIndexedGeomParam::num_samples)
    }

    /// Visibility of every mesh sample so far.
    pub fn visibility(&self) -> &[bool] {
        &self.visibility
    }

    /// Build the transform object with the mesh as its child.
    pub fn build(self) -> OObject {
        let mut mesh = self.mesh;
        if let Some(colors) = self.colors {
            mesh.add_arb_geom_param(colors.into_property());
        }

        let mut xform = self.xform;
        xform.add_property(self.visible);
        xform.add_child(mesh.build());
        xform.build()
    }
}
