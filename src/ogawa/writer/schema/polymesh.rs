//! PolyMesh schema writer.
//!
//! Samples are stored under the `.geom` compound in the order AbcGeom's
//! `OPolyMeshSchema` creates them: `.selfBnds`, `P`, `.faceIndices`,
//! `.faceCounts`, then the optional `N` and `.arbGeomParams`.

use glam::Vec3;

use crate::core::{GeometryScope, MetaData};
use crate::util::{BBox3d, DataType};

use super::super::object::OObject;
use super::super::property::OProperty;

/// Schema name written into object and `.geom` metadata.
pub const POLYMESH_SCHEMA: &str = "AbcGeom_PolyMesh_v1";
const GEOM_BASE_SCHEMA: &str = "AbcGeom_GeomBase_v1";

/// PolyMesh sample data.
#[derive(Clone, Debug, Default)]
pub struct OPolyMeshSample {
    pub positions: Vec<Vec3>,
    pub face_counts: Vec<i32>,
    pub face_indices: Vec<i32>,
    /// Face-varying normals, one per face corner.
    pub normals: Option<Vec<Vec3>>,
}

impl OPolyMeshSample {
    /// Create a sample with positions and topology.
    pub fn new(positions: Vec<Vec3>, face_counts: Vec<i32>, face_indices: Vec<i32>) -> Self {
        Self {
            positions,
            face_counts,
            face_indices,
            normals: None,
        }
    }

    /// Attach face-varying normals.
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }
}

/// PolyMesh schema writer.
pub struct OPolyMesh {
    object: OObject,
    geom: OProperty,
    arb_geom_params: Option<OProperty>,
    time_sampling_index: u32,
    num_samples: usize,
}

impl OPolyMesh {
    /// Create a mesh whose animated properties use `time_sampling_index`.
    pub fn new(name: &str, time_sampling_index: u32) -> Self {
        let object = OObject::new(name).with_meta_data(MetaData::from_pairs(&[
            (MetaData::SCHEMA_KEY, POLYMESH_SCHEMA),
            (MetaData::SCHEMA_BASE_KEY, GEOM_BASE_SCHEMA),
            ("schemaObjTitle", "AbcGeom_PolyMesh_v1:.geom"),
        ]));

        let geom = OProperty::compound(".geom").with_meta_data(MetaData::from_pairs(&[
            (MetaData::SCHEMA_KEY, POLYMESH_SCHEMA),
            (MetaData::SCHEMA_BASE_KEY, GEOM_BASE_SCHEMA),
        ]));

        Self {
            object,
            geom,
            arb_geom_params: None,
            time_sampling_index,
            num_samples: 0,
        }
    }

    /// Object name.
    pub fn name(&self) -> &str {
        &self.object.name
    }

    /// Number of samples added so far.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Add a sample (positions, topology, bounds and optional normals).
    pub fn add_sample(&mut self, sample: &OPolyMeshSample) {
        let ts = self.time_sampling_index;

        let bounds = BBox3d::from_points(&sample.positions).to_array();
        self.geom_child(".selfBnds", || {
            OProperty::scalar(".selfBnds", DataType::BOX3D)
                .with_meta_data(MetaData::from_pairs(&[(MetaData::INTERPRETATION_KEY, "box")]))
                .with_time_sampling(ts)
        }, |p| p.add_scalar_pod(&bounds));

        self.geom_child("P", || {
            OProperty::array("P", DataType::POINT3F)
                .with_meta_data(MetaData::from_pairs(&[(MetaData::INTERPRETATION_KEY, "point")]))
                .with_time_sampling(ts)
        }, |p| p.add_array_pod(&sample.positions));

        self.geom_child(".faceIndices", || {
            OProperty::array(".faceIndices", DataType::INT32).with_time_sampling(ts)
        }, |p| p.add_array_pod(&sample.face_indices));

        self.geom_child(".faceCounts", || {
            OProperty::array(".faceCounts", DataType::INT32).with_time_sampling(ts)
        }, |p| p.add_array_pod(&sample.face_counts));

        if let Some(normals) = &sample.normals {
            self.geom_child("N", || {
                OProperty::array("N", DataType::NORMAL3F)
                    .with_meta_data(MetaData::from_pairs(&[
                        ("arrayExtent", "1"),
                        ("geoScope", GeometryScope::FaceVarying.as_str()),
                        (MetaData::INTERPRETATION_KEY, "normal"),
                        ("isGeomParam", "true"),
                        ("podExtent", "3"),
                        ("podName", "float32_t"),
                    ]))
                    .with_time_sampling(ts)
            }, |p| p.add_array_pod(normals));
        }

        self.num_samples += 1;
    }

    /// Add an arbitrary geometry parameter under `.geom/.arbGeomParams`.
    pub fn add_arb_geom_param(&mut self, prop: OProperty) {
        self.arb_geom_params
            .get_or_insert_with(|| OProperty::compound(".arbGeomParams"))
            .add_child(prop);
    }

    fn geom_child(
        &mut self,
        name: &str,
        make: impl FnOnce() -> OProperty,
        update: impl FnOnce(&mut OProperty),
    ) {
        if let Some(prop) = self.geom.child_or_insert_with(name, make) {
            update(prop);
        }
    }

    /// Build the object.
    pub fn build(mut self) -> OObject {
        if let Some(arb) = self.arb_geom_params {
            self.geom.add_child(arb);
        }
        self.object.add_property(self.geom);
        self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> OPolyMeshSample {
        OPolyMeshSample::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![3],
            vec![0, 1, 2],
        )
        .with_normals(vec![Vec3::Z; 3])
    }

    #[test]
    fn test_geom_layout() {
        let mut mesh = OPolyMesh::new("meshShape", 1);
        mesh.add_sample(&triangle());
        mesh.add_sample(&triangle());
        assert_eq!(mesh.num_samples(), 2);

        let obj = mesh.build();
        assert_eq!(obj.meta_data.schema(), Some(POLYMESH_SCHEMA));
        let geom = obj.property(".geom").expect("geom compound");

        let names: Vec<&str> = match &geom.data {
            crate::ogawa::writer::OPropertyData::Compound(c) => {
                c.iter().map(|p| p.name.as_str()).collect()
            }
            _ => Vec::new(),
        };
        assert_eq!(names, [".selfBnds", "P", ".faceIndices", ".faceCounts", "N"]);

        let n = geom.child("N").expect("normals");
        assert_eq!(n.meta_data.get("geoScope"), Some("fvr"));
        assert_eq!(n.num_samples(), 2);
        assert_eq!(n.time_sampling_index, 1);
    }

    #[test]
    fn test_self_bounds() {
        let mut mesh = OPolyMesh::new("m", 0);
        mesh.add_sample(&triangle());
        let obj = mesh.build();
        let bnds = obj
            .property(".geom")
            .and_then(|g| g.child(".selfBnds"))
            .expect("bounds");
        let expected: [f64; 6] = [0.0, 0.0, 0.0, 1.0, 1.0, 0.0];
        assert_eq!(bnds.scalar_samples()[0], bytemuck::bytes_of(&expected));
    }

    #[test]
    fn test_arb_geom_params_inside_geom() {
        let mut mesh = OPolyMesh::new("m", 0);
        mesh.add_sample(&triangle());
        mesh.add_arb_geom_param(OProperty::compound("colorSet1"));
        let obj = mesh.build();
        assert!(obj.property(".arbGeomParams").is_none());
        let arb = obj
            .property(".geom")
            .and_then(|g| g.child(".arbGeomParams"))
            .expect("arbGeomParams");
        assert!(arb.child("colorSet1").is_some());
    }
}
