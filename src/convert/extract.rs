//! Geometry and color extraction from a decoded mesh.
//!
//! Everything is validated here, so a frame that fails leaves the tracks
//! untouched.

use glam::Vec3;

use super::color::derive_colors;
use super::config::ConvertConfig;
use crate::util::{Error, Result};
use crate::vtk::{DataArray, MeshSnapshot};

/// Triangle mesh sample with face-varying normals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometrySample {
    pub points: Vec<Vec3>,
    /// Point id of every face corner.
    pub face_indices: Vec<i32>,
    /// Corner count of every face (always 3).
    pub face_counts: Vec<i32>,
    /// Normal of every face corner.
    pub normals: Vec<Vec3>,
}

impl GeometrySample {
    pub fn num_faces(&self) -> usize {
        self.face_counts.len()
    }
}

/// Per-point colors, indexed by face corner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorSample {
    /// Point id of every face corner (same as the geometry's face indices).
    pub indices: Vec<u32>,
    /// One color per point.
    pub colors: Vec<Vec3>,
}

/// Everything extracted from one mesh snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedFrame {
    pub geometry: GeometrySample,
    pub color: Option<ColorSample>,
    /// Field the colors were derived from.
    pub color_field: Option<String>,
}

/// Extract geometry, normals and the optional color signal.
pub fn extract(snapshot: &MeshSnapshot, config: &ConvertConfig) -> Result<ExtractedFrame> {
    let num_points = snapshot.num_points();

    let points: Vec<Vec3> = snapshot
        .points
        .iter()
        .map(|p| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32))
        .collect();

    let mut face_indices = Vec::with_capacity(snapshot.num_polygons() * 3);
    let mut face_counts = Vec::with_capacity(snapshot.num_polygons());
    for face in 0..snapshot.num_polygons() {
        let ids = snapshot.polygon(face)?;
        if ids.len() != 3 {
            return Err(Error::NonTriangularFace { face, vertices: ids.len() });
        }
        for &id in ids {
            if id < 0 || id as usize >= num_points {
                return Err(Error::IndexOutOfRange { index: id, count: num_points });
            }
            face_indices.push(id as i32);
        }
        face_counts.push(3);
    }

    let normals_array = snapshot.normals().ok_or(Error::MissingNormals)?;
    let point_normals = per_point(normals_array, 3, num_points)?;
    let normals = face_indices
        .iter()
        .map(|&i| {
            let n = &point_normals[i as usize * 3..i as usize * 3 + 3];
            Vec3::new(n[0] as f32, n[1] as f32, n[2] as f32)
        })
        .collect();

    let mut color = None;
    let mut color_field = None;
    if let Some(field) = config
        .color_fields
        .iter()
        .find_map(|name| snapshot.point_array(name))
    {
        let values = per_point(field, 1, num_points)?;
        let [lo, hi] = config.color_range;
        color = Some(ColorSample {
            indices: face_indices.iter().map(|&i| i as u32).collect(),
            colors: derive_colors(&values, lo, hi),
        });
        color_field = Some(field.name.clone());
    }

    Ok(ExtractedFrame {
        geometry: GeometrySample {
            points,
            face_indices,
            face_counts,
            normals,
        },
        color,
        color_field,
    })
}

/// Values of a per-point array, checked for component and tuple counts.
fn per_point(array: &DataArray, components: usize, num_points: usize) -> Result<Vec<f64>> {
    if array.components != components {
        return Err(Error::InvalidComponents {
            array: array.name.clone(),
            expected: components,
            actual: array.components,
        });
    }
    if array.num_tuples() != num_points {
        return Err(Error::invalid(format!(
            "array '{}' has {} tuples for {} points",
            array.name,
            array.num_tuples(),
            num_points
        )));
    }
    Ok(array.values.to_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vtk::ArrayValues;

    fn array(name: &str, components: usize, values: Vec<f64>) -> DataArray {
        DataArray {
            name: name.into(),
            components,
            values: ArrayValues::Float(values),
        }
    }

    /// Two triangles over four points, normals (0,0,i) for point i.
    fn quad_as_triangles() -> MeshSnapshot {
        MeshSnapshot {
            points: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            connectivity: vec![0, 1, 2, 0, 2, 3],
            offsets: vec![3, 6],
            point_data: vec![array(
                "Normals",
                3,
                vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0],
            )],
            normals_name: Some("Normals".into()),
        }
    }

    #[test]
    fn test_face_varying_expansion() -> Result<()> {
        let frame = extract(&quad_as_triangles(), &ConvertConfig::default())?;
        let geom = &frame.geometry;
        assert_eq!(geom.points.len(), 4);
        assert_eq!(geom.face_indices, [0, 1, 2, 0, 2, 3]);
        assert_eq!(geom.face_counts, [3, 3]);
        assert_eq!(geom.normals.len(), 6);
        let z: Vec<f32> = geom.normals.iter().map(|n| n.z).collect();
        assert_eq!(z, [0.0, 1.0, 2.0, 0.0, 2.0, 3.0]);
        assert!(frame.color.is_none());
        Ok(())
    }

    #[test]
    fn test_color_priority_and_expansion() -> Result<()> {
        let mut mesh = quad_as_triangles();
        mesh.point_data.push(array("WeylB_NN_AhB.dump", 1, vec![1.3; 4]));
        mesh.point_data.push(array("WeylB_NN_AhA.dump", 1, vec![-1.3, 0.0, 1.3, 5.0]));

        let frame = extract(&mesh, &ConvertConfig::default())?;
        assert_eq!(frame.color_field.as_deref(), Some("WeylB_NN_AhA.dump"));
        let color = frame.color.expect("color sample");
        assert_eq!(color.colors.len(), 4);
        assert_eq!(color.indices, [0, 1, 2, 0, 2, 3]);
        assert_eq!(color.colors[0], Vec3::ZERO);
        assert_eq!(color.colors[1], Vec3::splat(0.5));
        assert_eq!(color.colors[3], Vec3::ONE);
        Ok(())
    }

    #[test]
    fn test_quad_rejected() {
        let mut mesh = quad_as_triangles();
        mesh.connectivity = vec![0, 1, 2, 3];
        mesh.offsets = vec![4];
        let err = extract(&mesh, &ConvertConfig::default()).unwrap_err();
        assert!(matches!(err, Error::NonTriangularFace { face: 0, vertices: 4 }));
    }

    #[test]
    fn test_missing_normals() {
        let mut mesh = quad_as_triangles();
        mesh.point_data.clear();
        mesh.normals_name = None;
        assert!(matches!(
            extract(&mesh, &ConvertConfig::default()),
            Err(Error::MissingNormals)
        ));
    }

    #[test]
    fn test_bad_arrays() {
        let mut mesh = quad_as_triangles();
        mesh.connectivity[5] = 9;
        assert!(matches!(
            extract(&mesh, &ConvertConfig::default()),
            Err(Error::IndexOutOfRange { index: 9, count: 4 })
        ));

        let mut mesh = quad_as_triangles();
        mesh.point_data.push(array("Bnn", 3, vec![0.0; 12]));
        assert!(matches!(
            extract(&mesh, &ConvertConfig::default()),
            Err(Error::InvalidComponents { expected: 1, actual: 3, .. })
        ));

        let mut mesh = quad_as_triangles();
        mesh.point_data[0] = array("Normals", 3, vec![0.0; 9]);
        assert!(matches!(
            extract(&mesh, &ConvertConfig::default()),
            Err(Error::InvalidStructure(_))
        ));
    }
}
