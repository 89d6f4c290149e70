//! `.vtp` PolyData reader.
//!
//! Reads points, polygon connectivity and point data. Vertices, lines and
//! strips are ignored. Multiple pieces are merged into one snapshot with
//! their point ids rebased.

use std::path::Path;

use roxmltree::Node;

use super::xml::{ArrayValues, DataArray, FileInfo, VtkDocument};
use crate::util::{Error, Result};

/// One decoded PolyData mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshSnapshot {
    /// Point positions, index = point id.
    pub points: Vec<[f64; 3]>,
    /// Point ids of every polygon, concatenated.
    pub connectivity: Vec<i64>,
    /// End offset of each polygon in `connectivity`.
    pub offsets: Vec<i64>,
    /// Per-point arrays.
    pub point_data: Vec<DataArray>,
    /// Name of the array designated as normals.
    pub normals_name: Option<String>,
}

impl MeshSnapshot {
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_polygons(&self) -> usize {
        self.offsets.len()
    }

    /// Point ids of polygon `index`.
    pub fn polygon(&self, index: usize) -> Result<&[i64]> {
        let start = match index {
            0 => 0,
            i => self.offsets[i - 1],
        };
        let end = self.offsets[index];
        usize::try_from(start)
            .ok()
            .zip(usize::try_from(end).ok())
            .and_then(|(s, e)| self.connectivity.get(s..e))
            .ok_or_else(|| Error::invalid(format!("polygon {index} has bad offsets {start}..{end}")))
    }

    /// Point array by name.
    pub fn point_array(&self, name: &str) -> Option<&DataArray> {
        self.point_data.iter().find(|a| a.name == name)
    }

    /// The normals array: the one designated by the `Normals` attribute of
    /// `PointData`, otherwise an array named `Normals`.
    pub fn normals(&self) -> Option<&DataArray> {
        self.normals_name
            .as_deref()
            .and_then(|name| self.point_array(name))
            .or_else(|| self.point_array("Normals"))
    }
}

/// Read a `.vtp` file.
pub fn read_poly_data(path: &Path) -> Result<MeshSnapshot> {
    let doc = VtkDocument::load(path)?;
    let xml = doc.parse()?;
    let info = doc.file_info(&xml)?;
    if info.kind != "PolyData" {
        return Err(Error::NotPolyData {
            path: path.to_path_buf(),
            kind: info.kind,
        });
    }

    let poly_data = xml
        .root_element()
        .children()
        .find(|n| n.has_tag_name("PolyData"))
        .ok_or_else(|| Error::missing_element(path, "PolyData"))?;

    let mut snapshot = MeshSnapshot::default();
    let mut first = true;
    for piece in poly_data.children().filter(|n| n.has_tag_name("Piece")) {
        let part = read_piece(&doc, &info, piece)?;
        merge_piece(&mut snapshot, part, first);
        first = false;
    }

    tracing::trace!(
        "{}: {} points, {} polygons",
        path.display(),
        snapshot.num_points(),
        snapshot.num_polygons()
    );
    Ok(snapshot)
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn data_arrays<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.has_tag_name("DataArray"))
}

fn read_piece(doc: &VtkDocument, info: &FileInfo, piece: Node<'_, '_>) -> Result<MeshSnapshot> {
    let mut snapshot = MeshSnapshot::default();

    if let Some(points) = child(piece, "Points").and_then(|n| data_arrays(n).next()) {
        let array = doc.read_data_array(info, points)?;
        if array.components != 3 {
            return Err(Error::InvalidComponents {
                array: "Points".into(),
                expected: 3,
                actual: array.components,
            });
        }
        snapshot.points = array
            .values
            .to_f64()
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
    }

    if let Some(polys) = child(piece, "Polys") {
        for node in data_arrays(polys) {
            match node.attribute("Name") {
                Some("connectivity") => {
                    snapshot.connectivity = doc.read_data_array(info, node)?.values.to_i64()?;
                }
                Some("offsets") => {
                    snapshot.offsets = doc.read_data_array(info, node)?.values.to_i64()?;
                }
                _ => {}
            }
        }
        // Offsets with a leading zero carry one entry more than polygons.
        let declared = piece
            .attribute("NumberOfPolys")
            .and_then(|n| n.trim().parse::<usize>().ok());
        if declared.is_some_and(|n| snapshot.offsets.len() == n + 1)
            && snapshot.offsets.first() == Some(&0)
        {
            snapshot.offsets.remove(0);
        }
    }

    if let Some(point_data) = child(piece, "PointData") {
        snapshot.normals_name = point_data.attribute("Normals").map(str::to_string);
        for node in data_arrays(point_data) {
            snapshot.point_data.push(doc.read_data_array(info, node)?);
        }
    }

    Ok(snapshot)
}

fn merge_piece(into: &mut MeshSnapshot, part: MeshSnapshot, first: bool) {
    if first {
        *into = part;
        return;
    }

    let point_base = into.points.len() as i64;
    let conn_base = into.connectivity.len() as i64;
    into.points.extend(part.points);
    into.connectivity.extend(part.connectivity.iter().map(|id| id + point_base));
    into.offsets.extend(part.offsets.iter().map(|o| o + conn_base));

    // Arrays missing from a later piece no longer cover every point.
    let mut others = part.point_data;
    into.point_data.retain_mut(|array| {
        match others.iter().position(|o| o.name == array.name && o.components == array.components) {
            Some(idx) => {
                let other = others.swap_remove(idx);
                append_values(&mut array.values, other.values);
                true
            }
            None => false,
        }
    });
    if into.normals_name.is_none() {
        into.normals_name = part.normals_name;
    }
}

fn append_values(into: &mut ArrayValues, other: ArrayValues) {
    let current = std::mem::replace(into, ArrayValues::Int(Vec::new()));
    *into = match (current, other) {
        (ArrayValues::Int(mut a), ArrayValues::Int(b)) => {
            a.extend(b);
            ArrayValues::Int(a)
        }
        (ArrayValues::Float(mut a), ArrayValues::Float(b)) => {
            a.extend(b);
            ArrayValues::Float(a)
        }
        (a, b) => {
            let mut merged = a.to_f64();
            merged.extend(b.to_f64());
            ArrayValues::Float(merged)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TWO_PIECES: &str = r#"<?xml version="1.0"?>
<VTKFile type="PolyData" version="1.0" byte_order="LittleEndian">
  <PolyData>
    <Piece NumberOfPoints="3" NumberOfPolys="1">
      <PointData Normals="N">
        <DataArray type="Float32" Name="N" NumberOfComponents="3" format="ascii">0 0 1 0 0 1 0 0 1</DataArray>
        <DataArray type="Float64" Name="Bnn" format="ascii">-2 0 2</DataArray>
      </PointData>
      <Points><DataArray type="Float32" NumberOfComponents="3" format="ascii">0 0 0 1 0 0 0 1 0</DataArray></Points>
      <Polys>
        <DataArray type="Int64" Name="connectivity" format="ascii">0 1 2</DataArray>
        <DataArray type="Int64" Name="offsets" format="ascii">3</DataArray>
      </Polys>
    </Piece>
    <Piece NumberOfPoints="3" NumberOfPolys="1">
      <PointData Normals="N">
        <DataArray type="Float32" Name="N" NumberOfComponents="3" format="ascii">0 1 0 0 1 0 0 1 0</DataArray>
      </PointData>
      <Points><DataArray type="Float32" NumberOfComponents="3" format="ascii">0 0 1 1 0 1 0 1 1</DataArray></Points>
      <Polys>
        <DataArray type="Int32" Name="connectivity" format="ascii">0 2 1</DataArray>
        <DataArray type="Int32" Name="offsets" format="ascii">0 3</DataArray>
      </Polys>
    </Piece>
  </PolyData>
</VTKFile>"#;

    #[test]
    fn test_merge_pieces() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("m.vtp");
        fs::write(&path, TWO_PIECES)?;

        let mesh = read_poly_data(&path)?;
        assert_eq!(mesh.num_points(), 6);
        assert_eq!(mesh.num_polygons(), 2);
        assert_eq!(mesh.polygon(1)?, &[3, 5, 4]);
        assert_eq!(mesh.normals().map(DataArray::num_tuples), Some(6));
        // Only the first piece has Bnn, so it is dropped.
        assert!(mesh.point_array("Bnn").is_none());
        Ok(())
    }

    #[test]
    fn test_rejects_other_dataset_types() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("u.vtp");
        fs::write(&path, r#"<VTKFile type="UnstructuredGrid"><UnstructuredGrid/></VTKFile>"#)?;
        let err = read_poly_data(&path).unwrap_err();
        assert!(matches!(err, Error::NotPolyData { ref kind, .. } if kind == "UnstructuredGrid"));
        Ok(())
    }

    #[test]
    fn test_normals_fallback_by_name() {
        let mesh = MeshSnapshot {
            point_data: vec![DataArray {
                name: "Normals".into(),
                components: 3,
                values: ArrayValues::Float(vec![0.0, 0.0, 1.0]),
            }],
            ..MeshSnapshot::default()
        };
        assert!(mesh.normals().is_some());
    }
}
