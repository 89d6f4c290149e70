use super::*;
use crate::core::{GeometryScope, TimeSampling};
use crate::ogawa::format::{
    extract_offset, is_data_offset, FROZEN_FLAG, FROZEN_OFFSET, HEADER_SIZE, OGAWA_MAGIC,
    ROOT_POS_OFFSET, VERSION_OFFSET,
};
use crate::util::DataType;
use glam::Vec3;
use tempfile::NamedTempFile;

fn read_u64(bytes: &[u8], pos: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[pos..pos + 8]);
    u64::from_le_bytes(buf)
}

/// Child offsets of the group at `pos`.
fn read_group(bytes: &[u8], pos: u64) -> Vec<u64> {
    let pos = pos as usize;
    let count = read_u64(bytes, pos) as usize;
    (0..count).map(|i| read_u64(bytes, pos + 8 + i * 8)).collect()
}

/// Payload of the data block at `offset`.
fn read_data(bytes: &[u8], offset: u64) -> &[u8] {
    assert!(is_data_offset(offset));
    let pos = extract_offset(offset) as usize;
    if pos == 0 {
        return &[];
    }
    let size = read_u64(bytes, pos) as usize;
    &bytes[pos + 8..pos + 8 + size]
}

fn triangle(offset: f32) -> OPolyMeshSample {
    OPolyMeshSample::new(
        vec![Vec3::splat(offset), Vec3::X, Vec3::Y],
        vec![3],
        vec![0, 1, 2],
    )
    .with_normals(vec![Vec3::Z; 3])
}

#[test]
fn test_write_empty_archive() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let path = temp.path();

    let archive = OArchive::create(path)?;
    archive.close()?;

    let bytes = std::fs::read(path)?;
    assert!(bytes.len() > HEADER_SIZE);
    assert_eq!(&bytes[0..5], OGAWA_MAGIC);
    assert_eq!(bytes[FROZEN_OFFSET], FROZEN_FLAG);
    assert_eq!(bytes[VERSION_OFFSET], 0);
    assert_eq!(bytes[VERSION_OFFSET + 1], 1);

    let root = read_group(&bytes, read_u64(&bytes, ROOT_POS_OFFSET));
    assert_eq!(root.len(), 6);
    assert!(!is_data_offset(root[2]));

    Ok(())
}

#[test]
fn test_archive_metadata_and_time_samplings() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let path = temp.path();

    let mut archive = OArchive::create(path)?;
    archive.set_app_name("vtk2abc");
    archive.set_user_description("Exported from: frames.pvd");
    let ts = archive.add_time_sampling(TimeSampling::from_fps(24.0, 0.0));
    assert_eq!(ts, 1);
    assert_eq!(archive.add_time_sampling(TimeSampling::from_fps(24.0, 0.0)), 1);

    let mut mesh = OPolyMesh::new("meshShape", ts);
    mesh.add_sample(&triangle(0.0));
    mesh.add_sample(&triangle(0.25));
    let mut xform = OXform::new("mesh");
    xform.add_child(mesh.build());

    let mut top = OObject::new("");
    top.add_child(xform.build());
    archive.write_archive(&top)?;
    assert_eq!(archive.max_samples(1), Some(2));
    archive.close()?;

    let bytes = std::fs::read(path)?;
    let root = read_group(&bytes, read_u64(&bytes, ROOT_POS_OFFSET));

    let meta = std::str::from_utf8(read_data(&bytes, root[3]))?;
    assert!(meta.contains("_ai_Application=vtk2abc"));
    assert!(meta.contains("_ai_Description=Exported from: frames.pvd"));
    assert!(meta.contains("_ai_AlembicVersion=Alembic 1.8.10"));

    // Identity: max 1 sample, tpc 1.0, one stored time. Uniform: 2 samples, 1/24.
    let ts_data = read_data(&bytes, root[4]);
    assert_eq!(ts_data.len(), 2 * (4 + 8 + 4 + 8));
    let uniform = &ts_data[24..];
    assert_eq!(u32::from_le_bytes([uniform[0], uniform[1], uniform[2], uniform[3]]), 2);
    let mut tpc = [0u8; 8];
    tpc.copy_from_slice(&uniform[4..12]);
    assert!((f64::from_le_bytes(tpc) - 1.0 / 24.0).abs() < 1e-12);

    Ok(())
}

#[test]
fn test_identical_payloads_are_shared() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut archive = OArchive::create(temp.path())?;

    let mut top = OObject::new("");
    for name in ["a", "b"] {
        let mut mesh = OPolyMesh::new(&format!("{name}Shape"), 0);
        mesh.add_sample(&triangle(0.0));
        let mut xform = OXform::new(name);
        xform.add_child(mesh.build());
        top.add_child(xform.build());
    }

    archive.write_archive(&top)?;
    // Second mesh reuses bounds, P, indices, counts and N.
    assert!(archive.dedup_hits() >= 5);
    assert!(archive.is_frozen());
    assert!(archive.write_archive(&top).is_err());
    Ok(())
}

#[test]
fn test_top_scalar_property() -> crate::util::Result<()> {
    let temp = NamedTempFile::new()?;
    let mut archive = OArchive::create(temp.path())?;
    let ts = archive.add_time_sampling(TimeSampling::from_fps(24.0, 0.0));

    let mut samples = OProperty::scalar(&format!("{ts}.samples"), DataType::UINT32);
    samples.add_scalar_pod(&2u32);

    let mut colors = OIndexedGeomParam::new(
        "colorSet1",
        DataType::COLOR3F,
        GeometryScope::FaceVarying,
        "rgb",
        ts,
    )
    .with_meta("mayaColorSet", "1");
    colors.add_sample(&[[0.0f32, 0.0, 0.0], [1.0, 1.0, 1.0]], &[0, 1, 1]);
    let mut mesh = OPolyMesh::new("mShape", ts);
    mesh.add_sample(&triangle(0.0));
    mesh.add_arb_geom_param(colors.into_property());

    let mut top = OObject::new("");
    top.add_property(samples);
    top.add_child(mesh.build());
    archive.write_archive(&top)?;
    archive.close()?;

    let bytes = std::fs::read(temp.path())?;
    let root = read_group(&bytes, read_u64(&bytes, ROOT_POS_OFFSET));
    let top_group = read_group(&bytes, extract_offset(root[2]));
    // Top compound, one child object, object headers.
    assert_eq!(top_group.len(), 3);

    // The top compound holds one property group plus its headers.
    let top_props = read_group(&bytes, extract_offset(top_group[0]));
    assert_eq!(top_props.len(), 2);
    let samples = read_group(&bytes, extract_offset(top_props[0]));
    assert_eq!(samples.len(), 1);
    // Keyed block: 16-byte content key, then the value.
    let payload = read_data(&bytes, samples[0]);
    assert_eq!(&payload[16..], &2u32.to_le_bytes());
    let headers = read_data(&bytes, top_props[1]);
    assert!(headers.windows(9).any(|w| w == b"1.samples"));

    let indexed = read_data(&bytes, root[5]);
    let text = String::from_utf8_lossy(indexed);
    assert!(text.contains("mayaColorSet=1"));
    Ok(())
}
