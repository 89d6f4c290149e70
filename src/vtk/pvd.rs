//! `.pvd` collection manifest reader.

use std::path::{Path, PathBuf};

use super::resolve_relative;
use super::xml::VtkDocument;
use crate::util::{Error, Result};

/// One `DataSet` entry of a collection manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestRecord {
    /// Timestep as written in the manifest; compared as a string.
    pub timestep: String,
    /// Group name, i.e. the animated object the record belongs to.
    pub group: String,
    /// Raw `file` attribute.
    pub file: String,
    /// `file` resolved against the manifest's directory.
    pub path: PathBuf,
}

/// Read every `DataSet` record of a manifest, in document order.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestRecord>> {
    let doc = VtkDocument::load(path)?;
    let xml = doc.parse()?;

    let root = xml.root_element();
    if !root.has_tag_name("VTKFile") {
        return Err(Error::missing_element(path, "VTKFile"));
    }
    let collection = root
        .children()
        .find(|n| n.has_tag_name("Collection"))
        .ok_or_else(|| Error::missing_element(path, "Collection"))?;

    let mut records = Vec::new();
    for node in collection.children().filter(|n| n.has_tag_name("DataSet")) {
        let attr = |name: &str| {
            node.attribute(name)
                .map(str::to_string)
                .ok_or_else(|| Error::missing_attribute("DataSet", name))
        };
        let timestep = attr("timestep")?;
        let group = attr("group")?;
        let file = attr("file")?;
        let resolved = resolve_relative(path, &file);

        records.push(ManifestRecord {
            timestep,
            group,
            file,
            path: resolved,
        });
    }

    tracing::debug!("{}: {} records", path.display(), records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).expect("write fixture");
        path
    }

    #[test]
    fn test_records_in_order() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write(&dir, "run.pvd", r#"<?xml version="1.0"?>
<VTKFile type="Collection" version="0.1">
  <Collection>
    <DataSet timestep="0.5" group="b" part="0" file="b/b_0.vtm"/>
    <DataSet timestep="0.5" group="a" part="0" file="a/a_0.vtm"/>
    <DataSet timestep="1.0" group="b" part="0" file="b/b_1.vtm"/>
  </Collection>
</VTKFile>"#);

        let records = read_manifest(&path)?;
        let groups: Vec<&str> = records.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, ["b", "a", "b"]);
        assert_eq!(records[2].timestep, "1.0");
        assert_eq!(records[1].file, "a/a_0.vtm");
        assert_eq!(records[1].path, dir.path().join("a/a_0.vtm"));
        Ok(())
    }

    #[test]
    fn test_missing_collection() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write(&dir, "bad.pvd", r#"<VTKFile type="Collection"></VTKFile>"#);
        let err = read_manifest(&path).unwrap_err();
        assert!(matches!(err, Error::MissingElement { ref element, .. } if element == "Collection"));

        let path = write(&dir, "bad2.pvd", r#"<Other/>"#);
        let err = read_manifest(&path).unwrap_err();
        assert!(matches!(err, Error::MissingElement { ref element, .. } if element == "VTKFile"));
        Ok(())
    }

    #[test]
    fn test_missing_attribute() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write(&dir, "bad.pvd", r#"<VTKFile><Collection>
            <DataSet timestep="0" file="x.vtm"/>
        </Collection></VTKFile>"#);
        let err = read_manifest(&path).unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { ref attribute, .. } if attribute == "group"));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = read_manifest(Path::new("/nonexistent/run.pvd")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
