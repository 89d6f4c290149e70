//! Ogawa object writer types.

use crate::core::MetaData;

use super::property::OProperty;

/// Object for writing to archive.
#[derive(Clone, Debug)]
pub struct OObject {
    /// Object name.
    pub name: String,
    /// Object metadata.
    pub meta_data: MetaData,
    /// Child objects.
    pub children: Vec<OObject>,
    /// Properties of the object's top compound.
    pub properties: Vec<OProperty>,
}

impl OObject {
    /// Create a new object.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            meta_data: MetaData::new(),
            children: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Set metadata.
    pub fn with_meta_data(mut self, md: MetaData) -> Self {
        self.meta_data = md;
        self
    }

    /// Add a child object.
    pub fn add_child(&mut self, child: OObject) {
        self.children.push(child);
    }

    /// Add a property.
    pub fn add_property(&mut self, prop: OProperty) {
        self.properties.push(prop);
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&OObject> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Find a top-compound property by name.
    pub fn property(&self, name: &str) -> Option<&OProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}
