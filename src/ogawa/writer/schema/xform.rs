//! Xform schema writer.
//!
//! Only constant identity transforms are written: the `.xform` compound is
//! present with no operations, which readers treat as identity.

use crate::core::MetaData;

use super::super::object::OObject;
use super::super::property::OProperty;

/// Schema name written into object and `.xform` metadata.
pub const XFORM_SCHEMA: &str = "AbcGeom_Xform_v3";

/// Xform schema writer.
pub struct OXform {
    object: OObject,
    user_properties: Vec<OProperty>,
}

impl OXform {
    /// Create new identity Xform.
    pub fn new(name: &str) -> Self {
        let object = OObject::new(name).with_meta_data(MetaData::from_pairs(&[
            (MetaData::SCHEMA_KEY, XFORM_SCHEMA),
            ("schemaObjTitle", "AbcGeom_Xform_v3:.xform"),
        ]));

        Self {
            object,
            user_properties: Vec::new(),
        }
    }

    /// Object name.
    pub fn name(&self) -> &str {
        &self.object.name
    }

    /// Add a property to the object's top compound, next to `.xform`.
    pub fn add_property(&mut self, prop: OProperty) {
        self.user_properties.push(prop);
    }

    /// Add child object.
    pub fn add_child(&mut self, child: OObject) {
        self.object.add_child(child);
    }

    /// Build the object.
    pub fn build(mut self) -> OObject {
        let xform = OProperty::compound(".xform")
            .with_meta_data(MetaData::from_pairs(&[(MetaData::SCHEMA_KEY, XFORM_SCHEMA)]));
        self.object.add_property(xform);
        for prop in self.user_properties {
            self.object.add_property(prop);
        }
        self.object
    }
}
