//! Ogawa property writer types.
//!
//! Properties collect their samples in memory; the archive serializes them
//! when it is written.

use crate::core::MetaData;
use crate::util::DataType;

/// One array sample: raw bytes plus dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct OSample {
    pub data: Vec<u8>,
    pub dims: Vec<usize>,
}

/// Property data variants.
#[derive(Clone, Debug)]
pub enum OPropertyData {
    /// Scalar property samples.
    Scalar(Vec<Vec<u8>>),
    /// Array property samples.
    Array(Vec<OSample>),
    /// Compound property children.
    Compound(Vec<OProperty>),
}

/// Property for writing.
#[derive(Clone, Debug)]
pub struct OProperty {
    /// Property name.
    pub name: String,
    /// Data type.
    pub data_type: DataType,
    /// Metadata.
    pub meta_data: MetaData,
    /// Time sampling index.
    pub time_sampling_index: u32,
    /// Property data.
    pub data: OPropertyData,
    /// Array property whose samples all hold exactly one element.
    pub is_scalar_like: bool,
}

impl OProperty {
    fn with_data(name: &str, data_type: DataType, data: OPropertyData) -> Self {
        let is_scalar_like = !matches!(data, OPropertyData::Compound(_));
        Self {
            name: name.to_string(),
            data_type,
            meta_data: MetaData::new(),
            time_sampling_index: 0,
            data,
            is_scalar_like,
        }
    }

    /// Create a scalar property.
    pub fn scalar(name: &str, data_type: DataType) -> Self {
        Self::with_data(name, data_type, OPropertyData::Scalar(Vec::new()))
    }

    /// Create an array property.
    pub fn array(name: &str, data_type: DataType) -> Self {
        Self::with_data(name, data_type, OPropertyData::Array(Vec::new()))
    }

    /// Create a compound property.
    pub fn compound(name: &str) -> Self {
        Self::with_data(name, DataType::UNKNOWN, OPropertyData::Compound(Vec::new()))
    }

    /// Set metadata.
    pub fn with_meta_data(mut self, md: MetaData) -> Self {
        self.meta_data = md;
        self
    }

    /// Set time sampling index.
    pub fn with_time_sampling(mut self, index: u32) -> Self {
        self.time_sampling_index = index;
        self
    }

    /// Add a scalar sample.
    pub fn add_scalar_sample(&mut self, data: &[u8]) {
        if let OPropertyData::Scalar(samples) = &mut self.data {
            samples.push(data.to_vec());
        }
    }

    /// Add a scalar sample from a Pod value.
    pub fn add_scalar_pod<T: bytemuck::Pod>(&mut self, value: &T) {
        self.add_scalar_sample(bytemuck::bytes_of(value));
    }

    /// Add an array sample.
    pub fn add_array_sample(&mut self, data: &[u8], dims: &[usize]) {
        if let OPropertyData::Array(samples) = &mut self.data {
            if dims.iter().product::<usize>() != 1 {
                self.is_scalar_like = false;
            }
            samples.push(OSample { data: data.to_vec(), dims: dims.to_vec() });
        }
    }

    /// Add an array sample from a Pod slice.
    pub fn add_array_pod<T: bytemuck::Pod>(&mut self, values: &[T]) {
        self.add_array_sample(bytemuck::cast_slice(values), &[values.len()]);
    }

    /// Add a child property (for compound).
    pub fn add_child(&mut self, prop: OProperty) {
        if let OPropertyData::Compound(children) = &mut self.data {
            children.push(prop);
        }
    }

    /// Find a child property by name (for compound).
    pub fn child(&self, name: &str) -> Option<&OProperty> {
        match &self.data {
            OPropertyData::Compound(children) => children.iter().find(|p| p.name == name),
            _ => None,
        }
    }

    /// Find a child property by name, mutably (for compound).
    pub fn child_mut(&mut self, name: &str) -> Option<&mut OProperty> {
        match &mut self.data {
            OPropertyData::Compound(children) => children.iter_mut().find(|p| p.name == name),
            _ => None,
        }
    }

    /// Find a child property by name, creating it with `make` when absent.
    ///
    /// Returns `None` when this property is not a compound.
    pub fn child_or_insert_with(
        &mut self,
        name: &str,
        make: impl FnOnce() -> OProperty,
    ) -> Option<&mut OProperty> {
        let OPropertyData::Compound(children) = &mut self.data else {
            return None;
        };
        let idx = match children.iter().position(|p| p.name == name) {
            Some(idx) => idx,
            None => {
                children.push(make());
                children.len() - 1
            }
        };
        children.get_mut(idx)
    }

    /// Raw bytes of every scalar sample, in order.
    pub fn scalar_samples(&self) -> &[Vec<u8>] {
        match &self.data {
            OPropertyData::Scalar(samples) => samples,
            _ => &[],
        }
    }

    /// Get number of samples.
    pub fn num_samples(&self) -> usize {
        match &self.data {
            OPropertyData::Scalar(s) => s.len(),
            OPropertyData::Array(s) => s.len(),
            OPropertyData::Compound(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_scalar_like_tracking() {
        let mut prop = OProperty::array("P", DataType::VEC3F);
        assert!(prop.is_scalar_like);
        prop.add_array_pod(&[[1.0f32, 2.0, 3.0]]);
        assert!(prop.is_scalar_like);
        prop.add_array_pod(&[[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert!(!prop.is_scalar_like);
        assert_eq!(prop.num_samples(), 2);
    }

    #[test]
    fn test_compound_children() {
        let mut geom = OProperty::compound(".geom");
        assert!(!geom.is_scalar_like);
        geom.add_child(OProperty::scalar("visible", DataType::INT8));
        assert!(geom.child("visible").is_some());
        if let Some(p) = geom.child_mut("visible") {
            p.add_scalar_pod(&-1i8);
        }
        assert_eq!(geom.child("visible").map(OProperty::num_samples), Some(1));
        assert!(geom.child("missing").is_none());
    }
}
