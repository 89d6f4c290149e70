//! Indexed geometry parameter writer.
//!
//! An indexed geom param is a compound holding `.vals` and `.indices`
//! arrays; the value of element `i` is `vals[indices[i]]`.

use crate::core::{GeometryScope, MetaData};
use crate::util::DataType;

use super::super::property::OProperty;

/// Indexed geometry parameter (compound with `.vals` and `.indices`).
pub struct OIndexedGeomParam {
    name: String,
    meta_data: MetaData,
    vals: OProperty,
    indices: OProperty,
}

impl OIndexedGeomParam {
    /// Create an indexed parameter with the given value type and scope.
    ///
    /// `interpretation` is attached to `.vals` and repeated on the compound.
    pub fn new(
        name: &str,
        data_type: DataType,
        scope: GeometryScope,
        interpretation: &str,
        time_sampling_index: u32,
    ) -> Self {
        let extent = data_type.extent.to_string();
        let meta_data = MetaData::from_pairs(&[
            ("arrayExtent", "1"),
            ("geoScope", scope.as_str()),
            (MetaData::INTERPRETATION_KEY, interpretation),
            ("isGeomParam", "true"),
            ("podExtent", extent.as_str()),
            ("podName", data_type.pod.name()),
        ]);

        let vals = OProperty::array(".vals", data_type)
            .with_meta_data(MetaData::from_pairs(&[(MetaData::INTERPRETATION_KEY, interpretation)]))
            .with_time_sampling(time_sampling_index);
        let indices =
            OProperty::array(".indices", DataType::UINT32).with_time_sampling(time_sampling_index);

        Self {
            name: name.to_string(),
            meta_data,
            vals,
            indices,
        }
    }

    /// Add an extra metadata entry to the compound (e.g. `mayaColorSet`).
    pub fn with_meta(mut self, key: &str, value: &str) -> Self {
        self.meta_data.set(key, value);
        self
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compound metadata.
    pub fn meta_data(&self) -> &MetaData {
        &self.meta_data
    }

    /// Append one sample of values and the indices into them.
    pub fn add_sample<T: bytemuck::Pod>(&mut self, vals: &[T], indices: &[u32]) {
        self.vals.add_array_pod(vals);
        self.indices.add_array_pod(indices);
    }

    /// Number of samples written so far.
    pub fn num_samples(&self) -> usize {
        self.vals.num_samples()
    }

    /// Convert into the compound property.
    pub fn into_property(self) -> OProperty {
        let mut compound = OProperty::compound(&self.name).with_meta_data(self.meta_data);
        compound.add_child(self.vals);
        compound.add_child(self.indices);
        compound
    }
}
