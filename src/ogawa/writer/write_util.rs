//! Ogawa writer helper utilities.

use crate::core::{ContentHasher, TimeSampling};

use super::constants::{HINT_U16, HINT_U32, HINT_U8};
use super::property::{OProperty, OPropertyData};

/// Write value with size hint (1, 2, or 4 bytes).
pub(crate) fn write_with_hint(buf: &mut Vec<u8>, value: u32, hint: u8) {
    match hint {
        HINT_U8 => buf.push(value as u8),
        HINT_U16 => buf.extend_from_slice(&(value as u16).to_le_bytes()),
        _ => buf.extend_from_slice(&value.to_le_bytes()),
    }
}

/// Smallest size hint able to hold `max_value`.
pub(crate) fn size_hint_for(max_value: u32) -> u8 {
    if max_value < 256 {
        HINT_U8
    } else if max_value < 65536 {
        HINT_U16
    } else {
        HINT_U32
    }
}

/// Format the `_ai_AlembicVersion` string.
pub(crate) fn format_alembic_version(version: i32) -> String {
    let major = version / 10000;
    let minor = (version / 100) % 100;
    let patch = version % 100;
    let date = option_env!("VTK2ABC_BUILD_DATE").unwrap_or("unknown");
    let time = option_env!("VTK2ABC_BUILD_TIME").unwrap_or("unknown");
    format!("Alembic {}.{}.{} (built {} {})", major, minor, patch, date, time)
}

/// Hash a property header.
///
/// Non-compound properties contribute name, metadata, POD code, extent,
/// a scalar marker byte (scalars only) and the time sampling layout.
pub(crate) fn hash_property_header(
    hasher: &mut ContentHasher,
    prop: &OProperty,
    time_sampling: &TimeSampling,
) {
    let mut data = Vec::new();

    data.extend_from_slice(prop.name.as_bytes());
    data.extend_from_slice(prop.meta_data.serialize().as_bytes());

    if !matches!(prop.data, OPropertyData::Compound(_)) {
        data.push(prop.data_type.pod.code());
        data.push(prop.data_type.extent);

        if matches!(prop.data, OPropertyData::Scalar(_)) {
            data.push(0);
        }

        let (tpc, times) = time_sampling.stored_times();
        data.extend_from_slice(&tpc.to_le_bytes());
        data.extend_from_slice(&(times.len() as u32).to_le_bytes());
        for t in times {
            data.extend_from_slice(&t.to_le_bytes());
        }
    }

    if !data.is_empty() {
        hasher.update(&data);
    }
}

/// Fold array dimensions into a sample digest.
pub(crate) fn hash_dimensions(dims: &[usize], digest: (u64, u64)) -> (u64, u64) {
    if dims.is_empty() {
        return digest;
    }

    let mut hasher = ContentHasher::new();
    for d in dims {
        hasher.update(&(*d as u64).to_le_bytes());
    }
    hasher.update_pair(digest);
    hasher.finalize()
}
