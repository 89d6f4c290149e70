//! Scalar field to grayscale color mapping.

use glam::Vec3;

/// Map each scalar onto a gray level: `clamp((v - lo) / (hi - lo), 0, 1)`.
pub fn derive_colors(values: &[f64], lo: f64, hi: f64) -> Vec<Vec3> {
    let range = hi - lo;
    values
        .iter()
        .map(|&v| {
            let level = ((v - lo) / range).clamp(0.0, 1.0) as f32;
            Vec3::splat(level)
        })
        .collect()
}
