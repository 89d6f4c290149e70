//! Conversion settings.
//!
//! Every field has a default reproducing the historical converter, so an
//! empty JSON object (or no config file at all) gives the stock behavior.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::util::{Error, Result};

/// Point data fields tried for the color signal, in priority order.
pub const DEFAULT_COLOR_FIELDS: [&str; 4] = [
    "Bnn",
    "WeylB_NN_AhA.dump",
    "WeylB_NN_AhB.dump",
    "WeylB_NN_AhC.dump",
];

/// `_ai_Application` of archives written by the historical converter.
pub const DEFAULT_APPLICATION: &str = "cdmuhlb.VtkToAbc";

/// Group name to the file its first record is compared against.
///
/// Historical workaround for two groups of one dataset; empty it for new data.
pub type VisibilitySeeds = BTreeMap<String, String>;

/// Conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Frame rate of the uniform time sampling.
    pub frames_per_second: f64,
    /// Time of the first frame, in seconds.
    pub start_time: f64,
    /// Scalar range mapped onto black..white.
    pub color_range: [f64; 2],
    /// Candidate color fields; the first one present in a mesh wins.
    pub color_fields: Vec<String>,
    /// Name of the color-set geom param.
    pub color_set_name: String,
    /// Last-file seeds per group: a group whose first record references its
    /// seed file starts hidden.
    pub visibility_seeds: VisibilitySeeds,
    /// `_ai_Application` written into the archive.
    pub application: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        let visibility_seeds = [
            ("source9218", "Kip3B/Kip3B_source9218T0000.vtm"),
            ("source10267", "Kip3B/Kip3B_source10267T0000.vtm"),
        ]
        .into_iter()
        .map(|(group, file)| (group.to_string(), file.to_string()))
        .collect();

        Self {
            frames_per_second: 24.0,
            start_time: 0.0,
            color_range: [-1.3, 1.3],
            color_fields: DEFAULT_COLOR_FIELDS.iter().map(|s| s.to_string()).collect(),
            color_set_name: "colorSet1".into(),
            visibility_seeds,
            application: DEFAULT_APPLICATION.into(),
        }
    }
}

impl ConvertConfig {
    /// Load settings from a JSON file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the converter cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.frames_per_second.is_finite() && self.frames_per_second > 0.0) {
            return Err(Error::Config(format!(
                "frames_per_second must be positive, got {}",
                self.frames_per_second
            )));
        }
        if !self.start_time.is_finite() {
            return Err(Error::Config("start_time must be finite".into()));
        }
        let [lo, hi] = self.color_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(Error::Config(format!("color_range [{lo}, {hi}] is empty or inverted")));
        }
        if self.color_set_name.is_empty() {
            return Err(Error::Config("color_set_name must not be empty".into()));
        }
        Ok(())
    }

    /// Seconds per frame.
    pub fn time_per_frame(&self) -> f64 {
        1.0 / self.frames_per_second
    }
}
