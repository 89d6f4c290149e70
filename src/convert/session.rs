//! Output archive lifetime.

use std::path::Path;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::core::TimeSampling;
use crate::ogawa::writer::{OArchive, OObject, OProperty};
use crate::util::{DataType, Error, Result};

use super::config::ConvertConfig;
use super::track::ObjectTrack;

/// Owns the output archive and its top object until it is closed.
pub struct ArchiveSession {
    archive: OArchive,
    top: OObject,
}

impl ArchiveSession {
    /// Create the output file and set the archive metadata.
    pub fn create(path: &Path, config: &ConvertConfig, description: &str) -> Result<Self> {
        let mut archive = OArchive::create(path)?;
        archive.set_app_name(&config.application);
        archive.set_user_description(description);
        archive.set_date_written(&date_written()?);

        tracing::debug!("created archive {}", archive.name());
        Ok(Self {
            archive,
            top: OObject::new(""),
        })
    }

    /// Register a time sampling and return its index.
    pub fn add_time_sampling(&mut self, ts: TimeSampling) -> u32 {
        self.archive.add_time_sampling(ts)
    }

    /// Add a track's transform to the top object.
    pub fn attach(&mut self, track: ObjectTrack) {
        self.top.add_child(track.build());
    }

    /// Set a constant UInt32 property on the top object.
    pub fn set_top_u32(&mut self, name: &str, value: u32) {
        let mut prop = OProperty::scalar(name, DataType::UINT32);
        prop.add_scalar_pod(&value);
        self.top.add_property(prop);
    }

    /// Write the hierarchy and freeze the archive.
    pub fn close(mut self) -> Result<()> {
        self.archive.write_archive(&self.top)?;
        tracing::debug!(
            "wrote {} objects, {} shared sample blocks",
            self.top.children.len(),
            self.archive.dedup_hits()
        );
        self.archive.close()
    }
}

/// `ctime` layout used by `_ai_DateWritten`.
const DATE_WRITTEN_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
);

/// Current UTC time formatted for `_ai_DateWritten`.
fn date_written() -> Result<String> {
    time::OffsetDateTime::now_utc()
        .format(DATE_WRITTEN_FORMAT)
        .map_err(|e| Error::other(format!("date format: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_written_layout() -> Result<()> {
        let date = date_written()?;
        // e.g. "Mon Oct 19 14:03:07 2026"
        assert_eq!(date.split(' ').filter(|s| !s.is_empty()).count(), 5);
        assert_eq!(date.len(), 24);
        assert_eq!(date.matches(':').count(), 2);
        Ok(())
    }

    #[test]
    fn test_session_writes_archive() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("out.abc");
        let config = ConvertConfig::default();

        let mut session = ArchiveSession::create(&path, &config, "Exported from: x.pvd")?;
        let ts = session.add_time_sampling(TimeSampling::from_fps(24.0, 0.0));
        assert_eq!(ts, 1);
        session.attach(ObjectTrack::new("g", ts, &config.color_set_name));
        session.set_top_u32("1.samples", 0);
        session.close()?;

        let bytes = std::fs::read(&path)?;
        assert_eq!(&bytes[0..5], b"Ogawa");
        assert_eq!(bytes[5], 0xff);
        let app = b"_ai_Application=cdmuhlb.VtkToAbc";
        assert!(bytes.windows(app.len()).any(|w| w == app));
        Ok(())
    }
}
