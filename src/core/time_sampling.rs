//! Time sampling types for Alembic.
//!
//! Alembic properties are sampled over time. The TimeSampling struct
//! describes when each sample was recorded. Index 0 of every archive is the
//! identity sampling; animated data registers its own.

use crate::util::Chrono;

/// Type of time sampling.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TimeSamplingType {
    /// Single static sample at time 0 (identity sampling).
    #[default]
    Identity,

    /// Uniform sampling: samples at regular intervals.
    /// start_time + index * time_per_cycle
    Uniform {
        time_per_cycle: Chrono,
        start_time: Chrono,
    },
}

/// Time sampling information for a property.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSampling {
    /// The type of sampling.
    pub sampling_type: TimeSamplingType,
}

impl TimeSampling {
    /// Identity time sampling (single sample at time 0).
    pub const IDENTITY: Self = Self {
        sampling_type: TimeSamplingType::Identity,
    };

    /// Identity time sampling.
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Create uniform time sampling.
    pub fn uniform(time_per_cycle: Chrono, start_time: Chrono) -> Self {
        Self {
            sampling_type: TimeSamplingType::Uniform {
                time_per_cycle,
                start_time,
            },
        }
    }

    /// Uniform sampling at a frame rate.
    pub fn from_fps(fps: f64, start_time: Chrono) -> Self {
        Self::uniform(1.0 / fps, start_time)
    }

    /// Time per cycle and stored sample times, as serialized into the
    /// archive's time sampling table and property header hashes.
    pub fn stored_times(&self) -> (Chrono, Vec<Chrono>) {
        match &self.sampling_type {
            TimeSamplingType::Identity => (1.0, vec![0.0]),
            TimeSamplingType::Uniform { time_per_cycle, start_time } => {
                (*time_per_cycle, vec![*start_time])
            }
        }
    }

    /// Two samplings are equivalent when they serialize identically.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.stored_times() == other.stored_times()
    }

    /// Get the time for a specific sample index.
    pub fn sample_time(&self, index: usize) -> Chrono {
        match &self.sampling_type {
            TimeSamplingType::Identity => 0.0,
            TimeSamplingType::Uniform { time_per_cycle, start_time } => {
                *start_time + (index as Chrono) * *time_per_cycle
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sampling() {
        let ts = TimeSampling::from_fps(24.0, 0.0);

        assert_eq!(ts.sample_time(0), 0.0);
        assert!((ts.sample_time(24) - 1.0).abs() < 1e-10);
        assert!((ts.sample_time(48) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_stored_times() {
        assert_eq!(TimeSampling::identity().stored_times(), (1.0, vec![0.0]));
        assert_eq!(TimeSampling::uniform(0.5, 2.0).stored_times(), (0.5, vec![2.0]));
    }

    #[test]
    fn test_equivalence() {
        let a = TimeSampling::from_fps(24.0, 0.0);
        let b = TimeSampling::uniform(1.0 / 24.0, 0.0);
        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&TimeSampling::identity()));
    }
}
