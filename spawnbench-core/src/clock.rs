//! Wall-clock timestamps for the timing loop.
//!
//! Reads CLOCK_REALTIME rather than a monotonic clock. The clock can be
//! stepped while a run is in progress, in which case a sample may come out
//! negative; samples are reported as measured.

use nix::time::{clock_gettime, ClockId};

use crate::error::BenchError;

/// A CLOCK_REALTIME reading split into seconds and nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub secs: i64,
    pub nanos: i64,
}

impl Timestamp {
    /// Read the wall clock.
    pub fn now() -> Result<Self, BenchError> {
        let ts = clock_gettime(ClockId::CLOCK_REALTIME).map_err(BenchError::Clock)?;
        Ok(Self {
            secs: ts.tv_sec() as i64,
            nanos: ts.tv_nsec() as i64,
        })
    }

    /// Nanoseconds elapsed from `earlier` to `self`, as a float.
    pub fn nanos_since(&self, earlier: &Timestamp) -> f64 {
        (self.secs - earlier.secs) as f64 * 1e9 + (self.nanos - earlier.nanos) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanos_since_borrows_across_second() {
        let before = Timestamp {
            secs: 10,
            nanos: 900_000_000,
        };
        let after = Timestamp {
            secs: 11,
            nanos: 100_000_000,
        };
        assert_eq!(after.nanos_since(&before), 200_000_000.0);
    }

    #[test]
    fn test_nanos_since_can_be_negative() {
        let before = Timestamp { secs: 5, nanos: 0 };
        let after = Timestamp { secs: 4, nanos: 500 };
        assert!(after.nanos_since(&before) < 0.0);
    }

    #[test]
    fn test_now_is_readable() {
        let ts = Timestamp::now().unwrap();
        assert!(ts.secs > 0);
        assert!((0..1_000_000_000).contains(&ts.nanos));
    }
}
