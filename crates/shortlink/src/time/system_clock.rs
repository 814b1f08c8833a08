use crate::TimeSource;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock time source backed by [`SystemTime`].
///
/// Expiry deadlines are absolute timestamps shared with other processes, so
/// this reads wall-clock time and may jump. A system clock set before the
/// Unix epoch reads as `0`.
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemClock;

impl TimeSource<u64> for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}
