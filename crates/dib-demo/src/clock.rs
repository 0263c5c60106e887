//! Time source

use dib::{implemented_by, injectable, singleton};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch
#[implemented_by(SystemClock)]
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> u64;
}

/// Wall-clock [`Clock`]
#[injectable]
#[singleton]
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}
