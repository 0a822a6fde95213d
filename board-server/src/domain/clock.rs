//! Wall-clock source for arrival normalization.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Time zone the operator's boards print clock times in.
pub const OPERATOR_ZONE: Tz = chrono_tz::Europe::London;

/// Source of the current instant in the board's reference zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;
}

/// Reads the system clock and converts it into a fixed zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    zone: Tz,
}

impl SystemClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(OPERATOR_ZONE)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.zone)
    }
}

/// Always returns the same instant. Useful in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Tz>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.0
    }
}
