//! Testability ports for injecting time.

use chrono::{DateTime, Utc};

/// Test doubles are `ManualClock` and `FixedClock` in `infrastructure::clock`.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
