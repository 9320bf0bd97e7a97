use chrono::{DateTime, Utc};

/// Source of "now" for time-dependent rules.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
