use chrono::{DateTime, Utc};

/// Source of the current instant used to split shows into past and upcoming.
///
/// Implemented by [`SystemClock`] in production and mocked in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
