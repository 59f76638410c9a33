// slicehouse/src/clock.rs

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// Source of "now" for expiry, scheduling and invoice months.
pub trait Clock: Send + Sync + 'static {
  fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock(RwLock<DateTime<Utc>>);

impl FixedClock {
  pub fn new(at: DateTime<Utc>) -> Self {
    FixedClock(RwLock::new(at))
  }

  pub fn set(&self, at: DateTime<Utc>) {
    *self.0.write() = at;
  }

  pub fn advance(&self, by: Duration) {
    let mut guard = self.0.write();
    *guard += by;
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    *self.0.read()
  }
}
