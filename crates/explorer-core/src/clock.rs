//! Injectable time source for generation metadata

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Abstracts the system time source
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests
#[derive(Debug, Clone)]
pub struct FakeClock {
    t: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    pub fn new_set(t: DateTime<Utc>) -> Self {
        Self { t: Arc::new(Mutex::new(t)) }
    }

    pub fn advance(&self, quantum: Duration) {
        let mut t = self.t.lock().unwrap();
        *t += quantum;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.t.lock().unwrap()
    }
}
