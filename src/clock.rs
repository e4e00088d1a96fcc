//! Time source for lockout decisions.
//!
//! Every decision takes `now` from a [`Clock`] so tests can move time
//! instead of sleeping through a cooldown.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "mocks"))]
pub use mock::MockClock;

#[cfg(any(test, feature = "mocks"))]
mod mock {
    #![allow(clippy::unwrap_used)]

    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Duration, Utc};

    use super::Clock;

    /// Manually driven clock. Clones share the same instant.
    #[derive(Debug, Clone)]
    pub struct MockClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl MockClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(Mutex::new(start)),
            }
        }

        pub fn set(&self, instant: DateTime<Utc>) {
            *self.now.lock().unwrap() = instant;
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::new(Utc::now())
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}
