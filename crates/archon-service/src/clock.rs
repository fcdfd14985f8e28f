use std::fmt;
use std::sync::Arc;

use chrono::Utc;

/// Injectable source of integer seconds. Expiry and outbox retry logic read
/// time only through this, so both are deterministically testable.
#[derive(Clone)]
pub struct Clock {
    now_fn: Arc<dyn Fn() -> i64 + Send + Sync>,
}

impl Clock {
    /// Wall-clock seconds since the Unix epoch.
    pub fn system() -> Self {
        Self::from_fn(|| Utc::now().timestamp())
    }

    pub fn from_fn(f: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        Self { now_fn: Arc::new(f) }
    }

    pub fn now(&self) -> i64 {
        (self.now_fn)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}
