use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, MutexGuard};

/// How long a successful fetch keeps a provider healthy.
pub const HEALTHY_WINDOW_HOURS: i64 = 2;

#[derive(Debug, Default, Clone, Copy)]
struct HealthState {
    last_success: Option<DateTime<Utc>>,
    last_attempt: Option<DateTime<Utc>>,
    failing: bool,
}

/// Fetch outcome bookkeeping shared by every adapter. Concurrent fetches of
/// the same provider may interleave; the last recorded outcome wins.
#[derive(Debug, Default)]
pub struct ProviderHealth {
    state: Mutex<HealthState>,
}

impl ProviderHealth {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HealthState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_success(&self) {
        self.record_success_at(Utc::now());
    }

    pub fn record_success_at(&self, now: DateTime<Utc>) {
        let mut state = self.state();
        state.last_success = Some(now);
        state.last_attempt = Some(now);
        state.failing = false;
    }

    pub fn record_failure(&self) {
        self.record_failure_at(Utc::now());
    }

    pub fn record_failure_at(&self, now: DateTime<Utc>) {
        let mut state = self.state();
        state.last_attempt = Some(now);
        state.failing = true;
    }

    pub fn is_healthy(&self) -> bool {
        self.is_healthy_at(Utc::now())
    }

    /// Healthy when the last outcome was a success no older than the
    /// healthy window. A provider that was never fetched is not healthy.
    pub fn is_healthy_at(&self, now: DateTime<Utc>) -> bool {
        let state = self.state();
        if state.failing {
            return false;
        }
        state
            .last_success
            .map_or(false, |at| now - at < Duration::hours(HEALTHY_WINDOW_HOURS))
    }

    /// True once the last attempt is at least `retry_after` old.
    pub fn due_for_retry_at(&self, now: DateTime<Utc>, retry_after: Duration) -> bool {
        match self.state().last_attempt {
            None => true,
            Some(at) => now - at >= retry_after,
        }
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.state().last_success
    }

    /// Epoch millis of the last success, 0 if there never was one.
    pub fn last_success_millis(&self) -> i64 {
        self.last_success().map_or(0, |at| at.timestamp_millis())
    }
}
