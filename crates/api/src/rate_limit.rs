use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window request limiter keyed by caller IP. Callers whose window
/// has fully drained are dropped from the map, so the key set stays bounded
/// by recently active callers rather than every IP ever seen.
#[derive(Debug, Clone)]
pub struct IpRateLimiter {
    callers: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    window: Duration,
    max_requests: usize,
}

impl IpRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            callers: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_requests,
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut callers = self.callers.lock();

        callers.retain(|_, hits| {
            while hits
                .front()
                .is_some_and(|hit| now.duration_since(*hit) > self.window)
            {
                hits.pop_front();
            }
            !hits.is_empty()
        });

        let hits = callers.entry(key.to_string()).or_default();
        if hits.len() >= self.max_requests {
            return false;
        }

        hits.push_back(now);
        true
    }

    #[cfg(test)]
    fn tracked_callers(&self) -> usize {
        self.callers.lock().len()
    }
}
