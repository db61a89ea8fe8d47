use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::Context;

/// Handle for one running timer.
///
/// Every `start` hands out a fresh invocation id, so two overlapping
/// operations with the same name are timed independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerToken {
    name: String,
    invocation: u64,
}

/// Start instants of the operations currently being timed.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    next_invocation: AtomicU64,
    running: Mutex<HashMap<TimerToken, Instant>>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, name: &str) -> TimerToken {
        let token = TimerToken {
            name: name.to_owned(),
            invocation: self.next_invocation.fetch_add(1, Ordering::Relaxed),
        };

        self.running.lock().insert(token.clone(), Instant::now());
        debug!(operation = name, invocation = token.invocation, "Started timer for operation: {name}");

        token
    }

    /// Stop the timer behind `token` and return the elapsed milliseconds.
    ///
    /// A token that was never started (or was already finished) yields `0.0`
    /// and a warning.
    pub fn finish(&self, token: &TimerToken, extra: &Context) -> f64 {
        let Some(started) = self.running.lock().remove(token) else {
            warn!(
                operation = %token.name,
                invocation = token.invocation,
                "No timer found for operation: {}",
                token.name
            );
            return 0.0;
        };

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        info!(
            operation = %token.name,
            duration_ms,
            context = %serde_json::Value::Object(extra.clone()),
            "Operation {} completed in {:.2}ms",
            token.name,
            duration_ms,
        );

        duration_ms
    }

    pub fn pending(&self) -> usize {
        self.running.lock().len()
    }
}
