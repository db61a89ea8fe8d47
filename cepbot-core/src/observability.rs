//! In-process observability: operation timers, API call metrics, sessions and
//! command usage.
//!
//! Everything is owned by a single [`Observability`] value that `main` creates
//! and shares (`Arc`) with the dispatch loop, the HTTP clients and the
//! lifecycle. Each store guards itself with a mutex, so the bundle is safe to
//! use from any tokio worker.

use std::{fmt::Display, future::Future, path::PathBuf};

use serde_json::{Map, Value};

pub mod measure;
pub mod metrics;
pub mod session;
pub mod timer;
pub mod usage;

pub use metrics::{ApiMetric, ApiMetrics, ApiMetricsSummary, EndpointSummary};
pub use session::{CommandCount, Session, SessionId, SessionRecord, SessionTracker};
pub use timer::{TimerRegistry, TimerToken};
pub use usage::{CommandMetric, CommandUsage, CommandUsageSummary, RankedCommand};

/// Free-form key/value context attached to timing records.
pub type Context = Map<String, Value>;

pub fn context<K, I>(pairs: I) -> Context
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[derive(Debug)]
pub struct Observability {
    timers: TimerRegistry,
    api: ApiMetrics,
    sessions: SessionTracker,
}

impl Observability {
    pub fn new(analytics_dir: impl Into<PathBuf>) -> Self {
        Self {
            timers: TimerRegistry::new(),
            api: ApiMetrics::new(),
            sessions: SessionTracker::new(analytics_dir),
        }
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    pub fn api(&self) -> &ApiMetrics {
        &self.api
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    pub fn usage(&self) -> &CommandUsage {
        self.sessions.usage()
    }

    pub async fn measure<T, E, Fut>(&self, name: &str, extra: Context, operation: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        measure::measure(&self.timers, name, extra, operation).await
    }

    /// Log the command usage summary followed by the API metrics summary.
    pub fn log_summaries(&self) {
        self.usage().log_summary();
        self.api.log_summary();
    }
}
