//! Process lifecycle: shutdown sequence, panic hook and monitored background work.

use std::{any::Any, backtrace::Backtrace, future::Future, sync::Arc, time::Duration};

use cepbot_core::{Observability, SessionId};
use parking_lot::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub struct Lifecycle {
    obs: Arc<Observability>,
    session: SessionId,
    background: Mutex<JoinSet<()>>,
    deadline: Duration,
}

impl Lifecycle {
    /// `deadline` bounds how long shutdown waits for background work.
    pub fn new(obs: Arc<Observability>, session: SessionId, deadline: Duration) -> Self {
        Self { obs, session, background: Mutex::new(JoinSet::new()), deadline }
    }

    /// Run `work` in the background. A failure is logged and the process keeps going.
    pub fn spawn_monitored<F>(&self, task: &'static str, work: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.background.lock().spawn(async move {
            if let Err(err) = work.await {
                error!(task, reason = %format!("{err:#}"), "Unhandled background failure in {task}");
            }
        });
    }

    /// Wait for the background work spawned so far, aborting whatever is
    /// still running after `limit`.
    pub async fn settle(&self, limit: Duration) {
        let mut pending = std::mem::take(&mut *self.background.lock());

        if tokio::time::timeout(limit, drain(&mut pending)).await.is_err() {
            warn!(pending = pending.len(), "Background work still running after {limit:?}, aborting it");
            pending.abort_all();
        }
    }

    /// Wait for background work (up to the deadline), then end the session
    /// and flush the summaries.
    pub async fn shutdown(&self) {
        self.settle(self.deadline).await;
        self.finalize();
    }

    fn finalize(&self) {
        self.obs.sessions().end_session(&self.session);
        self.obs.log_summaries();
        info!("Application shutting down");
    }

    /// Log any panic with its backtrace, finalize the session and exit with status 1.
    pub fn install_panic_hook(self: &Arc<Self>) {
        let lifecycle = Arc::clone(self);

        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(ToString::to_string)
                .unwrap_or_else(|| "<unknown>".to_string());

            error!(
                location = %location,
                backtrace = %Backtrace::force_capture(),
                "Uncaught exception: {}",
                panic_message(info.payload()),
            );

            lifecycle.finalize();
            std::process::exit(1);
        }));
    }
}

async fn drain(tasks: &mut JoinSet<()>) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            error!("Background task did not complete: {err}");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "Unknown error"
    }
}

/// Resolves with the signal name on Ctrl-C (or SIGTERM on unix).
pub async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                name = ctrl_c() => name,
                _ = sigterm.recv() => "SIGTERM",
            },
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {err}");
                ctrl_c().await
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await
    }
}

async fn ctrl_c() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "SIGINT",
        Err(err) => {
            warn!("Failed to listen for Ctrl-C: {err}");
            std::future::pending().await
        }
    }
}
