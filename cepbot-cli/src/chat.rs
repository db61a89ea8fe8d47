use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use cepbot_core::{Config, Dispatcher, LogLevel, LoopOutcome, Observability, Services};
use tracing::{error, info};

use crate::{
    commands::ChatHandlers,
    lifecycle::{Lifecycle, shutdown_signal},
    logging,
    prompt::InquirePrompter,
    render,
};

/// How long the welcome banner plays before the menu opens.
const WELCOME_DELAY: Duration = Duration::from_secs(1);
/// Upper bound on waiting for the banner if the terminal is slow.
const WELCOME_LIMIT: Duration = Duration::from_secs(2);
const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(2);

/// Exit status after Ctrl-C or SIGTERM.
pub const INTERRUPTED: i32 = 130;

/// Run the interactive chatbot and return the process exit status.
pub async fn run(config: &Config, level: LogLevel) -> Result<i32> {
    logging::init(level, &config.logs_dir())?;
    info!(level = %level, analytics_dir = %config.analytics_dir().display(), "Application starting");

    let obs = Arc::new(Observability::new(config.analytics_dir()));
    let services =
        Services::from_config(config, obs.clone()).context("Failed to build API clients")?;

    let session = obs.sessions().start_session();
    let lifecycle = Arc::new(Lifecycle::new(obs.clone(), session.clone(), SHUTDOWN_DEADLINE));
    lifecycle.install_panic_hook();

    lifecycle.spawn_monitored("welcome", render::animate_welcome(WELCOME_DELAY));
    lifecycle.settle(WELCOME_LIMIT).await;

    let mut dispatcher = Dispatcher::new(obs, session, InquirePrompter, ChatHandlers::new(services));
    let chat = tokio::spawn(async move { dispatcher.run().await });

    let code = tokio::select! {
        joined = chat => match joined {
            Ok(Ok(LoopOutcome::Exit)) => 0,
            Ok(Err(err)) => {
                error!("Chat loop failed: {err:#}");
                1
            }
            Err(err) => {
                error!("Chat loop did not complete: {err}");
                1
            }
        },
        signal = shutdown_signal() => {
            info!(signal, "Received {signal}, shutting down");
            INTERRUPTED
        }
    };

    lifecycle.shutdown().await;
    Ok(code)
}
