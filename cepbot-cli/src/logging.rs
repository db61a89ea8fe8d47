use std::{
    fs::{self, File, OpenOptions},
    path::Path,
    sync::Mutex,
};

use anyhow::{Context, Result};
use cepbot_core::LogLevel;
use tracing::{Subscriber, warn};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, prelude::*, registry::LookupSpan,
};

pub const ERROR_LOG: &str = "error.log";
pub const COMBINED_LOG: &str = "combined.log";

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Colorized console output on stderr plus JSON records appended to
/// `<logs_dir>/combined.log` and, for errors only, `<logs_dir>/error.log`.
///
/// If the log files cannot be opened the console sink still comes up.
pub fn init(level: LogLevel, logs_dir: &Path) -> Result<()> {
    let filter = EnvFilter::try_new(level.filter_directives())
        .with_context(|| format!("Invalid log filter for level '{level}'"))?;

    let console = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (files, file_error) = match file_layers(logs_dir) {
        Ok(layer) => (Some(layer), None),
        Err(err) => (None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(files)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(err) = file_error {
        warn!(logs_dir = %logs_dir.display(), "File logging disabled: {err:#}");
    }

    Ok(())
}

fn file_layers<S>(logs_dir: &Path) -> Result<BoxedLayer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let combined = fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(Mutex::new(open_log_file(logs_dir, COMBINED_LOG)?));

    let errors = fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(Mutex::new(open_log_file(logs_dir, ERROR_LOG)?))
        .with_filter(LevelFilter::ERROR);

    Ok(combined.and_then(errors).boxed())
}

/// Open `<logs_dir>/<name>` for appending, creating the directory on first use.
pub fn open_log_file(logs_dir: &Path, name: &str) -> Result<File> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create logs directory: {}", logs_dir.display()))?;

    let path = logs_dir.join(name);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_subscriber::prelude::*;

    #[test]
    fn log_files_are_created_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");

        writeln!(open_log_file(&logs, COMBINED_LOG).unwrap(), "first").unwrap();
        writeln!(open_log_file(&logs, COMBINED_LOG).unwrap(), "second").unwrap();

        let contents = fs::read_to_string(logs.join(COMBINED_LOG)).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn unusable_logs_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("logs");
        fs::write(&blocker, "").unwrap();

        let err = open_log_file(&blocker, ERROR_LOG).unwrap_err();
        assert!(err.to_string().contains("Failed to create logs directory"));
    }

    #[test]
    fn error_log_receives_errors_only() {
        let dir = tempfile::tempdir().unwrap();
        let subscriber = tracing_subscriber::registry().with(file_layers(dir.path()).unwrap());

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(endpoint = "/search", "API request failed");
            tracing::warn!("No timer found for operation: lookup");
            tracing::info!("Application shutting down");
        });

        let errors = fs::read_to_string(dir.path().join(ERROR_LOG)).unwrap();
        let combined = fs::read_to_string(dir.path().join(COMBINED_LOG)).unwrap();

        assert_eq!(errors.lines().count(), 1);
        assert!(errors.contains("API request failed"));
        assert!(errors.contains(r#""level":"ERROR""#));

        assert_eq!(combined.lines().count(), 3);
        assert!(combined.contains("Application shutting down"));
    }
}
