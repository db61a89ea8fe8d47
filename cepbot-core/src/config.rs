use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Log verbosity. `Http` sits between `Info` and `Debug` and only adds the
/// per-request records of the `http` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Http,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Http => "http",
            LogLevel::Debug => "debug",
        }
    }

    pub const fn all() -> &'static [LogLevel] {
        &[LogLevel::Error, LogLevel::Warn, LogLevel::Info, LogLevel::Http, LogLevel::Debug]
    }

    /// `tracing_subscriber::EnvFilter` directives for this level.
    pub fn filter_directives(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Http => "info,http=debug",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LogLevel {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, anyhow::Error> {
        let lower = value.trim().to_lowercase();

        LogLevel::all()
            .iter()
            .copied()
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| {
                anyhow!("Unknown log level '{value}'. Supported levels: error, warn, info, http, debug.")
            })
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, anyhow::Error> {
        LogLevel::try_from(s)
    }
}

/// Base URLs of the public services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub ibge: String,
    pub nominatim: String,
    pub open_meteo: String,
    pub viacep: String,
    /// Nominatim rejects requests without an identifying User-Agent.
    pub user_agent: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            ibge: "https://servicodados.ibge.gov.br/api/v1".to_string(),
            nominatim: "https://nominatim.openstreetmap.org/search".to_string(),
            open_meteo: "https://api.open-meteo.com/v1/forecast".to_string(),
            viacep: "https://viacep.com.br/ws".to_string(),
            user_agent: concat!("cepbot/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// log_level = "http"
/// analytics_dir = "/var/tmp/cepbot/analytics"
///
/// [endpoints]
/// viacep = "https://viacep.com.br/ws"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub log_level: Option<LogLevel>,
    pub logs_dir: Option<PathBuf>,
    pub analytics_dir: Option<PathBuf>,
    pub timezone: Option<String>,
    pub http_timeout_secs: Option<u64>,
    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or_default()
    }

    /// Defaults to `./logs`.
    pub fn logs_dir(&self) -> PathBuf {
        self.logs_dir.clone().unwrap_or_else(|| PathBuf::from("logs"))
    }

    /// Defaults to `./analytics`.
    pub fn analytics_dir(&self) -> PathBuf {
        self.analytics_dir.clone().unwrap_or_else(|| PathBuf::from("analytics"))
    }

    pub fn timezone(&self) -> &str {
        self.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = Some(level);
    }

    pub fn set_timezone(&mut self, timezone: &str) -> Result<()> {
        let timezone = timezone.trim();
        if timezone.is_empty() {
            return Err(anyhow!("Timezone must not be empty."));
        }
        self.timezone = Some(timezone.to_string());
        Ok(())
    }

    pub fn set_http_timeout_secs(&mut self, secs: u64) -> Result<()> {
        if secs == 0 {
            return Err(anyhow!("HTTP timeout must be at least one second."));
        }
        self.http_timeout_secs = Some(secs);
        Ok(())
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("br", "cepbot", "cepbot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
