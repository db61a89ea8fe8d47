use std::path::PathBuf;

use anyhow::{Context, Result};
use cepbot_core::{Config, LogLevel};
use clap::{Parser, Subcommand, ValueEnum};

use crate::chat;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "cepbot",
    version,
    about = "Chatbot for Brazilian postal codes and weather forecasts"
)]
pub struct Cli {
    /// Log verbosity: error, warn, info, http or debug.
    #[arg(long, global = true, env = "LOG_LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    /// Defaults to `chat`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive chatbot.
    Chat,

    /// Inspect or change the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path and its contents.
    Show,

    /// Change one setting and save it.
    Set { key: ConfigKey, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    LogLevel,
    Timezone,
    LogsDir,
    AnalyticsDir,
    HttpTimeout,
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::try_from(value).map_err(|err| err.to_string())
}

impl Cli {
    /// Returns the process exit status.
    pub async fn run(self) -> Result<i32> {
        match self.command.unwrap_or(Command::Chat) {
            Command::Chat => {
                let config = Config::load()?;
                let level = self.log_level.unwrap_or_else(|| config.log_level());
                chat::run(&config, level).await
            }
            Command::Config(ConfigCommand::Show) => {
                let path = Config::config_file_path()?;
                let config = Config::load_from(&path)?;
                let toml =
                    toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

                println!("# {}", path.display());
                print!("{toml}");
                Ok(0)
            }
            Command::Config(ConfigCommand::Set { key, value }) => {
                let mut config = Config::load()?;
                apply(&mut config, key, &value)?;
                let path = config.save()?;

                println!("Saved {} to {}", key.to_possible_value_name(), path.display());
                Ok(0)
            }
        }
    }
}

/// Set `key` on `config` from its command-line text.
pub fn apply(config: &mut Config, key: ConfigKey, value: &str) -> Result<()> {
    match key {
        ConfigKey::LogLevel => config.set_log_level(LogLevel::try_from(value)?),
        ConfigKey::Timezone => config.set_timezone(value)?,
        ConfigKey::LogsDir => config.logs_dir = Some(PathBuf::from(value)),
        ConfigKey::AnalyticsDir => config.analytics_dir = Some(PathBuf::from(value)),
        ConfigKey::HttpTimeout => {
            let secs = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid HTTP timeout '{value}', expected seconds"))?;
            config.set_http_timeout_secs(secs)?;
        }
    }

    Ok(())
}

impl ConfigKey {
    fn to_possible_value_name(self) -> String {
        self.to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_else(|| format!("{self:?}"))
    }
}
