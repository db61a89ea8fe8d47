use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

/// Process-wide usage of one menu command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandMetric {
    pub command: String,
    pub total_usage: u64,
    pub last_used: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCommand {
    pub command: String,
    pub usage: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandUsageSummary {
    pub total_commands: usize,
    pub total_usage: u64,
    pub commands_by_usage: Vec<RankedCommand>,
}

/// Command invocation counts across every session of the process.
#[derive(Debug, Default)]
pub struct CommandUsage {
    metrics: Mutex<Vec<CommandMetric>>,
}

impl CommandUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, command: &str) {
        let now = Utc::now();
        let mut metrics = self.metrics.lock();

        match metrics.iter_mut().find(|m| m.command == command) {
            Some(metric) => {
                metric.total_usage += 1;
                metric.last_used = now;
            }
            None => metrics.push(CommandMetric {
                command: command.to_owned(),
                total_usage: 1,
                last_used: now,
            }),
        }
    }

    pub fn get(&self, command: &str) -> Option<CommandMetric> {
        self.metrics.lock().iter().find(|m| m.command == command).cloned()
    }

    pub fn snapshot(&self) -> Vec<CommandMetric> {
        self.metrics.lock().clone()
    }

    /// Commands ordered by usage, most used first. Ties keep first-use order.
    pub fn summary(&self) -> CommandUsageSummary {
        let metrics = self.metrics.lock();

        let mut commands_by_usage: Vec<_> = metrics
            .iter()
            .map(|m| RankedCommand { command: m.command.clone(), usage: m.total_usage })
            .collect();
        commands_by_usage.sort_by(|a, b| b.usage.cmp(&a.usage));

        CommandUsageSummary {
            total_commands: metrics.len(),
            total_usage: metrics.iter().map(|m| m.total_usage).sum(),
            commands_by_usage,
        }
    }

    pub fn log_summary(&self) {
        let summary = self.summary();
        let ranking = serde_json::to_string(&summary.commands_by_usage).unwrap_or_default();

        info!(
            total_commands = summary.total_commands,
            total_usage = summary.total_usage,
            commands_by_usage = %ranking,
            "Command Usage Summary: {} commands tracked",
            summary.total_commands,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_and_touches_last_used() {
        let usage = CommandUsage::new();
        usage.record("weather_command");
        let first = usage.get("weather_command").unwrap().last_used;
        usage.record("weather_command");

        let metric = usage.get("weather_command").unwrap();
        assert_eq!(metric.total_usage, 2);
        assert!(metric.last_used >= first);
    }

    #[test]
    fn summary_sorts_descending_and_keeps_ties_stable() {
        let usage = CommandUsage::new();
        for command in ["settings", "zip_code_command", "weather_command", "zip_code_command", "exit"] {
            usage.record(command);
        }

        let summary = usage.summary();
        assert_eq!(summary.total_commands, 4);
        assert_eq!(summary.total_usage, 5);

        let order: Vec<_> = summary.commands_by_usage.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(order, ["zip_code_command", "settings", "weather_command", "exit"]);
    }

    #[test]
    fn empty_summary() {
        let summary = CommandUsage::new().summary();
        assert_eq!(summary.total_commands, 0);
        assert_eq!(summary.total_usage, 0);
        assert!(summary.commands_by_usage.is_empty());
    }
}
