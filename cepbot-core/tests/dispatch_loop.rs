use std::{collections::VecDeque, fs, sync::Arc};

use async_trait::async_trait;
use cepbot_core::{
    ApiError, CommandError, CommandHandlers, Dispatcher, LoopOutcome, MenuCommand, Observability,
    Prompter,
    dispatch::{FAREWELL, SETTINGS_PLACEHOLDER},
    observability::{CommandCount, SessionRecord},
};
use parking_lot::Mutex;

/// Plays back a fixed list of menu selections and confirm answers.
#[derive(Default)]
struct ScriptedPrompter {
    selections: VecDeque<MenuCommand>,
    answers: VecDeque<bool>,
    questions: Vec<String>,
    notices: Vec<String>,
    alerts: Vec<String>,
}

impl ScriptedPrompter {
    fn new(selections: &[MenuCommand], answers: &[bool]) -> Self {
        Self {
            selections: selections.iter().copied().collect(),
            answers: answers.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select_command(&mut self) -> anyhow::Result<MenuCommand> {
        self.selections.pop_front().ok_or_else(|| anyhow::anyhow!("script exhausted"))
    }

    fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

/// Records every invocation together with the usage count seen at that moment.
struct RecordingHandlers {
    obs: Arc<Observability>,
    failing: Vec<MenuCommand>,
    calls: Mutex<Vec<(MenuCommand, u64)>>,
}

impl RecordingHandlers {
    fn new(obs: Arc<Observability>) -> Self {
        Self { obs, failing: Vec::new(), calls: Mutex::new(Vec::new()) }
    }

    fn failing(mut self, command: MenuCommand) -> Self {
        self.failing.push(command);
        self
    }
}

#[async_trait]
impl CommandHandlers for RecordingHandlers {
    async fn handle(&self, command: MenuCommand) -> Result<(), CommandError> {
        let seen = self.obs.usage().get(command.as_str()).map(|m| m.total_usage).unwrap_or(0);
        self.calls.lock().push((command, seen));

        if self.failing.contains(&command) {
            return Err(ApiError::Status {
                endpoint: "/ws/00000000/json/".into(),
                status: 400,
                body: "Bad Request".into(),
            }
            .into());
        }

        Ok(())
    }
}

fn observability() -> (tempfile::TempDir, Arc<Observability>) {
    let dir = tempfile::tempdir().unwrap();
    let obs = Arc::new(Observability::new(dir.path()));
    (dir, obs)
}

#[tokio::test]
async fn exit_ends_the_loop_without_another_prompt() {
    let (_dir, obs) = observability();
    let session = obs.sessions().start_session();
    let prompter = ScriptedPrompter::new(&[MenuCommand::Exit, MenuCommand::Weather], &[]);
    let handlers = RecordingHandlers::new(obs.clone());

    let mut dispatcher = Dispatcher::new(obs.clone(), session, prompter, handlers);
    let outcome = dispatcher.run().await.unwrap();
    let (prompter, handlers) = dispatcher.into_parts();

    assert_eq!(outcome, LoopOutcome::Exit);
    assert_eq!(prompter.selections, [MenuCommand::Weather]);
    assert_eq!(prompter.notices, [FAREWELL]);
    assert!(handlers.calls.lock().is_empty());
}

#[tokio::test]
async fn selection_is_counted_before_its_handler_runs() {
    let (_dir, obs) = observability();
    let session = obs.sessions().start_session();
    let prompter = ScriptedPrompter::new(
        &[MenuCommand::ZipCode, MenuCommand::ZipCode, MenuCommand::Exit],
        &[false, false],
    );

    let mut dispatcher =
        Dispatcher::new(obs.clone(), session, prompter, RecordingHandlers::new(obs.clone()));
    dispatcher.run().await.unwrap();
    let (_, handlers) = dispatcher.into_parts();

    assert_eq!(
        *handlers.calls.lock(),
        [(MenuCommand::ZipCode, 1), (MenuCommand::ZipCode, 2)]
    );
}

#[tokio::test]
async fn confirming_repeat_runs_the_handler_again() {
    let (_dir, obs) = observability();
    let session = obs.sessions().start_session();
    let prompter = ScriptedPrompter::new(&[MenuCommand::Weather, MenuCommand::Exit], &[true]);

    let mut dispatcher =
        Dispatcher::new(obs.clone(), session.clone(), prompter, RecordingHandlers::new(obs.clone()));
    dispatcher.run().await.unwrap();
    let (prompter, handlers) = dispatcher.into_parts();

    let commands: Vec<_> = handlers.calls.lock().iter().map(|(c, _)| *c).collect();
    assert_eq!(commands, [MenuCommand::Weather, MenuCommand::Weather]);
    assert_eq!(prompter.questions, ["Você deseja consultar o clima de outra cidade?"]);

    // The repeat is timed separately but is not a menu selection.
    let counts = obs.sessions().session(&session).unwrap().commands_used;
    assert_eq!(
        counts,
        [
            CommandCount { command: "weather_command".into(), count: 1 },
            CommandCount { command: "exit".into(), count: 1 },
        ]
    );
    assert_eq!(obs.timers().pending(), 0);
}

#[tokio::test]
async fn handler_failure_is_reported_and_the_loop_continues() {
    let (_dir, obs) = observability();
    let session = obs.sessions().start_session();
    let prompter = ScriptedPrompter::new(
        &[MenuCommand::ZipCode, MenuCommand::SearchZipCode, MenuCommand::Exit],
        &[true, false],
    );
    let handlers = RecordingHandlers::new(obs.clone()).failing(MenuCommand::ZipCode);

    let mut dispatcher = Dispatcher::new(obs.clone(), session, prompter, handlers);
    let outcome = dispatcher.run().await.unwrap();
    let (prompter, handlers) = dispatcher.into_parts();

    assert_eq!(outcome, LoopOutcome::Exit);
    // First attempt and its repeat both fail.
    assert_eq!(prompter.alerts, ["Erro ao consultar o CEP!", "Erro ao consultar o CEP!"]);
    assert_eq!(handlers.calls.lock().len(), 3);
    assert_eq!(obs.timers().pending(), 0);
}

#[tokio::test]
async fn settings_shows_placeholder_and_returns_to_menu() {
    let (_dir, obs) = observability();
    let session = obs.sessions().start_session();
    let prompter = ScriptedPrompter::new(&[MenuCommand::Settings, MenuCommand::Exit], &[]);

    let mut dispatcher =
        Dispatcher::new(obs.clone(), session, prompter, RecordingHandlers::new(obs.clone()));
    dispatcher.run().await.unwrap();
    let (prompter, handlers) = dispatcher.into_parts();

    assert_eq!(prompter.notices, [SETTINGS_PLACEHOLDER, FAREWELL]);
    assert!(prompter.questions.is_empty());
    assert!(handlers.calls.lock().is_empty());
}

#[tokio::test]
async fn prompt_failure_ends_the_loop_with_an_error() {
    let (_dir, obs) = observability();
    let session = obs.sessions().start_session();
    let prompter = ScriptedPrompter::new(&[MenuCommand::Settings], &[]);

    let mut dispatcher =
        Dispatcher::new(obs.clone(), session, prompter, RecordingHandlers::new(obs.clone()));
    let err = dispatcher.run().await.unwrap_err();

    assert!(err.to_string().contains("script exhausted"));
    assert_eq!(obs.usage().get("settings").unwrap().total_usage, 1);
}

#[tokio::test]
async fn finished_run_persists_session_summary() {
    let (dir, obs) = observability();
    let session = obs.sessions().start_session();
    let prompter = ScriptedPrompter::new(
        &[MenuCommand::Weather, MenuCommand::Weather, MenuCommand::ZipCode, MenuCommand::Exit],
        &[],
    );

    let mut dispatcher =
        Dispatcher::new(obs.clone(), session.clone(), prompter, RecordingHandlers::new(obs.clone()));
    dispatcher.run().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    obs.sessions().end_session(&session).expect("session ends");

    let raw = fs::read_to_string(dir.path().join(format!("{session}.json"))).unwrap();
    let record: SessionRecord = serde_json::from_str(&raw).unwrap();
    assert!(record.duration > 0);
    assert_eq!(
        record.commands_used,
        [
            CommandCount { command: "weather_command".into(), count: 2 },
            CommandCount { command: "zip_code_command".into(), count: 1 },
            CommandCount { command: "exit".into(), count: 1 },
        ]
    );

    let summary = obs.usage().summary();
    assert_eq!(summary.total_usage, 4);
    assert_eq!(summary.commands_by_usage[0].command, "weather_command");
}
