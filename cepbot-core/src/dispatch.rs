//! The menu loop: read a selection, count it, run its handler, repeat.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::CommandError,
    observability::{Observability, SessionId, context},
};

/// Entries of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuCommand {
    Weather,
    ZipCode,
    SearchZipCode,
    Exit,
    Settings,
}

impl MenuCommand {
    /// Identifier used in logs and usage metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuCommand::Weather => "weather_command",
            MenuCommand::ZipCode => "zip_code_command",
            MenuCommand::SearchZipCode => "search_zip_code_command",
            MenuCommand::Exit => "exit",
            MenuCommand::Settings => "settings",
        }
    }

    /// Menu order.
    pub const fn all() -> &'static [MenuCommand] {
        &[
            MenuCommand::Weather,
            MenuCommand::ZipCode,
            MenuCommand::SearchZipCode,
            MenuCommand::Exit,
            MenuCommand::Settings,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuCommand::Weather => "Consultar clima",
            MenuCommand::ZipCode => "Consultar CEP",
            MenuCommand::SearchZipCode => "Pesquisar CEP",
            MenuCommand::Exit => "Sair",
            MenuCommand::Settings => "Configurações",
        }
    }

    pub fn repeat_question(&self) -> Option<&'static str> {
        match self {
            MenuCommand::Weather => Some("Você deseja consultar o clima de outra cidade?"),
            MenuCommand::ZipCode => Some("Você deseja consultar outro CEP?"),
            MenuCommand::SearchZipCode => Some("Você deseja pesquisar outro CEP?"),
            MenuCommand::Exit | MenuCommand::Settings => None,
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            MenuCommand::Weather => "Erro ao consultar previsão do tempo!",
            MenuCommand::ZipCode => "Erro ao consultar o CEP!",
            MenuCommand::SearchZipCode => "Ocorreu um erro na busca!",
            MenuCommand::Exit | MenuCommand::Settings => "Ocorreu um erro inesperado!",
        }
    }
}

impl fmt::Display for MenuCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for MenuCommand {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        MenuCommand::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| anyhow::anyhow!("Unknown menu command '{value}'."))
    }
}

pub const FAREWELL: &str = "Saindo...";
pub const SETTINGS_PLACEHOLDER: &str = "Configurações ainda não implementadas.";

/// Terminal-side of the loop.
pub trait Prompter: Send {
    fn select_command(&mut self) -> anyhow::Result<MenuCommand>;

    fn confirm(&mut self, question: &str) -> anyhow::Result<bool>;

    fn notify(&mut self, message: &str);

    fn alert(&mut self, message: &str);
}

/// Implementations of the interactive menu commands.
#[async_trait]
pub trait CommandHandlers: Send + Sync {
    async fn handle(&self, command: MenuCommand) -> Result<(), CommandError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The user chose "exit".
    Exit,
}

pub struct Dispatcher<P, H> {
    obs: Arc<Observability>,
    session: SessionId,
    prompter: P,
    handlers: H,
}

impl<P, H> Dispatcher<P, H>
where
    P: Prompter,
    H: CommandHandlers,
{
    pub fn new(obs: Arc<Observability>, session: SessionId, prompter: P, handlers: H) -> Self {
        Self { obs, session, prompter, handlers }
    }

    /// Run until the user exits. Prompt failures end the loop with an error.
    pub async fn run(&mut self) -> anyhow::Result<LoopOutcome> {
        loop {
            let command = self.prompter.select_command()?;

            if let Some(outcome) = self.dispatch(command).await? {
                return Ok(outcome);
            }
        }
    }

    /// Handle one selection. `Some` means the loop is over.
    pub async fn dispatch(&mut self, command: MenuCommand) -> anyhow::Result<Option<LoopOutcome>> {
        self.obs.sessions().record_command_usage(&self.session, command.as_str());

        match command {
            MenuCommand::Exit => {
                info!(command = command.as_str(), "User requested exit");
                self.prompter.notify(FAREWELL);
                Ok(Some(LoopOutcome::Exit))
            }
            MenuCommand::Settings => {
                info!(command = command.as_str(), "Settings requested but not implemented");
                self.prompter.notify(SETTINGS_PLACEHOLDER);
                Ok(None)
            }
            MenuCommand::Weather | MenuCommand::ZipCode | MenuCommand::SearchZipCode => {
                self.invoke(command, command.as_str()).await;

                if let Some(question) = command.repeat_question() {
                    if self.prompter.confirm(question)? {
                        let tag = format!("{}_repeat", command.as_str());
                        self.invoke(command, &tag).await;
                    }
                }

                Ok(None)
            }
        }
    }

    async fn invoke(&mut self, command: MenuCommand, tag: &str) {
        let extra = context([("command", json!(command.as_str()))]);
        let result = self.obs.measure(tag, extra, self.handlers.handle(command)).await;

        if let Err(err) = result {
            error!(command = command.as_str(), operation = tag, "Command failed: {err}");
            self.prompter.alert(command.failure_message());
        }
    }

    pub fn into_parts(self) -> (P, H) {
        (self.prompter, self.handlers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip() {
        for command in MenuCommand::all() {
            assert_eq!(MenuCommand::try_from(command.as_str()).unwrap(), *command);
        }
        assert!(MenuCommand::try_from("dance").is_err());
    }

    #[test]
    fn only_handler_commands_ask_to_repeat() {
        for command in MenuCommand::all() {
            let has_handler = !matches!(command, MenuCommand::Exit | MenuCommand::Settings);
            assert_eq!(has_handler, command.repeat_question().is_some());
        }
    }

    #[test]
    fn display_uses_menu_label() {
        assert_eq!(MenuCommand::SearchZipCode.to_string(), "Pesquisar CEP");
    }
}
