use cepbot_core::{
    CommandError, MenuCommand, Prompter,
    validate::{self, MIN_SEARCH_CHARS},
};
use inquire::{Confirm, CustomUserError, InquireError, Select, validator::Validation};

use crate::render;

/// Main menu and yes/no questions on the terminal.
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn select_command(&mut self) -> anyhow::Result<MenuCommand> {
        let choice = blocking(|| {
            Select::new("O que você deseja fazer?", MenuCommand::all().to_vec())
                .with_page_size(MenuCommand::all().len())
                .prompt()
        });

        match choice {
            Ok(command) => Ok(command),
            // Esc / Ctrl-C on the main menu leaves the chatbot.
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                Ok(MenuCommand::Exit)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        match blocking(|| Confirm::new(question).with_default(false).prompt()) {
            Ok(answer) => Ok(answer),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }

    fn alert(&mut self, message: &str) {
        render::failure(message);
    }
}

/// Run a terminal prompt that waits on the user. The tokio worker hands its
/// other tasks (timers, signal handling) to another thread while it waits.
pub fn blocking<T>(prompt: impl FnOnce() -> T) -> T {
    tokio::task::block_in_place(prompt)
}

/// Run a prompt inside a command handler. `None` means the user backed out
/// with Esc or Ctrl-C.
pub fn ask<T>(prompt: impl FnOnce() -> Result<T, InquireError>) -> Result<Option<T>, CommandError> {
    match blocking(prompt) {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(CommandError::Prompt(err.to_string())),
    }
}

pub fn cep_validator(input: &str) -> Result<Validation, CustomUserError> {
    Ok(match validate::normalize_cep(input) {
        Ok(_) => Validation::Valid,
        Err(err) => Validation::Invalid(err.to_string().into()),
    })
}

pub fn min_chars_validator(input: &str) -> Result<Validation, CustomUserError> {
    Ok(match validate::require_min_chars(input, MIN_SEARCH_CHARS) {
        Ok(()) => Validation::Valid,
        Err(err) => Validation::Invalid(err.to_string().into()),
    })
}
