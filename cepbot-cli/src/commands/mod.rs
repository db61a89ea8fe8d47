//! Interactive implementations of the menu commands.

use std::fmt;

use async_trait::async_trait;
use cepbot_core::{CommandError, CommandHandlers, MenuCommand, Services};

mod weather;
mod zip_code;

pub struct ChatHandlers {
    services: Services,
}

impl ChatHandlers {
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl CommandHandlers for ChatHandlers {
    async fn handle(&self, command: MenuCommand) -> Result<(), CommandError> {
        let services = &self.services;

        match command {
            MenuCommand::Weather => weather::forecast(&services.nominatim, &services.open_meteo).await,
            MenuCommand::ZipCode => zip_code::lookup(&services.viacep).await,
            MenuCommand::SearchZipCode => zip_code::search(&services.ibge, &services.viacep).await,
            // Handled by the dispatcher itself.
            MenuCommand::Exit | MenuCommand::Settings => Ok(()),
        }
    }
}

/// Select-list entry showing `label` and yielding `value`.
struct Choice<T> {
    label: String,
    value: T,
}

impl<T> Choice<T> {
    fn new(label: impl Into<String>, value: T) -> Self {
        Self { label: label.into(), value }
    }
}

impl<T> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
