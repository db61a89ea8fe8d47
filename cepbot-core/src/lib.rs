//! Core library for the `cepbot` chatbot.
//!
//! This crate defines:
//! - Configuration handling
//! - Instrumented clients for IBGE, Nominatim, Open-Meteo and ViaCEP
//! - In-process observability (timers, API metrics, sessions, command usage)
//! - The menu dispatch loop, generic over the terminal and the command handlers
//!
//! It is used by `cepbot-cli`, which supplies the `inquire` prompts and the
//! console rendering.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod model;
pub mod observability;
pub mod validate;

pub use api::Services;
pub use config::{Config, Endpoints, LogLevel};
pub use dispatch::{CommandHandlers, Dispatcher, LoopOutcome, MenuCommand, Prompter};
pub use error::{ApiError, CommandError};
pub use observability::{Observability, SessionId};
