//! Command-line front end for the arena.
//!
//! - `arena run`: load a config, pick questions, play the tournament, save the run
//! - `arena questions`: browse the built-in question bank
//! - `arena analyze`: Markdown summary of a saved run
//! - `arena check-config`: validate a config and list usable models

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Command, RunArgs};
pub use config::{ArenaConfig, ConfigError};
