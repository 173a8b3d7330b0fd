//! `gogh.toml` parsing and validation.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod config;
mod error;
mod parse;

pub use config::{Config, FormatConfig, GenerateConfig, ImportsConfig, StdlibMode};
pub use error::{Error, Result};
pub use parse::{CONFIG_FILE, GoghToml, parse_config};
