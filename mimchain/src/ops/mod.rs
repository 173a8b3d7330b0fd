//! Core operations.
//!
//! The logic behind mimchain commands, separated from argument parsing
//! and output rendering.

pub mod generate;

pub use generate::{GenerateOptions, generate};
