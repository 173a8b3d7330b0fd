//! Core utilities shared by the gogh crates.
//!
//! This crate provides identifier case conversions, Go keyword tables
//! and file output helpers.

mod cases;
mod file;
mod keywords;

// Case conversions
pub use cases::{COMMON_INITIALISMS, escape_reserved, private, proto, public, struck, underscored};
// File operations
pub use file::{OutputFile, WriteResult, write_file};
// Go language tables
pub use keywords::{GO_KEYWORDS, GO_PREDECLARED, is_identifier, is_keyword, is_predeclared};
