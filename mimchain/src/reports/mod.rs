//! Report data structures for commands.
//!
//! Operations build reports, commands render them to an [`Output`].

mod generate;
mod output;

pub use generate::GenerateReport;
#[cfg(test)]
pub use output::BufferOutput;
pub use output::{Report, TerminalOutput};
