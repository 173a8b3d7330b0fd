//! Import management for generated files.
//!
//! - [`ImportRegistry`] - per-file imports with lazy alias resolution
//! - [`PackageCache`] - knowledge shared by all files of a module
//! - [`Weighter`] / [`GenericWeighter`] - import block grouping
//! - [`heuristic_less`] - ordering of paths within a group

mod cache;
mod order;
mod registry;
mod weight;

pub use cache::{PackageCache, StdlibSource};
pub use order::{heuristic_less, roman_value, sort_paths};
pub use registry::{
    AliasCorrector, AliasTable, Import, ImportGroup, ImportRegistry, ImportSettings,
};
pub use weight::{GenericWeighter, Weighter};
