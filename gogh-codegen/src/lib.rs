//! Go source generation.
//!
//! A [`Module`] hands out [`Package`]s, packages hand out file renderers,
//! and [`Module::render`] formats and writes everything at the end.
//!
//! ```ignore
//! let module = Module::open(".")?;
//! let package = module.package("model", "internal/model")?;
//!
//! let mut r = package.go_file("model.go");
//! r.import("github.com/sirkon/errors")?.bind("errs")?;
//! r.line("var ErrMissing = $errs.New(\"missing\")")?;
//!
//! module.render()?;
//! ```
//!
//! # Module Organization
//!
//! - [`renderer`] - file renderers, templated lines, scopes and functions
//! - [`imports`] - per file import registries and path ordering
//! - [`types`] - type descriptors and the type oracle seam
//! - [`template`] - the `$name`/`${name:fmt}` line template language
//! - [`format`] - external source formatters
//! - [`testing`] - temporary module fixtures (feature-gated)

mod blocks;
mod error;
mod module;
mod params;
mod scope;
mod uniq;
mod value;
mod zeroes;

pub mod format;
pub mod imports;
pub mod renderer;
pub mod reuse;
pub mod template;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Error, Result};
pub use format::{CommandFormatter, NoopFormatter, SourceFormatter};
pub use module::{Module, ModuleBuilder, Package, discover_module, validate_package_path};
pub use params::{ParamEntry, ParamType, ParamsSpec};
pub use renderer::{
    FunctionBuilder, GoRenderer, ImportHandle, RETURN_ZERO_VALUES, RawRenderer, Receiver,
    Renderer,
};
pub use reuse::ReuseInfo;
pub use uniq::UniqueNames;
pub use value::{Commas, L, Params, Q, Value, go_quote};
pub use zeroes::{Zero, ZeroTuple, zero_of_text, zero_of_type};
