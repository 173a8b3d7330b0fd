//! Generate operation: write the chaining renderer of a type.

use eyre::{Context, Result};
use gogh_codegen::{
    Module,
    types::{TypeOracle, default_package_name},
};
use tracing::info;

use crate::{
    chain::{ChainGenerator, ChainOptions},
    reports::GenerateReport,
    source::SourcePoint,
};

pub struct GenerateOptions<'a> {
    pub source: &'a SourcePoint,
    pub target: &'a SourcePoint,
    /// Name for a target package that does not exist yet
    pub package_name: Option<&'a str>,
    pub quote_strings: bool,
    pub runtime: &'a str,
}

/// Generate the renderer for `opts.source` into the target package and
/// write it to disk.
pub fn generate(
    module: &Module,
    oracle: &dyn TypeOracle,
    opts: GenerateOptions<'_>,
) -> Result<GenerateReport> {
    let name = package_name(module, &opts)?;

    let generator = ChainGenerator::new(
        oracle,
        opts.source,
        opts.target,
        ChainOptions {
            quote_strings: opts.quote_strings,
            runtime: opts.runtime.to_string(),
        },
    )
    .wrap_err_with(|| format!("Failed to look up {}", opts.source))?;

    let package = module
        .package(&name, &opts.target.path)
        .wrap_err_with(|| format!("Failed to set up package {}", opts.target.path))?;
    let summary = generator
        .generate(&package)
        .wrap_err_with(|| format!("Failed to generate {}", opts.target))?;
    module.render().wrap_err("Failed to write generated code")?;

    let rel = package
        .path()
        .strip_prefix(module.path())
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or_default();
    let file = if rel.is_empty() {
        summary.file
    } else {
        format!("{rel}/{}", summary.file)
    };
    info!(file = %file, "renderer generated");

    Ok(GenerateReport {
        source: opts.source.to_string(),
        target: opts.target.to_string(),
        package: package.name().to_string(),
        file,
        constructors: summary.constructors,
        methods: summary.methods,
    })
}

/// Package name to ask for: an existing package keeps its own name, a new
/// one takes the requested name or the last element of its path.
fn package_name(module: &Module, opts: &GenerateOptions<'_>) -> Result<String> {
    let existing = module
        .package_name(&opts.target.path)
        .wrap_err_with(|| format!("Failed to read package {}", opts.target.path))?;

    Ok(match (existing, opts.package_name) {
        (Some(_), requested) => requested.unwrap_or_default().to_string(),
        (None, Some(requested)) => requested.to_string(),
        (None, None) => default_package_name(&opts.target.path),
    })
}
