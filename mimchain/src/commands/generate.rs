use std::path::PathBuf;

use clap::Args;
use eyre::{Context, Result};
use gogh_codegen::{Module, discover_module};
use gogh_config::GoghToml;

use super::UnwrapOrExit;
use crate::{
    APP_NAME,
    chain::DEFAULT_RUNTIME,
    oracle::JsonOracle,
    ops::{self, GenerateOptions},
    reports::{Report, TerminalOutput},
    source::SourcePoint,
};

#[derive(Args)]
pub struct GenerateCommand {
    /// Type with chainable functions and methods, as <package>:<Type>
    pub source: SourcePoint,

    /// Renderer type to generate, as <package>:<Type>
    pub target: SourcePoint,

    /// JSON package descriptions: a file or a directory of *.json files
    #[arg(long, value_name = "PATH")]
    pub types: PathBuf,

    /// Quote values given for string parameters
    #[arg(short, long)]
    pub quote: bool,

    /// Package name of the renderer, ignored when the package exists already
    #[arg(short = 'p', long = "package-name")]
    pub package_name: Option<String>,

    /// Import path of the Go rendering library the generated code uses
    #[arg(long, default_value = DEFAULT_RUNTIME)]
    pub runtime: String,

    /// Directory within the Go module to generate into
    #[arg(short = 'C', long, default_value = ".")]
    pub dir: PathBuf,
}

impl GenerateCommand {
    pub fn run(&self) -> Result<()> {
        let (root, module_path) =
            discover_module(&self.dir).wrap_err("Failed to locate the Go module")?;
        let gogh_toml = GoghToml::load_or_default(&root).unwrap_or_exit();

        let module = Module::builder(root, module_path)
            .autogen(APP_NAME)
            .config(gogh_toml.config())
            .build();
        let oracle = JsonOracle::new(&self.types);

        let report = ops::generate(
            &module,
            &oracle,
            GenerateOptions {
                source: &self.source,
                target: &self.target,
                package_name: self.package_name.as_deref(),
                quote_strings: self.quote,
                runtime: &self.runtime,
            },
        )?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
