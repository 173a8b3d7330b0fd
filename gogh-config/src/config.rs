//! Schema of `gogh.toml`.

use indexmap::IndexMap;
use serde::Deserialize;
use toml::Spanned;

/// Root of a `gogh.toml` file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// External source formatter
    #[serde(default)]
    pub format: FormatConfig,

    /// Import alias resolution
    #[serde(default)]
    pub imports: ImportsConfig,

    /// Generated file headers
    #[serde(default)]
    pub generate: GenerateConfig,
}

/// `[format]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatConfig {
    /// Formatter program, fed the source through stdin
    #[serde(default = "default_formatter")]
    pub command: Spanned<String>,

    /// Extra formatter arguments
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_formatter() -> Spanned<String> {
    Spanned::new(0..0, "gofmt".to_string())
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            command: default_formatter(),
            args: Vec::new(),
        }
    }
}

/// How standard library packages are recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StdlibMode {
    /// A path whose first element has no dot is a standard library path
    #[default]
    Heuristic,
    /// Ask `go list std` once per process
    GoList,
}

/// `[imports]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportsConfig {
    #[serde(default)]
    pub stdlib: StdlibMode,

    /// Package path -> alias to use when the default one collides
    #[serde(default)]
    pub aliases: IndexMap<String, Spanned<String>>,
}

/// `[generate]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateConfig {
    /// Application name for the `// Code generated by ...` header
    pub autogen: Option<String>,
}

impl Config {
    /// Formatter program name.
    pub fn formatter(&self) -> &str {
        self.format.command.get_ref()
    }

    /// Alias corrections as plain strings.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.imports
            .aliases
            .iter()
            .map(|(path, alias)| (path.as_str(), alias.get_ref().as_str()))
    }
}
