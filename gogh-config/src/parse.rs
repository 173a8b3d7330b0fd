//! Configuration parsing and validation.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use gogh_core::is_identifier;

use crate::{Config, Error, Result, error::SourceContext};

/// File name looked up at the module root.
pub const CONFIG_FILE: &str = "gogh.toml";

impl FromStr for Config {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_config(s, CONFIG_FILE)
    }
}

/// Parse configuration content with the given filename for error reporting.
pub fn parse_config(content: &str, filename: &str) -> Result<Config> {
    let ctx = SourceContext::new(content, filename);
    let config: Config = toml::from_str(content).map_err(|e| ctx.parse_error(e))?;
    validate_config(&config, &ctx)?;
    Ok(config)
}

fn validate_config(config: &Config, ctx: &SourceContext) -> Result<()> {
    let command = &config.format.command;
    if command.get_ref().trim().is_empty() {
        return Err(ctx.validation_error(
            "formatter command must not be empty",
            Some(command.span().into()),
        ));
    }

    for (path, alias) in &config.imports.aliases {
        if path.is_empty() {
            return Err(ctx.validation_error(
                "package path must not be empty",
                Some(alias.span().into()),
            ));
        }
        if !is_identifier(alias.get_ref()) {
            return Err(ctx.invalid_alias_error(
                path,
                alias.get_ref(),
                Some(alias.span().into()),
            ));
        }
    }

    Ok(())
}

/// A `gogh.toml` file with both its location and parsed content.
#[derive(Debug)]
pub struct GoghToml {
    path: PathBuf,
    config: Config,
}

impl GoghToml {
    /// Open and parse a configuration file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let config = parse_config(&content, &path.display().to_string())?;

        Ok(Self { path, config })
    }

    /// Load `gogh.toml` from `dir` if present, defaults otherwise.
    pub fn load_or_default(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE);
        if path.exists() {
            return Self::open(path);
        }

        Ok(Self {
            path,
            config: Config::default(),
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the parsed configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::StdlibMode;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config.formatter(), "gofmt");
        assert_eq!(config.imports.stdlib, StdlibMode::Heuristic);
        assert!(config.generate.autogen.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = r#"
[format]
command = "fancyfmt"
args = ["-"]

[imports]
stdlib = "go-list"

[imports.aliases]
"github.com/sirkon/errors" = "errs"

[generate]
autogen = "mimchain"
"#
        .parse()
        .unwrap();

        assert_eq!(config.formatter(), "fancyfmt");
        assert_eq!(config.format.args, vec!["-".to_string()]);
        assert_eq!(config.imports.stdlib, StdlibMode::GoList);
        assert_eq!(
            config.aliases().collect::<Vec<_>>(),
            vec![("github.com/sirkon/errors", "errs")]
        );
        assert_eq!(config.generate.autogen.as_deref(), Some("mimchain"));
    }

    #[test]
    fn test_invalid_alias_rejected() {
        let err = r#"
[imports.aliases]
"github.com/x/y" = "not-an-ident"
"#
        .parse::<Config>()
        .unwrap_err();

        assert!(matches!(*err, Error::InvalidAlias { ref alias, .. } if alias == "not-an-ident"));
    }

    #[test]
    fn test_empty_formatter_rejected() {
        let err = "[format]\ncommand = \"  \"\n".parse::<Config>().unwrap_err();
        assert!(matches!(*err, Error::Validation { .. }));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let err = "[format]\nprogram = \"gofmt\"\n".parse::<Config>().unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let file = GoghToml::load_or_default(temp.path()).unwrap();
        assert_eq!(file.path(), temp.path().join(CONFIG_FILE));
        assert_eq!(file.config().formatter(), "gofmt");
    }

    #[test]
    fn test_open_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = GoghToml::open(temp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(*err, Error::Io { .. }));
    }
}
