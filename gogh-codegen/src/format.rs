//! Source formatting of rendered Go files.

use std::{
    fmt,
    io::Write,
    process::{Command, Stdio},
    thread,
};

use tracing::{error, trace};

use crate::{Error, Result};

/// Formats rendered Go source before it is written.
pub trait SourceFormatter: Send + Sync + fmt::Debug {
    fn format(&self, source: &[u8]) -> Result<Vec<u8>>;
}

/// Pipes the source through an external program such as `gofmt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFormatter {
    command: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(command: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn gofmt() -> Self {
        Self::new("gofmt", Vec::<String>::new())
    }

    pub fn from_config(config: &gogh_config::Config) -> Self {
        Self::new(config.formatter(), config.format.args.iter().cloned())
    }
}

impl Default for CommandFormatter {
    fn default() -> Self {
        Self::gofmt()
    }
}

impl SourceFormatter for CommandFormatter {
    fn format(&self, source: &[u8]) -> Result<Vec<u8>> {
        trace!(command = %self.command, bytes = source.len(), "formatting source");

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::io(&self.command, e))?;

        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.to_vec();
            thread::spawn(move || stdin.write_all(&input))
        });
        let output = child
            .wait_with_output()
            .map_err(|e| Error::io(&self.command, e))?;
        let written = match writer.map(|w| w.join()) {
            None => Err("stdin was not captured".to_string()),
            Some(Ok(Ok(()))) => Ok(()),
            Some(Ok(Err(e))) => Err(format!("writing source failed: {e}")),
            Some(Err(_)) => Err("source writer panicked".to_string()),
        };

        // A formatter stopping early on a syntax error is reported through
        // its exit status, a broken pipe only matters when it claims success.
        if !output.status.success() {
            let diagnostics = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            return Err(self.rejected(diagnostics, source));
        }
        if let Err(diagnostics) = written {
            return Err(self.rejected(diagnostics, source));
        }
        if output.stdout.is_empty() && !source.is_empty() {
            return Err(self.rejected(
                format!("{} exited successfully without output", self.command),
                source,
            ));
        }
        Ok(output.stdout)
    }
}

impl CommandFormatter {
    fn rejected(&self, diagnostics: String, source: &[u8]) -> Error {
        error!(command = %self.command, %diagnostics, "formatter rejected source");
        Error::Format {
            diagnostics,
            listing: numbered_listing(&String::from_utf8_lossy(source)),
        }
    }
}

/// Leaves the source untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl SourceFormatter for NoopFormatter {
    fn format(&self, source: &[u8]) -> Result<Vec<u8>> {
        Ok(source.to_vec())
    }
}

/// Source lines prefixed with zero padded, one based line numbers.
pub fn numbered_listing(source: &str) -> String {
    let lines: Vec<&str> = source.split('\n').collect();
    let width = lines.len().to_string().len();

    let mut out = String::with_capacity(source.len() + lines.len() * (width + 2));
    for (i, line) in lines.iter().enumerate() {
        out.push_str(&format!("{:0width$}: {line}\n", i + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_listing() {
        let source = (1..=10).map(|i| format!("l{i}")).collect::<Vec<_>>().join("\n");
        let listing = numbered_listing(&source);

        assert!(listing.starts_with("01: l1\n02: l2\n"));
        assert!(listing.ends_with("10: l10\n"));
    }

    #[test]
    fn test_noop() {
        assert_eq!(NoopFormatter.format(b"package x").unwrap(), b"package x");
    }

    #[test]
    fn test_missing_command() {
        let formatter = CommandFormatter::new("gogh-no-such-formatter", ["-x"]);
        assert!(matches!(
            formatter.format(b"package x"),
            Err(Error::Io { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_formatter_ignoring_stdin() {
        let formatter = CommandFormatter::new("true", Vec::<String>::new());
        let err = formatter.format(b"package x\n").unwrap_err();
        let Error::Format { diagnostics, listing } = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(diagnostics.contains("without output") || diagnostics.contains("writing source failed"));
        assert_eq!(listing, "1: package x\n2: \n");
    }

    #[cfg(unix)]
    #[test]
    fn test_formatter_output_returned() {
        let formatter = CommandFormatter::new("cat", Vec::<String>::new());
        assert_eq!(formatter.format(b"package x\n").unwrap(), b"package x\n");
    }

    #[test]
    fn test_from_config() {
        let config: gogh_config::Config = "[format]\ncommand = \"goimports\"\nargs = [\"-local\", \"example.com\"]\n"
            .parse()
            .unwrap();
        let formatter = CommandFormatter::from_config(&config);
        assert_eq!(formatter, CommandFormatter::new("goimports", ["-local", "example.com"]));
    }
}
