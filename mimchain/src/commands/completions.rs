//! `mimchain completions`: print or save a shell completion script.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use clap::{Args, CommandFactory};
use eyre::{Result, WrapErr};
use tracing::info;

use super::Cli;
use crate::APP_NAME;

#[derive(Args)]
pub struct CompletionsCommand {
    /// Shell the completion script targets
    shell: clap_complete::Shell,

    /// Save the script to this file instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl CompletionsCommand {
    pub fn run(&self) -> Result<()> {
        let Some(path) = &self.output else {
            return self.write_script(&mut io::stdout().lock());
        };

        let file = File::create(path)
            .wrap_err_with(|| format!("Failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        self.write_script(&mut out)?;
        out.flush()
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        info!(shell = %self.shell, path = %path.display(), "completion script saved");
        Ok(())
    }

    fn write_script(&self, out: &mut dyn Write) -> Result<()> {
        let mut cmd = Cli::command();
        clap_complete::generate(self.shell, &mut cmd, APP_NAME, out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap_complete::Shell;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_script_names_subcommands() {
        let cmd = CompletionsCommand {
            shell: Shell::Bash,
            output: None,
        };
        let mut buf = Vec::new();
        cmd.write_script(&mut buf).unwrap();

        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("mimchain"));
        assert!(script.contains("generate"));
        assert!(script.contains("completions"));
    }

    #[test]
    fn test_script_saved_to_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mimchain.zsh");
        CompletionsCommand {
            shell: Shell::Zsh,
            output: Some(path.clone()),
        }
        .run()
        .unwrap();

        let script = std::fs::read_to_string(&path).unwrap();
        assert!(script.contains("#compdef mimchain"));
    }
}
