//! Test utilities for generators.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::{Module, NoopFormatter};

/// Module path used by [`TempModule`].
pub const TEST_MODULE: &str = "example.com/gen";

/// A throwaway Go module in a temporary directory.
///
/// Files are rendered unformatted so tests do not need a Go toolchain.
pub struct TempModule {
    dir: TempDir,
    module: Module,
}

impl TempModule {
    pub fn new() -> io::Result<Self> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("go.mod"),
            format!("module {TEST_MODULE}\n\ngo 1.22\n"),
        )?;
        let module = Module::builder(dir.path(), TEST_MODULE)
            .formatter(NoopFormatter)
            .build();
        Ok(Self { dir, module })
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `rel`.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Put a file in place before generation, creating its directory.
    pub fn write(&self, rel: &str, content: &str) -> io::Result<()> {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    }

    pub fn read(&self, rel: &str) -> io::Result<String> {
        fs::read_to_string(self.path(rel))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }
}

/// Assert that two strings are equal, listing differing lines on failure.
pub fn assert_content_eq(expected: &str, actual: &str) {
    if expected == actual {
        return;
    }

    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();
    let mut diff = String::new();
    for i in 0..expected_lines.len().max(actual_lines.len()) {
        let e = expected_lines.get(i).copied();
        let a = actual_lines.get(i).copied();
        if e != a {
            diff.push_str(&format!(
                "line {}:\n  expected: {:?}\n  actual:   {:?}\n",
                i + 1,
                e.unwrap_or("<missing>"),
                a.unwrap_or("<missing>")
            ));
        }
    }
    panic!("content mismatch:\n{diff}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_module() {
        let temp = TempModule::new().unwrap();
        assert!(temp.exists("go.mod"));
        assert_eq!(temp.module().path(), TEST_MODULE);

        temp.write("pkg/a.go", "package a\n").unwrap();
        assert_eq!(temp.read("pkg/a.go").unwrap(), "package a\n");
    }

    #[test]
    #[should_panic(expected = "line 2")]
    fn test_assert_content_eq_reports_line() {
        assert_content_eq("a\nb\n", "a\nc\n");
    }
}
