use std::{
    io,
    path::{Path, PathBuf},
};

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File already had the exact content
    Unchanged,
}

/// A rendered file ready to be stored.
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
    content: Vec<u8>,
}

impl OutputFile {
    /// Create a new output file with the given path and content.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file content
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Write the file unless it already holds the same bytes.
    pub fn write(&self) -> io::Result<WriteResult> {
        match std::fs::read(&self.path) {
            Ok(existing) if existing == self.content => Ok(WriteResult::Unchanged),
            _ => {
                write_file(&self.path, &self.content)?;
                Ok(WriteResult::Written)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("main.go");

        write_file(&path, b"package b\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "package b\n");
    }

    #[test]
    fn test_output_file_written() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("main.go");
        fs::write(&path, "package old\n").unwrap();

        let file = OutputFile::new(&path, "package new\n");

        assert_eq!(file.write().unwrap(), WriteResult::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "package new\n");
    }

    #[test]
    fn test_output_file_unchanged() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("main.go");
        fs::write(&path, "package same\n").unwrap();

        let file = OutputFile::new(&path, "package same\n");

        assert_eq!(file.write().unwrap(), WriteResult::Unchanged);
    }
}
