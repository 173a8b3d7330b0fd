use std::{panic::Location, path::PathBuf};

use thiserror::Error;

use crate::types::OracleError;

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{file}:{line}: {source}")]
    Located {
        file: &'static str,
        line: u32,
        #[source]
        source: Box<Error>,
    },

    // =========================================================================
    // Scopes and names
    // =========================================================================
    #[error("'{name}' is already bound in this scope")]
    DuplicateBinding { name: String },

    #[error("scope binding name must not be blank")]
    EmptyBindingName,

    #[error("cannot allocate a unique name for '{base}'")]
    UniqueNamesExhausted { base: String },

    // =========================================================================
    // Templates
    // =========================================================================
    #[error("unresolved marker '{marker}' in '{line}'")]
    UnresolvedMarker { marker: String, line: String },

    #[error("positional marker '{marker}' out of range, {len} arguments given")]
    PositionalOutOfRange { marker: String, len: usize },

    #[error("unterminated marker in '{line}'")]
    UnterminatedMarker { line: String },

    #[error("unsupported format '{format}' for {kind} value")]
    UnsupportedFormat { format: String, kind: &'static str },

    // =========================================================================
    // Imports
    // =========================================================================
    #[error("import path must not be empty")]
    EmptyImportPath,

    #[error("pseudo package \"C\" cannot be imported with alias '{alias}'")]
    AliasedPseudoImport { alias: String },

    #[error("invalid import alias '{alias}'")]
    InvalidAlias { alias: String },

    #[error("alias '{alias}' requested for '{path}' is already used by '{other}'")]
    AliasTaken {
        alias: String,
        path: String,
        other: String,
    },

    #[error("'{path}' is already imported as '{existing}', cannot import it as '{alias}'")]
    AliasMismatch {
        path: String,
        alias: String,
        existing: String,
    },

    // =========================================================================
    // Functions
    // =========================================================================
    #[error("{what}: invalid identifier '{name}'")]
    InvalidIdentifier { what: String, name: String },

    #[error("{what}: duplicate name '{name}'")]
    DuplicateParameter { what: String, name: String },

    #[error("{what}: named and unnamed entries must not be mixed")]
    MixedNames { what: String },

    #[error("{what}: odd number of key/value tokens ({len})")]
    OddKeyValues { what: String, len: usize },

    #[error("{what}: token at position {index} must be {expected}")]
    InvalidToken {
        what: String,
        index: usize,
        expected: &'static str,
    },

    #[error("{what}: 'name type' sequence must end with an empty string")]
    MissingTerminator { what: String },

    // =========================================================================
    // Modules, packages and files
    // =========================================================================
    #[error("invalid package path '{path}': {reason}")]
    InvalidPackagePath { path: String, reason: &'static str },

    #[error("invalid package name '{name}'")]
    InvalidPackageName { name: String },

    #[error("package '{path}' is already named '{existing}', cannot name it '{requested}'")]
    PackageNameConflict {
        path: String,
        existing: String,
        requested: String,
    },

    #[error("module discovery failed: {reason}")]
    Module { reason: String },

    #[error(transparent)]
    Config(#[from] Box<gogh_config::Error>),

    #[error("cannot reuse '{path}': {reason}")]
    Reuse { path: PathBuf, reason: String },

    #[error("failed to format source:\n{diagnostics}\n{listing}")]
    Format {
        diagnostics: String,
        listing: String,
    },

    #[error("render {package}/{file}")]
    Render {
        package: String,
        file: String,
        #[source]
        source: Box<Error>,
    },

    #[error("i/o on '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl Error {
    /// Attach a caller location unless one is attached already.
    pub fn at(self, location: &'static Location<'static>) -> Self {
        if matches!(self, Error::Located { .. }) {
            return self;
        }
        Error::Located {
            file: location.file(),
            line: location.line(),
            source: Box::new(self),
        }
    }

    /// The error without the location wrapper.
    pub fn kind(&self) -> &Error {
        match self {
            Error::Located { source, .. } => source.kind(),
            other => other,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Attach the caller location to an error result.
pub(crate) trait Locate<T> {
    fn located(self, location: &'static Location<'static>) -> Result<T>;
}

impl<T> Locate<T> for Result<T> {
    fn located(self, location: &'static Location<'static>) -> Result<T> {
        self.map_err(|e| e.at(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_located_wraps_once() {
        let location = Location::caller();
        let err = Error::EmptyImportPath.at(location).at(location);

        assert!(matches!(err, Error::Located { ref source, .. } if matches!(**source, Error::EmptyImportPath)));
        assert!(matches!(err.kind(), Error::EmptyImportPath));
        assert!(err.to_string().ends_with("import path must not be empty"));
    }
}
