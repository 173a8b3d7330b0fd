//! `<package>:<Identifier>` command line references.

use std::{fmt, str::FromStr};

use gogh_codegen::validate_package_path;
use gogh_core::{is_identifier, public};
use thiserror::Error;

/// A declared identifier of a Go package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePoint {
    pub path: String,
    pub ident: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourcePointError {
    #[error("missing ':' in '{0}', expected <package>:<identifier>")]
    MissingColon(String),

    #[error("package path and identifier are separated with a single ':', got {parts} parts in '{input}'")]
    TooManyParts { input: String, parts: usize },

    #[error("invalid package path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("identifier '{ident}' is not in public case, '{suggested}' would be")]
    NotPublic { ident: String, suggested: String },
}

impl FromStr for SourcePoint {
    type Err = SourcePointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (path, ident) = match parts.as_slice() {
            [_] => return Err(SourcePointError::MissingColon(s.to_string())),
            [path, ident] => (*path, *ident),
            _ => {
                return Err(SourcePointError::TooManyParts {
                    input: s.to_string(),
                    parts: parts.len(),
                });
            }
        };

        if path.is_empty() {
            return Err(SourcePointError::InvalidPath {
                path: path.to_string(),
                reason: "path must not be empty".to_string(),
            });
        }
        validate_package_path(path).map_err(|e| SourcePointError::InvalidPath {
            path: path.to_string(),
            reason: match e {
                gogh_codegen::Error::InvalidPackagePath { reason, .. } => reason.to_string(),
                other => other.to_string(),
            },
        })?;

        if !is_identifier(ident) {
            return Err(SourcePointError::InvalidIdentifier(ident.to_string()));
        }
        let suggested = public(ident);
        if suggested != ident {
            return Err(SourcePointError::NotPublic {
                ident: ident.to_string(),
                suggested,
            });
        }

        Ok(Self {
            path: path.to_string(),
            ident: ident.to_string(),
        })
    }
}

impl fmt::Display for SourcePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.ident)
    }
}
