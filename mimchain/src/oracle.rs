//! Type oracle backed by JSON package descriptions.
//!
//! The source is either one JSON file holding a package description or an
//! array of them, or a directory whose `*.json` files are read that way.
//! Everything is loaded on the first query.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use gogh_codegen::types::{OracleError, PackageDescription, TypeOracle};
use serde::Deserialize;
use tracing::debug;

type Index = HashMap<String, Arc<PackageDescription>>;

#[derive(Debug)]
pub struct JsonOracle {
    source: PathBuf,
    index: Mutex<Option<Index>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    One(PackageDescription),
    Many(Vec<PackageDescription>),
}

impl JsonOracle {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            index: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Index>> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TypeOracle for JsonOracle {
    fn package(&self, path: &str) -> Result<Arc<PackageDescription>, OracleError> {
        let mut index = self.lock();
        if index.is_none() {
            *index = Some(load(&self.source)?);
        }

        index
            .as_ref()
            .and_then(|index| index.get(path).cloned())
            .ok_or_else(|| OracleError::PackageNotFound {
                path: path.to_string(),
            })
    }
}

fn load(source: &Path) -> Result<Index, OracleError> {
    let load_error = |message: String| OracleError::Load {
        path: source.display().to_string(),
        message,
    };

    let files = if source.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(source)
            .map_err(|e| load_error(e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        files
    } else {
        vec![source.to_path_buf()]
    };

    let mut index = Index::new();
    for file in files {
        let content = fs::read_to_string(&file).map_err(|e| OracleError::Load {
            path: file.display().to_string(),
            message: e.to_string(),
        })?;
        let document: Document =
            serde_json::from_str(&content).map_err(|e| OracleError::Load {
                path: file.display().to_string(),
                message: e.to_string(),
            })?;

        let packages = match document {
            Document::One(package) => vec![package],
            Document::Many(packages) => packages,
        };
        for package in packages {
            debug!(package = %package.path, file = %file.display(), "package description loaded");
            index.insert(package.path.clone(), Arc::new(package));
        }
    }
    Ok(index)
}
