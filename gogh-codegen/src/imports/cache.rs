//! Package knowledge shared by every file of a module.

use std::{
    collections::{HashMap, HashSet},
    process::Command,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

use tracing::{debug, warn};

/// How standard library import paths are recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdlibSource {
    /// A path whose first element has no dot belongs to the standard library
    #[default]
    Heuristic,
    /// Ask `go list std` once, falling back to the heuristic if that fails
    GoList,
}

/// Cross-file package cache: committed aliases, packages generated in the
/// current module and the standard library set.
///
/// One instance is owned by a module and shared by all of its files, which
/// keeps aliases consistent across the generated files.
#[derive(Debug, Default)]
pub struct PackageCache {
    aliases: Mutex<HashMap<String, String>>,
    local: Mutex<HashMap<String, String>>,
    stdlib_source: StdlibSource,
    stdlib: OnceLock<Option<HashSet<String>>>,
}

impl PackageCache {
    pub fn new(stdlib_source: StdlibSource) -> Self {
        Self {
            stdlib_source,
            ..Default::default()
        }
    }

    /// Alias some file has committed for `path` before.
    pub fn cached_alias(&self, path: &str) -> Option<String> {
        lock(&self.aliases).get(path).cloned()
    }

    pub fn remember_alias(&self, path: &str, alias: &str) {
        lock(&self.aliases)
            .entry(path.to_string())
            .or_insert_with(|| alias.to_string());
    }

    /// Record a package generated within the module.
    pub fn register_local(&self, path: &str, name: &str) {
        lock(&self.local).insert(path.to_string(), name.to_string());
    }

    /// Name of a package generated within the module.
    pub fn local_name(&self, path: &str) -> Option<String> {
        lock(&self.local).get(path).cloned()
    }

    /// Whether `path` belongs to the standard library. Packages generated
    /// within the module never do, dotted module path or not.
    pub fn is_stdlib(&self, path: &str) -> bool {
        if lock(&self.local).contains_key(path) {
            return false;
        }
        match self.stdlib_source {
            StdlibSource::Heuristic => looks_like_stdlib(path),
            StdlibSource::GoList => match self.stdlib.get_or_init(load_stdlib) {
                Some(set) => set.contains(path),
                None => looks_like_stdlib(path),
            },
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn looks_like_stdlib(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or_default();
    !first.is_empty() && !first.contains('.')
}

fn load_stdlib() -> Option<HashSet<String>> {
    let output = match Command::new("go").args(["list", "std"]).output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            warn!(
                stderr = %String::from_utf8_lossy(&output.stderr),
                "go list std failed, using path heuristic"
            );
            return None;
        }
        Err(err) => {
            warn!(error = %err, "cannot run go list std, using path heuristic");
            return None;
        }
    };

    let set: HashSet<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    debug!(packages = set.len(), "standard library loaded");
    Some(set)
}
