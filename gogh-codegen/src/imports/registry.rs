//! Per-file import registry.
//!
//! Every import path moves through `unregistered -> pending -> committed`.
//! Adding a path only records a provisional alias; the alias is checked for
//! collisions when the path is pushed, so paths nobody renders a reference
//! to never claim a name.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    sync::Arc,
};

use gogh_core::is_identifier;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::{GenericWeighter, PackageCache, Weighter, sort_paths};
use crate::{Error, Result, types::default_package_name};

// Upper bound of numeric alias suffixes tried before giving up.
const MAX_SUFFIX: usize = 1 << 16;

/// Replaces a colliding alias with a better one.
pub trait AliasCorrector: Send + Sync {
    /// Alternative for `alias` of `path`, or `None` to fall back to numbering.
    fn correct(&self, path: &str, alias: &str) -> Option<String>;
}

impl<F> AliasCorrector for F
where
    F: Fn(&str, &str) -> Option<String> + Send + Sync,
{
    fn correct(&self, path: &str, alias: &str) -> Option<String> {
        self(path, alias)
    }
}

/// Corrector backed by a fixed `path -> alias` table.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: IndexMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(path.into(), alias.into());
        self
    }
}

impl<P: Into<String>, A: Into<String>> FromIterator<(P, A)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (P, A)>>(iter: I) -> Self {
        Self {
            aliases: iter
                .into_iter()
                .map(|(p, a)| (p.into(), a.into()))
                .collect(),
        }
    }
}

impl AliasCorrector for AliasTable {
    fn correct(&self, path: &str, _alias: &str) -> Option<String> {
        self.aliases.get(path).cloned()
    }
}

/// Collaborators shared by the import registries of one module.
#[derive(Clone)]
pub struct ImportSettings {
    pub cache: Arc<PackageCache>,
    pub weighter: Arc<dyn Weighter>,
    pub corrector: Option<Arc<dyn AliasCorrector>>,
}

impl ImportSettings {
    pub fn new(cache: Arc<PackageCache>) -> Self {
        Self {
            weighter: Arc::new(GenericWeighter::new(cache.clone())),
            cache,
            corrector: None,
        }
    }

    pub fn with_weighter(mut self, weighter: impl Weighter + 'static) -> Self {
        self.weighter = Arc::new(weighter);
        self
    }

    pub fn with_corrector(mut self, corrector: impl AliasCorrector + 'static) -> Self {
        self.corrector = Some(Arc::new(corrector));
        self
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self::new(Arc::new(PackageCache::default()))
    }
}

impl fmt::Debug for ImportSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportSettings")
            .field("cache", &self.cache)
            .field("corrector", &self.corrector.is_some())
            .finish()
    }
}

/// One line of an import block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: String,
    /// Alias to write, `None` when it matches the default package name
    pub alias: Option<String>,
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{alias} \"{}\"", self.path),
            None => write!(f, "\"{}\"", self.path),
        }
    }
}

/// Imports sharing a weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportGroup {
    pub weight: u32,
    pub imports: Vec<Import>,
}

/// Imports of a single file.
#[derive(Debug)]
pub struct ImportRegistry {
    settings: ImportSettings,
    /// path -> alias
    committed: IndexMap<String, String>,
    /// alias -> path
    owners: HashMap<String, String>,
    /// path -> provisional alias
    pending: IndexMap<String, String>,
    /// pending paths with a caller supplied alias
    explicit: HashSet<String>,
    /// imports the file had before generation started
    existing: IndexSet<String>,
}

impl ImportRegistry {
    pub fn new(settings: ImportSettings) -> Self {
        Self {
            settings,
            committed: IndexMap::new(),
            owners: HashMap::new(),
            pending: IndexMap::new(),
            explicit: HashSet::new(),
            existing: IndexSet::new(),
        }
    }

    /// Register `path` as pending unless it is known already.
    pub fn add(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            return Err(Error::EmptyImportPath);
        }
        if self.committed.contains_key(path) || self.pending.contains_key(path) {
            return Ok(());
        }

        let alias = self.provisional_alias(path);
        self.pending.insert(path.to_string(), alias);
        Ok(())
    }

    /// Request a custom alias for `path`.
    pub fn set_alias(&mut self, path: &str, alias: &str) -> Result<()> {
        if path.is_empty() {
            return Err(Error::EmptyImportPath);
        }
        if path == "C" {
            if alias.is_empty() {
                return Ok(());
            }
            return Err(Error::AliasedPseudoImport {
                alias: alias.to_string(),
            });
        }
        if !is_blank_alias(alias) && !is_identifier(alias) {
            return Err(Error::InvalidAlias {
                alias: alias.to_string(),
            });
        }

        if let Some(existing) = self.committed.get(path) {
            if existing == alias {
                return Ok(());
            }
            return Err(Error::AliasMismatch {
                path: path.to_string(),
                alias: alias.to_string(),
                existing: existing.clone(),
            });
        }
        if self.explicit.contains(path)
            && let Some(requested) = self.pending.get(path)
        {
            if requested == alias {
                return Ok(());
            }
            return Err(Error::AliasMismatch {
                path: path.to_string(),
                alias: alias.to_string(),
                existing: requested.clone(),
            });
        }
        if let Some(other) = self.owner_of(alias) {
            return Err(Error::AliasTaken {
                alias: alias.to_string(),
                path: path.to_string(),
                other: other.to_string(),
            });
        }

        self.pending.insert(path.to_string(), alias.to_string());
        self.explicit.insert(path.to_string());
        Ok(())
    }

    /// Commit `path` and return its alias.
    pub fn push(&mut self, path: &str) -> Result<String> {
        if let Some(alias) = self.committed.get(path) {
            return Ok(alias.clone());
        }
        self.add(path)?;

        let provisional = self
            .pending
            .shift_remove(path)
            .unwrap_or_else(|| self.provisional_alias(path));
        let explicit = self.explicit.remove(path);

        let alias = if path == "C" || is_blank_alias(&provisional) || self.owner_of(&provisional).is_none() {
            provisional
        } else if explicit {
            return Err(Error::AliasTaken {
                other: self.owner_of(&provisional).unwrap_or_default().to_string(),
                alias: provisional,
                path: path.to_string(),
            });
        } else {
            self.resolve_collision(path, &provisional)?
        };

        self.commit(path, &alias);
        Ok(alias)
    }

    /// Commit every pending path.
    pub fn push_pending(&mut self) -> Result<()> {
        let paths: Vec<String> = self.pending.keys().cloned().collect();
        for path in paths {
            self.push(&path)?;
        }
        Ok(())
    }

    /// Record an import already present in a reused file.
    pub fn register_existing(&mut self, path: &str, alias: Option<&str>) {
        let alias = alias
            .map(str::to_string)
            .unwrap_or_else(|| default_package_name(path));
        self.commit(path, &alias);
        self.existing.insert(path.to_string());
    }

    /// Committed alias of `path`.
    pub fn alias_of(&self, path: &str) -> Option<&str> {
        self.committed.get(path).map(String::as_str)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Committed imports, grouped by weight and heuristically sorted.
    /// Imports found in a reused file are left out.
    pub fn groups(&self) -> Vec<ImportGroup> {
        let mut by_weight: BTreeMap<u32, Vec<Import>> = BTreeMap::new();
        for (path, alias) in &self.committed {
            if self.existing.contains(path) {
                continue;
            }
            let alias = (path != "C" && *alias != default_package_name(path)).then(|| alias.clone());
            by_weight
                .entry(self.settings.weighter.weight(path))
                .or_default()
                .push(Import {
                    path: path.clone(),
                    alias,
                });
        }

        by_weight
            .into_iter()
            .map(|(weight, mut imports)| {
                sort_paths(&mut imports, |i| i.path.as_str());
                ImportGroup { weight, imports }
            })
            .collect()
    }

    /// Render the import declarations: `import "C"` on its own, everything
    /// else in a single grouped declaration.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut groups = Vec::new();
        for group in self.groups() {
            let (pseudo, rest): (Vec<Import>, Vec<Import>) =
                group.imports.into_iter().partition(|i| i.path == "C");
            if !pseudo.is_empty() {
                out.push_str("import \"C\"\n\n");
            }
            if !rest.is_empty() {
                groups.push(rest);
            }
        }

        if groups.is_empty() {
            return out;
        }

        out.push_str("import (\n");
        for (i, group) in groups.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for import in group {
                out.push('\t');
                out.push_str(&import.to_string());
                out.push('\n');
            }
        }
        out.push_str(")\n\n");
        out
    }

    fn provisional_alias(&self, path: &str) -> String {
        if path == "C" {
            return "C".to_string();
        }
        self.settings
            .cache
            .cached_alias(path)
            .or_else(|| self.settings.cache.local_name(path))
            .unwrap_or_else(|| default_package_name(path))
    }

    fn resolve_collision(&self, path: &str, alias: &str) -> Result<String> {
        if let Some(corrector) = &self.settings.corrector
            && let Some(corrected) = corrector.correct(path, alias)
            && is_identifier(&corrected)
            && self.owner_of(&corrected).is_none()
        {
            debug!(path, alias, corrected = %corrected, "import alias corrected");
            return Ok(corrected);
        }

        for i in 2..MAX_SUFFIX {
            let candidate = format!("{alias}{i}");
            if self.owner_of(&candidate).is_none() {
                debug!(path, alias, numbered = %candidate, "import alias numbered");
                return Ok(candidate);
            }
        }

        Err(Error::UniqueNamesExhausted {
            base: alias.to_string(),
        })
    }

    fn owner_of(&self, alias: &str) -> Option<&str> {
        self.owners.get(alias).map(String::as_str)
    }

    fn commit(&mut self, path: &str, alias: &str) {
        self.committed.insert(path.to_string(), alias.to_string());
        if !is_blank_alias(alias) {
            self.owners.insert(alias.to_string(), path.to_string());
            self.settings.cache.remember_alias(path, alias);
        }
        debug!(path, alias, "import committed");
    }
}

fn is_blank_alias(alias: &str) -> bool {
    alias == "_" || alias == "."
}
