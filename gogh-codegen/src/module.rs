//! Modules, packages and the files generated in them.
//!
//! - [`Module`] - a Go module rooted at the directory holding `go.mod`
//! - [`Package`] - a package of the module, the home of Go files
//!
//! Files are only written by [`Module::render`]; nothing touches the disk
//! before that.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use gogh_config::{Config, GoghToml, StdlibMode};
use gogh_core::{OutputFile, WriteResult, is_identifier};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::{
    Error, GoRenderer, RawRenderer, Result,
    format::{CommandFormatter, SourceFormatter},
    imports::{AliasTable, ImportSettings, PackageCache, StdlibSource},
    renderer::FileState,
    reuse,
};

const GO_MOD: &str = "go.mod";

type SharedFile = Arc<Mutex<FileState>>;

// =============================================================================
// Module
// =============================================================================

/// A Go module being generated into.
#[derive(Debug, Clone)]
pub struct Module {
    ctx: Arc<ModuleContext>,
}

struct ModuleContext {
    root: PathBuf,
    path: String,
    settings: ImportSettings,
    formatter: Arc<dyn SourceFormatter>,
    autogen: Option<String>,
    packages: Mutex<IndexMap<String, Arc<PackageInner>>>,
    raws: Mutex<IndexMap<String, SharedFile>>,
}

impl fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("root", &self.root)
            .field("path", &self.path)
            .field("formatter", &self.formatter)
            .field("autogen", &self.autogen)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Module`] with custom collaborators.
#[derive(Debug)]
pub struct ModuleBuilder {
    root: PathBuf,
    path: String,
    settings: Option<ImportSettings>,
    formatter: Option<Arc<dyn SourceFormatter>>,
    autogen: Option<String>,
}

impl ModuleBuilder {
    pub fn import_settings(mut self, settings: ImportSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn formatter(mut self, formatter: impl SourceFormatter + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Application named in the `// Code generated by` header.
    pub fn autogen(mut self, app: impl Into<String>) -> Self {
        self.autogen = Some(app.into());
        self
    }

    /// Take formatter, import and header settings from a `gogh.toml`.
    pub fn config(mut self, config: &Config) -> Self {
        let stdlib = match config.imports.stdlib {
            StdlibMode::Heuristic => StdlibSource::Heuristic,
            StdlibMode::GoList => StdlibSource::GoList,
        };
        let mut settings = ImportSettings::new(Arc::new(PackageCache::new(stdlib)));
        let aliases: AliasTable = config.aliases().collect();
        if config.aliases().next().is_some() {
            settings = settings.with_corrector(aliases);
        }

        self.settings = Some(settings);
        self.formatter = Some(Arc::new(CommandFormatter::from_config(config)));
        if let Some(app) = &config.generate.autogen {
            self.autogen = Some(app.clone());
        }
        self
    }

    pub fn build(self) -> Module {
        Module {
            ctx: Arc::new(ModuleContext {
                root: self.root,
                path: self.path,
                settings: self.settings.unwrap_or_default(),
                formatter: self
                    .formatter
                    .unwrap_or_else(|| Arc::new(CommandFormatter::gofmt())),
                autogen: self.autogen,
                packages: Mutex::new(IndexMap::new()),
                raws: Mutex::new(IndexMap::new()),
            }),
        }
    }
}

impl Module {
    /// Module rooted at `root` with import path `path` and default settings.
    pub fn new(root: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        Self::builder(root, path).build()
    }

    pub fn builder(root: impl Into<PathBuf>, path: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            root: root.into(),
            path: path.into(),
            settings: None,
            formatter: None,
            autogen: None,
        }
    }

    /// Discover the module containing `dir` by looking for `go.mod` in it
    /// and its ancestors. A `gogh.toml` next to `go.mod` is applied.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let (root, path) = discover_module(dir.as_ref())?;
        let config = GoghToml::load_or_default(&root)?;
        debug!(
            root = %root.display(),
            module = %path,
            config = %config.path().display(),
            "module discovered"
        );
        Ok(Self::builder(root, path).config(config.config()).build())
    }

    pub fn root(&self) -> &Path {
        &self.ctx.root
    }

    /// Module import path.
    pub fn path(&self) -> &str {
        &self.ctx.path
    }

    /// Package at `path`, relative to the module root or a full import
    /// path within the module. An empty `name` takes the name the package
    /// already has on disk.
    pub fn package(&self, name: &str, path: &str) -> Result<Package> {
        self.ctx.package(name, path)
    }

    /// The package in the module root.
    pub fn root_package(&self, name: &str) -> Result<Package> {
        self.package(name, "")
    }

    /// Name of the package at `path` if it is known or exists on disk.
    pub fn package_name(&self, path: &str) -> Result<Option<String>> {
        let rel = self.ctx.relative(path)?;
        self.ctx.package_name(&rel)
    }

    /// Plain text file at `path` relative to the module root.
    pub fn raw(&self, path: &str) -> Result<RawRenderer> {
        validate_package_path(path)?;
        if path.is_empty() {
            return Err(Error::InvalidPackagePath {
                path: String::new(),
                reason: "file path must not be empty",
            });
        }
        let file = lock(&self.ctx.raws)
            .entry(path.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(FileState::new(
                    "",
                    self.ctx.settings.clone(),
                )))
            })
            .clone();
        Ok(RawRenderer::new(file))
    }

    /// Format and write every generated file.
    pub fn render(&self) -> Result<()> {
        let packages: Vec<Arc<PackageInner>> = lock(&self.ctx.packages).values().cloned().collect();
        for package in packages {
            let files: Vec<(String, SharedFile)> = lock(&package.files)
                .iter()
                .map(|(name, file)| (name.clone(), file.clone()))
                .collect();
            for (name, file) in files {
                self.render_go(&package, &name, &file)
                    .map_err(|e| Error::Render {
                        package: package.path.clone(),
                        file: name.clone(),
                        source: Box::new(e),
                    })?;
            }
        }

        let raws: Vec<(String, SharedFile)> = lock(&self.ctx.raws)
            .iter()
            .map(|(name, file)| (name.clone(), file.clone()))
            .collect();
        for (name, file) in raws {
            let content = lock(&file).assemble_raw();
            write(&self.ctx.root.join(&name), content.into_bytes()).map_err(|e| Error::Render {
                package: self.ctx.path.clone(),
                file: name.clone(),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }

    fn render_go(&self, package: &PackageInner, name: &str, file: &SharedFile) -> Result<()> {
        let source = {
            let mut state = lock(file);
            if state.is_void() {
                return Ok(());
            }
            state.assemble_go(&package.name, self.ctx.autogen.as_deref())?
        };
        let formatted = self.ctx.formatter.format(source.as_bytes())?;
        write(&self.ctx.root.join(&package.rel).join(name), formatted)
    }
}

impl ModuleContext {
    fn relative(&self, path: &str) -> Result<String> {
        validate_package_path(path)?;
        let rel = if path == self.path {
            ""
        } else {
            path.strip_prefix(&self.path)
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(path)
        };
        Ok(rel.to_string())
    }

    fn import_path(&self, rel: &str) -> String {
        if rel.is_empty() {
            self.path.clone()
        } else {
            format!("{}/{rel}", self.path)
        }
    }

    fn package(self: &Arc<Self>, name: &str, path: &str) -> Result<Package> {
        let rel = self.relative(path)?;
        let import_path = self.import_path(&rel);
        let existing = self.package_name(&rel)?;

        if let Some(inner) = lock(&self.packages).get(&rel) {
            if !name.is_empty() && name != inner.name {
                return Err(Error::PackageNameConflict {
                    path: import_path,
                    existing: inner.name.clone(),
                    requested: name.to_string(),
                });
            }
            return Ok(Package {
                ctx: self.clone(),
                inner: inner.clone(),
            });
        }

        let name = match (name, existing) {
            ("", Some(existing)) => existing,
            (requested, Some(existing)) if requested != existing => {
                warn!(
                    package = %import_path,
                    requested,
                    existing = %existing,
                    "package exists under a different name, keeping it"
                );
                existing
            }
            (requested, _) => requested.to_string(),
        };
        if !is_identifier(&name) {
            return Err(Error::InvalidPackageName { name });
        }

        self.settings.cache.register_local(&import_path, &name);
        let inner = Arc::new(PackageInner {
            rel: rel.clone(),
            path: import_path,
            name,
            files: Mutex::new(IndexMap::new()),
        });
        lock(&self.packages).insert(rel, inner.clone());
        Ok(Package {
            ctx: self.clone(),
            inner,
        })
    }

    fn package_name(&self, rel: &str) -> Result<Option<String>> {
        if let Some(inner) = lock(&self.packages).get(rel) {
            return Ok(Some(inner.name.clone()));
        }

        let dir = self.root.join(rel);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(dir, e)),
        };

        let mut found: Option<String> = None;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(".go") && !n.ends_with("_test.go"))
            })
            .collect();
        files.sort();

        for file in files {
            let content = fs::read_to_string(&file).map_err(|e| Error::io(&file, e))?;
            let Some(name) = reuse::package_clause(&content) else {
                continue;
            };
            match &found {
                Some(prev) if *prev != name => {
                    return Err(Error::PackageNameConflict {
                        path: self.import_path(rel),
                        existing: prev.clone(),
                        requested: name,
                    });
                }
                Some(_) => {}
                None => found = Some(name),
            }
        }
        Ok(found)
    }
}

// =============================================================================
// Package
// =============================================================================

/// A package of the module.
#[derive(Debug, Clone)]
pub struct Package {
    ctx: Arc<ModuleContext>,
    inner: Arc<PackageInner>,
}

#[derive(Debug)]
struct PackageInner {
    rel: String,
    path: String,
    name: String,
    files: Mutex<IndexMap<String, SharedFile>>,
}

impl Package {
    /// Full import path.
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Go file `name` of this package; the same file for repeated calls.
    pub fn go_file(&self, name: &str) -> GoRenderer {
        let file = lock(&self.inner.files)
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(self.new_state())))
            .clone();
        GoRenderer::new(file)
    }

    /// Extend the existing file `name`, or start it when there is none.
    pub fn reuse(&self, name: &str) -> Result<GoRenderer> {
        if let Some(file) = lock(&self.inner.files).get(name) {
            return Ok(GoRenderer::new(file.clone()));
        }

        let path = self.ctx.root.join(&self.inner.rel).join(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(self.go_file(name)),
            Err(e) => return Err(Error::io(path, e)),
        };

        let info = reuse::scan(&content).map_err(|reason| Error::Reuse {
            path: path.clone(),
            reason,
        })?;
        if info.package != self.inner.name {
            return Err(Error::Reuse {
                path,
                reason: format!(
                    "file belongs to package '{}', not '{}'",
                    info.package, self.inner.name
                ),
            });
        }

        debug!(file = %path.display(), imports = info.imports.len(), "reusing file");
        let state = self.new_state().reused(path, &content, info);
        let file = Arc::new(Mutex::new(state));
        lock(&self.inner.files).insert(name.to_string(), file.clone());
        Ok(GoRenderer::new(file))
    }

    /// Renderer for a file that is never written.
    pub fn void(&self) -> GoRenderer {
        GoRenderer::new(Arc::new(Mutex::new(self.new_state().void())))
    }

    /// Plain text file in the package directory.
    pub fn raw(&self, name: &str) -> Result<RawRenderer> {
        let path = if self.inner.rel.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.inner.rel)
        };
        Module {
            ctx: self.ctx.clone(),
        }
        .raw(&path)
    }

    /// Package at `path` relative to this one.
    pub fn subpackage(&self, name: &str, path: &str) -> Result<Package> {
        validate_package_path(path)?;
        let rel = if self.inner.rel.is_empty() {
            path.to_string()
        } else {
            format!("{}/{path}", self.inner.rel)
        };
        self.ctx.package(name, &rel)
    }

    fn new_state(&self) -> FileState {
        FileState::new(&self.inner.path, self.ctx.settings.clone())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn write(path: &Path, content: Vec<u8>) -> Result<()> {
    let result = OutputFile::new(path, content)
        .write()
        .map_err(|e| Error::io(path, e))?;
    match result {
        WriteResult::Written => info!(file = %path.display(), "written"),
        WriteResult::Unchanged => debug!(file = %path.display(), "unchanged"),
    }
    Ok(())
}

/// Reject absolute paths, a trailing `/` and `.`, `..` or empty components.
pub fn validate_package_path(path: &str) -> Result<()> {
    let invalid = |reason| {
        Err(Error::InvalidPackagePath {
            path: path.to_string(),
            reason,
        })
    };

    if path.is_empty() {
        return Ok(());
    }
    if path.starts_with('/') || Path::new(path).is_absolute() {
        return invalid("path must not be absolute");
    }
    if path.ends_with('/') {
        return invalid("path must not end with /");
    }
    if path
        .split('/')
        .any(|c| c.is_empty() || c == "." || c == "..")
    {
        return invalid("path must not have empty, . or .. components");
    }
    Ok(())
}

/// Find the directory holding `go.mod`, starting at `dir` and going up,
/// and the module path it declares.
pub fn discover_module(dir: &Path) -> Result<(PathBuf, String)> {
    let start = dir.canonicalize().map_err(|e| Error::io(dir, e))?;
    let Some(root) = start.ancestors().find(|d| d.join(GO_MOD).is_file()) else {
        return Err(Error::Module {
            reason: format!("no {GO_MOD} in {} or its parents", start.display()),
        });
    };

    let go_mod = root.join(GO_MOD);
    let content = fs::read_to_string(&go_mod).map_err(|e| Error::io(&go_mod, e))?;
    let path = module_path(&content).ok_or_else(|| Error::Module {
        reason: format!("{} has no module directive", go_mod.display()),
    })?;
    Ok((root.to_path_buf(), path))
}

fn module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with([' ', '\t']) {
            return None;
        }
        let rest = rest.split("//").next().unwrap_or_default().trim();
        let path = rest.trim_matches('"');
        (!path.is_empty()).then(|| path.to_string())
    })
}
