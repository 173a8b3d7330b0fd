//! File renderers.
//!
//! A renderer is a cheap view over the state of one output file: the
//! block chain, the scope arena, unique name tables and the import
//! registry. Views differ in the scope node, unique table and block cursor
//! they point at:
//!
//! - [`Renderer::scope`] forks the scope and the unique table and keeps
//!   writing at the shared cursor
//! - [`Renderer::lazy`] shares the scope and unique table and writes into
//!   the block that was current before the call, while the original moves
//!   on to a freshly inserted block
//!
//! [`GoRenderer`] renders Go source, [`RawRenderer`] plain text.

mod function;
mod imports;

use std::{
    marker::PhantomData,
    panic::Location,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

pub use function::{FunctionBuilder, Receiver};
pub use imports::ImportHandle;

use indexmap::IndexMap;

use crate::{
    Result, UniqueNames, Value,
    blocks::{BlockChain, BlockCursor},
    error::Locate,
    imports::{ImportRegistry, ImportSettings},
    reuse::ReuseInfo,
    scope::{ScopeArena, ScopeId},
    template::{Resolve, format_line},
    types::{TypeDescriptor, type_string},
    zeroes::ZeroTuple,
};

/// Scope binding holding the zero values of the enclosing function results.
pub const RETURN_ZERO_VALUES: &str = "ReturnZeroValues";

/// Go source file.
#[derive(Debug, Clone, Copy)]
pub struct Go;

/// Plain text file.
#[derive(Debug, Clone, Copy)]
pub struct Raw;

pub type GoRenderer = Renderer<Go>;
pub type RawRenderer = Renderer<Raw>;

// =============================================================================
// File state
// =============================================================================

#[derive(Debug)]
pub(crate) struct FileState {
    blocks: BlockChain,
    cursors: Vec<BlockCursor>,
    scopes: ScopeArena,
    uniq: Vec<UniqueNames>,
    imports: ImportRegistry,
    package_path: String,
    comment: Vec<String>,
    void: bool,
    reuse: Option<ReusedFile>,
}

#[derive(Debug)]
struct ReusedFile {
    path: PathBuf,
    first_import_line: Option<usize>,
}

impl FileState {
    pub(crate) fn new(package_path: impl Into<String>, settings: ImportSettings) -> Self {
        let blocks = BlockChain::new();
        let first = BlockCursor::new(blocks.first());
        Self {
            blocks,
            cursors: vec![first],
            scopes: ScopeArena::new(),
            uniq: vec![UniqueNames::new()],
            imports: ImportRegistry::new(settings),
            package_path: package_path.into(),
            comment: Vec::new(),
            void: false,
            reuse: None,
        }
    }

    /// Start from the content of an existing file.
    pub(crate) fn reused(mut self, path: impl Into<PathBuf>, content: &str, info: ReuseInfo) -> Self {
        for import in &info.imports {
            self.imports
                .register_existing(&import.path, import.alias.as_deref());
        }
        self.cursors[0].write(&mut self.blocks, content);
        if !content.is_empty() && !content.ends_with('\n') {
            self.cursors[0].write(&mut self.blocks, "\n");
        }
        self.reuse = Some(ReusedFile {
            path: path.into(),
            first_import_line: info.first_import_line,
        });
        self
    }

    pub(crate) fn void(mut self) -> Self {
        self.void = true;
        self
    }

    pub(crate) fn is_void(&self) -> bool {
        self.void
    }

    /// Final Go source before formatting.
    pub(crate) fn assemble_go(&mut self, package_name: &str, autogen: Option<&str>) -> Result<String> {
        self.imports.push_pending()?;
        let body = self.blocks.collect();

        if let Some(reuse) = &self.reuse {
            return splice_imports(&body, &self.imports, reuse);
        }

        let mut out = String::new();
        if let Some(app) = autogen {
            out.push_str(&format!("// Code generated by {app}. DO NOT EDIT.\n\n"));
        }
        match self.comment.as_slice() {
            [] => {}
            [line] => {
                out.push_str("// ");
                out.push_str(line);
                out.push('\n');
            }
            lines => {
                out.push_str("/*\n");
                for line in lines {
                    out.push_str(line);
                    out.push('\n');
                }
                out.push_str("*/\n");
            }
        }
        out.push_str("package ");
        out.push_str(package_name);
        out.push_str("\n\n");
        out.push_str(&self.imports.render());
        out.push_str(&body);
        Ok(out)
    }

    pub(crate) fn assemble_raw(&self) -> String {
        self.blocks.collect()
    }

    fn resolver(&mut self, scope: ScopeId) -> FileResolver<'_> {
        FileResolver {
            bindings: self.scopes.merged(scope),
            imports: &mut self.imports,
            package_path: &self.package_path,
        }
    }

    fn format(&mut self, scope: ScopeId, line: &str, args: &[Value]) -> Result<String> {
        format_line(line, args, &mut self.resolver(scope))
    }

    fn write(&mut self, cursor: usize, text: &str) {
        self.cursors[cursor].write(&mut self.blocks, text);
    }

    fn type_name(&mut self, ty: &TypeDescriptor) -> Result<String> {
        qualified_type(&mut self.imports, &self.package_path, ty)
    }
}

fn qualified_type(imports: &mut ImportRegistry, own: &str, ty: &TypeDescriptor) -> Result<String> {
    type_string(ty, &mut |path: &str| {
        if path == own {
            Ok(None)
        } else {
            imports.push(path).map(Some)
        }
    })
}

fn splice_imports(body: &str, imports: &ImportRegistry, reuse: &ReusedFile) -> Result<String> {
    let block = imports.render();
    if block.is_empty() {
        return Ok(body.to_string());
    }
    let Some(at) = reuse.first_import_line else {
        return Err(crate::Error::Reuse {
            path: reuse.path.clone(),
            reason: "new imports are needed but the file has no import declaration".to_string(),
        });
    };

    let mut out = String::with_capacity(body.len() + block.len());
    for (i, line) in body.lines().enumerate() {
        if i == at {
            out.push_str(&block);
        }
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}

// Substitution context of one line.
struct FileResolver<'a> {
    bindings: IndexMap<String, Value>,
    imports: &'a mut ImportRegistry,
    package_path: &'a str,
}

impl Resolve for FileResolver<'_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }

    fn render_type(&mut self, ty: &TypeDescriptor) -> Result<String> {
        qualified_type(self.imports, self.package_path, ty)
    }

    fn render_package(&mut self, path: &str) -> Result<String> {
        self.imports.push(path)
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// View over a file being generated.
#[derive(Debug)]
pub struct Renderer<K> {
    file: Arc<Mutex<FileState>>,
    scope: ScopeId,
    cursor: usize,
    uniq: usize,
    kind: PhantomData<K>,
}

impl<K> Renderer<K> {
    pub(crate) fn new(file: Arc<Mutex<FileState>>) -> Self {
        let scope = lock(&file).scopes.root();
        Self {
            file,
            scope,
            cursor: 0,
            uniq: 0,
            kind: PhantomData,
        }
    }

    fn state(&self) -> MutexGuard<'_, FileState> {
        lock(&self.file)
    }

    fn expand(&self, text: &str) -> Result<String> {
        self.state().format(self.scope, text, &[])
    }

    fn resolve_type(&self, ty: &TypeDescriptor) -> Result<String> {
        self.state().type_name(ty)
    }

    /// Render a template line and append it with a newline.
    #[track_caller]
    pub fn line(&mut self, line: &str) -> Result<()> {
        self.line_args(line, &[])
    }

    /// Like [`Renderer::line`] with positional arguments for `$0`, `$1`, ...
    #[track_caller]
    pub fn line_args(&mut self, line: &str, args: &[Value]) -> Result<()> {
        let location = Location::caller();
        let mut state = self.state();
        state.imports.push_pending().located(location)?;
        let text = state.format(self.scope, line, args).located(location)?;
        state.write(self.cursor, &text);
        state.write(self.cursor, "\n");
        Ok(())
    }

    /// Append text verbatim followed by a newline.
    #[track_caller]
    pub fn raw(&mut self, text: &str) -> Result<()> {
        let mut state = self.state();
        state.imports.push_pending().located(Location::caller())?;
        state.write(self.cursor, text);
        state.write(self.cursor, "\n");
        Ok(())
    }

    #[track_caller]
    pub fn newline(&mut self) -> Result<()> {
        let mut state = self.state();
        state.imports.push_pending().located(Location::caller())?;
        state.write(self.cursor, "\n");
        Ok(())
    }

    /// Render a template line into a string instead of the file.
    #[track_caller]
    pub fn string(&self, line: &str) -> Result<String> {
        self.string_args(line, &[])
    }

    #[track_caller]
    pub fn string_args(&self, line: &str, args: &[Value]) -> Result<String> {
        let location = Location::caller();
        let mut state = self.state();
        state.imports.push_pending().located(location)?;
        state.format(self.scope, line, args).located(location)
    }

    /// Allocate a name unique within this renderer's unique table.
    #[track_caller]
    pub fn uniq(&mut self, base: &str, hint: Option<&str>) -> Result<String> {
        let uniq = self.uniq;
        self.state().uniq[uniq]
            .allocate(base, hint)
            .located(Location::caller())
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.state().uniq[self.uniq].is_taken(name)
    }

    /// Bind `name` in the current scope. Rebinding a name of this scope
    /// to the very same value is accepted.
    #[track_caller]
    pub fn let_(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let mut state = self.state();
        if state.scopes.is_bound_locally(self.scope, name)
            && state.scopes.get(self.scope, name) == Some(&value)
        {
            return Ok(());
        }
        state
            .scopes
            .set(self.scope, name, value)
            .located(Location::caller())
    }

    /// Bind `name` unless the current scope has it already.
    pub fn try_let(&mut self, name: &str, value: impl Into<Value>) -> bool {
        self.state().scopes.try_set(self.scope, name, value.into())
    }

    /// Whether `name` is visible from the current scope.
    pub fn is_bound(&self, name: &str) -> bool {
        self.state().scopes.get(self.scope, name).is_some()
    }

    /// Bind [`RETURN_ZERO_VALUES`] in the current scope.
    #[track_caller]
    pub fn let_return_zero_values(&mut self, zeroes: &ZeroTuple) -> Result<()> {
        self.let_(RETURN_ZERO_VALUES, zeroes.to_string())
    }

    /// Renderer with a child scope and a copy of the unique table.
    pub fn scope(&self) -> Self {
        let mut state = self.state();
        let scope = state.scopes.fork(self.scope);
        let names = state.uniq[self.uniq].clone();
        state.uniq.push(names);
        let uniq = state.uniq.len() - 1;
        drop(state);

        Self {
            file: self.file.clone(),
            scope,
            cursor: self.cursor,
            uniq,
            kind: PhantomData,
        }
    }

    /// Run `f` with a scoped renderer.
    pub fn inner_scope<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut scoped = self.scope();
        f(&mut scoped)
    }

    /// Renderer whose output lands before everything this renderer writes
    /// from now on.
    pub fn lazy(&self) -> Self {
        let mut state = self.state();
        let FileState {
            blocks, cursors, ..
        } = &mut *state;
        let previous = cursors[self.cursor];
        cursors[self.cursor].insert_after_current_and_advance(blocks);
        cursors.push(previous);
        let cursor = cursors.len() - 1;
        drop(state);

        Self {
            file: self.file.clone(),
            scope: self.scope,
            cursor,
            uniq: self.uniq,
            kind: PhantomData,
        }
    }

    /// Go spelling of `ty`, importing the packages it refers to.
    #[track_caller]
    pub fn type_name(&mut self, ty: &TypeDescriptor) -> Result<String> {
        self.resolve_type(ty).located(Location::caller())
    }
}

impl Renderer<Go> {
    /// Qualified reference to the package level object `name` of `path`.
    #[track_caller]
    pub fn object_name(&mut self, path: &str, name: &str) -> Result<String> {
        let mut state = self.state();
        if path.is_empty() || path == state.package_path {
            return Ok(name.to_string());
        }
        let alias = state.imports.push(path).located(Location::caller())?;
        Ok(format!("{alias}.{name}"))
    }

    /// Start importing `path`. The import stays pending until it is pushed,
    /// bound or the next line is written.
    #[track_caller]
    pub fn import(&mut self, path: &str) -> Result<ImportHandle<'_>> {
        self.state()
            .imports
            .add(path)
            .located(Location::caller())?;
        Ok(ImportHandle::new(self, path))
    }

    /// Add a line to the file comment placed above the package clause.
    #[track_caller]
    pub fn comment(&mut self, line: &str) -> Result<()> {
        let text = self.string(line)?;
        self.state().comment.push(text);
        Ok(())
    }

    /// Start a function declaration.
    #[track_caller]
    pub fn function(&self, name: &str) -> Result<FunctionBuilder> {
        FunctionBuilder::new(self.scope(), None, name)
    }

    /// Start a method declaration.
    #[track_caller]
    pub fn method(&self, receiver: Receiver, name: &str) -> Result<FunctionBuilder> {
        FunctionBuilder::new(self.scope(), Some(receiver), name)
    }
}

fn lock(file: &Mutex<FileState>) -> MutexGuard<'_, FileState> {
    file.lock().unwrap_or_else(PoisonError::into_inner)
}
