use std::panic::Location;

use super::GoRenderer;
use crate::{Error, Result, Value, error::Locate};

/// Import being set up on a [`GoRenderer`].
///
/// Dropping the handle leaves the import pending. It is committed before
/// the next line is written or when the file is rendered.
///
/// ```ignore
/// let errs = r.import("github.com/sirkon/errors")?.bind("errs")?;
/// r.line(r#"return $errs.New("failed")"#)?;
/// ```
#[derive(Debug)]
pub struct ImportHandle<'a> {
    renderer: &'a mut GoRenderer,
    path: String,
}

impl<'a> ImportHandle<'a> {
    pub(super) fn new(renderer: &'a mut GoRenderer, path: &str) -> Self {
        Self {
            renderer,
            path: path.to_string(),
        }
    }

    /// Request a custom alias.
    #[track_caller]
    pub fn as_alias(self, alias: &str) -> Result<Self> {
        self.renderer
            .state()
            .imports
            .set_alias(&self.path, alias)
            .located(Location::caller())?;
        Ok(self)
    }

    /// Commit the import and return its alias.
    #[track_caller]
    pub fn push(self) -> Result<String> {
        self.renderer
            .state()
            .imports
            .push(&self.path)
            .located(Location::caller())
    }

    /// Commit the import and bind its alias to `name` in the current scope.
    /// The alias is reserved in the unique name table, so no allocated
    /// local name shadows the package.
    #[track_caller]
    pub fn bind(self, name: &str) -> Result<String> {
        let location = Location::caller();
        let scope = self.renderer.scope;
        let uniq = self.renderer.uniq;

        let mut state = self.renderer.state();
        let alias = state.imports.push(&self.path).located(location)?;
        let value = Value::Text(alias.clone());

        if state.scopes.is_bound_locally(scope, name) {
            if state.scopes.get(scope, name) != Some(&value) {
                return Err(Error::DuplicateBinding {
                    name: name.to_string(),
                }
                .at(location));
            }
        } else {
            state.scopes.set(scope, name, value).located(location)?;
        }
        state.uniq[uniq].reserve(&alias);
        Ok(alias)
    }
}
