//! Hierarchical value bindings used by template substitution.
//!
//! Scopes form a tree stored in a [`ScopeArena`]. A lookup walks from a node
//! towards the root and returns the nearest binding, so a child sees
//! bindings made in its ancestors even after the child was forked.

use indexmap::IndexMap;

use crate::{Error, Result, Value};

/// Handle of a scope node inside a [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Default)]
struct ScopeNode {
    parent: Option<ScopeId>,
    bindings: IndexMap<String, Value>,
}

/// Arena of scope nodes belonging to one generated file.
#[derive(Debug)]
pub struct ScopeArena {
    nodes: Vec<ScopeNode>,
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeArena {
    /// Create an arena holding just the root scope.
    pub fn new() -> Self {
        Self {
            nodes: vec![ScopeNode::default()],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Create a child of `parent`.
    pub fn fork(&mut self, parent: ScopeId) -> ScopeId {
        self.nodes.push(ScopeNode {
            parent: Some(parent),
            bindings: IndexMap::new(),
        });
        ScopeId(self.nodes.len() - 1)
    }

    /// Bind `name` in `scope`. Fails if `scope` itself already binds it.
    pub fn set(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::EmptyBindingName);
        }

        let bindings = &mut self.nodes[scope.0].bindings;
        if bindings.contains_key(name) {
            return Err(Error::DuplicateBinding {
                name: name.to_string(),
            });
        }
        bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// Bind `name` unless `scope` already binds it. Returns whether it was bound.
    pub fn try_set(&mut self, scope: ScopeId, name: &str, value: Value) -> bool {
        if name.trim().is_empty() || self.is_bound_locally(scope, name) {
            return false;
        }
        self.nodes[scope.0]
            .bindings
            .insert(name.to_string(), value);
        true
    }

    /// Nearest binding of `name` walking towards the root.
    pub fn get(&self, scope: ScopeId, name: &str) -> Option<&Value> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            if let Some(value) = node.bindings.get(name) {
                return Some(value);
            }
            current = node.parent;
        }
        None
    }

    pub fn is_bound_locally(&self, scope: ScopeId, name: &str) -> bool {
        self.nodes[scope.0].bindings.contains_key(name)
    }

    /// Flattened view of every visible binding, children overriding ancestors.
    pub fn merged(&self, scope: ScopeId) -> IndexMap<String, Value> {
        let mut chain = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            chain.push(id);
            current = self.nodes[id.0].parent;
        }

        let mut result = IndexMap::new();
        for id in chain.into_iter().rev() {
            for (name, value) in &self.nodes[id.0].bindings {
                result.insert(name.clone(), value.clone());
            }
        }
        result
    }
}
