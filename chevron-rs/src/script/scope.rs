//! Variable scope stack.
//!
//! The stack always holds a root scope; each block pushes one more layer
//! when its definition begins.  Writes go to the innermost layer, reads walk
//! from innermost to outermost and the first hit wins.  A miss is not an
//! error: it resolves to [`Value::Unresolved`].

use std::collections::HashMap;

use super::value::Value;

/// One layer of bindings, tagged with the block that pushed it.
#[derive(Debug, Default)]
struct Scope {
    owner: Option<String>,
    vars: HashMap<String, Value>,
}

/// Nested variable bindings with shadowing.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// A stack holding only the root scope.
    pub fn new() -> Self {
        ScopeStack { scopes: vec![Scope::default()] }
    }

    /// Push an empty scope for the block `owner`.
    pub fn push(&mut self, owner: impl Into<String>) {
        self.scopes.push(Scope { owner: Some(owner.into()), vars: HashMap::new() });
    }

    /// Pop the innermost scope.  The root scope is never removed; returns
    /// `false` when only the root is left.
    pub fn pop(&mut self) -> bool {
        if self.scopes.len() > 1 {
            self.scopes.pop();
            true
        } else {
            false
        }
    }

    /// Bind `name` in the innermost scope, replacing any binding there.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.vars.insert(name.into(), value);
        }
    }

    /// Resolve `name`, innermost scope first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|s| s.vars.get(name))
    }

    /// Resolve `name`, yielding [`Value::Unresolved`] on a miss.
    pub fn resolve(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Unresolved)
    }

    /// Number of live scopes, root included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Block that pushed the innermost scope, or `None` for the root.
    pub fn innermost_owner(&self) -> Option<&str> {
        self.scopes.last().and_then(|s| s.owner.as_deref())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
