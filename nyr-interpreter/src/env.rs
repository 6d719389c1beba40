//! Variable scopes.
//!
//! Scopes live in an arena owned by [`Environment`] and refer to their parent by index. Scopes are
//! created and destroyed in stack order (blocks and calls nest), so destroying a scope is a
//! truncation of the arena.

use std::fmt;
use std::iter::FromIterator;

use nyr_value::Value;

use crate::error::RuntimeError;

/// Variable bindings in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over the bindings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Bindings {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:<16} ({:<6}): {:?}", name, value.type_name(), value)?;
        }
        Ok(())
    }
}

/// Index of a scope in the [`Environment`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    bindings: Bindings,
}

#[derive(Debug, Default)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new innermost scope. Function frames pass `None` so they do not see the caller's variables.
    pub fn push_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent,
            bindings: Bindings::new(),
        });
        id
    }

    /// Destroys `scope` and every scope created after it.
    pub fn unwind(&mut self, scope: ScopeId) {
        self.scopes.truncate(scope.0);
    }

    /// Declares `name` in `scope` itself. Outer declarations may be shadowed.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let bindings = &mut self.scopes[scope.0].bindings;
        if bindings.contains(name) {
            return Err(RuntimeError::AlreadyDeclaredVariable {
                name: name.to_string(),
            });
        }
        bindings.entries.push((name.to_string(), value));
        Ok(())
    }

    /// Finds `name` walking from `scope` outwards.
    pub fn get(&self, scope: ScopeId, name: &str) -> Option<&Value> {
        self.chain(scope).find_map(|bindings| bindings.get(name))
    }

    pub fn lookup(&self, scope: ScopeId, name: &str) -> Result<&Value, RuntimeError> {
        self.get(scope, name)
            .ok_or_else(|| RuntimeError::UndeclaredVariable {
                name: name.to_string(),
            })
    }

    /// Overwrites `name` in the innermost scope declaring it. Never declares.
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<(), RuntimeError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &mut self.scopes[id.0];
            if let Some(slot) = scope.bindings.get_mut(name) {
                *slot = value;
                return Ok(());
            }
            current = scope.parent;
        }
        Err(RuntimeError::UndeclaredVariable {
            name: name.to_string(),
        })
    }

    /// The bindings of `scope` and of its ancestors, innermost first.
    pub fn chain(&self, scope: ScopeId) -> impl Iterator<Item = &Bindings> {
        std::iter::successors(Some(&self.scopes[scope.0]), move |scope| {
            scope.parent.map(|parent| &self.scopes[parent.0])
        })
        .map(|scope| &scope.bindings)
    }

    pub fn bindings(&self, scope: ScopeId) -> &Bindings {
        &self.scopes[scope.0].bindings
    }
}
