//! Variable frames.
//!
//! A scope stack over one global scope: lookup walks outward through parent
//! links, assignment defines in the current scope. User-function calls push
//! and pop frames; top-level code runs directly in the global scope, which
//! also holds the built-ins and the instantiated `DEF` functions.

use rustc_hash::FxHashMap;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use basic_ir::Name;

use crate::value::Value;

/// Single-threaded shared mutable cell.
///
/// Wraps `Rc<RefCell<T>>` so all shared-cell allocations in the evaluator
/// go through one factory. Used for scopes, arrays, and FOR descriptors.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    /// Allocate a new cell.
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    /// Borrow immutably.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow mutably.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

/// A single scope of bindings with an optional parent.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    /// An empty root scope.
    pub fn new() -> Self {
        Scope::default()
    }

    /// A child scope chained to `parent`.
    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Bind `name` in this scope, shadowing any outer binding.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Look up a name, walking outward through parents.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        if let Some(value) = self.bindings.get(&name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().lookup(name))
    }
}

/// The evaluator's frame stack.
pub struct Environment {
    /// Stack of scopes with the current one on top.
    scopes: Vec<LocalScope<Scope>>,
    /// The global scope, always at the bottom.
    global: LocalScope<Scope>,
}

impl Environment {
    /// Create an environment with one (global) scope.
    pub fn new() -> Self {
        let global = LocalScope::new(Scope::new());
        Environment {
            scopes: vec![global.clone()],
            global,
        }
    }

    /// Current scope depth (1 = only the global scope).
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push a fresh scope chained to the current one.
    #[inline]
    pub fn push_scope(&mut self) {
        let parent = self.current_scope();
        self.scopes.push(LocalScope::new(Scope::with_parent(parent)));
    }

    /// Pop the current scope; the global scope is never popped.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    #[inline]
    fn current_scope(&self) -> LocalScope<Scope> {
        self.scopes.last().unwrap_or(&self.global).clone()
    }

    /// Bind `name` in the current scope.
    ///
    /// BASIC assignment always writes the current frame; outer bindings of
    /// the same name are shadowed, not updated.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .define(name, value);
    }

    /// Bind `name` in the global scope (built-ins, DEF functions).
    pub fn define_global(&mut self, name: Name, value: Value) {
        self.global.borrow_mut().define(name, value);
    }

    /// Look up a name from the current scope outward.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow()
            .lookup(name)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basic_ir::SharedInterner;
    use pretty_assertions::assert_eq;

    #[test]
    fn define_then_lookup() {
        let interner = SharedInterner::new();
        let x = interner.intern("X");
        let mut env = Environment::new();
        env.define(x, Value::Int(42));
        assert_eq!(env.lookup(x), Some(Value::Int(42)));
    }

    #[test]
    fn lookup_walks_outward() {
        let interner = SharedInterner::new();
        let x = interner.intern("X");
        let mut env = Environment::new();
        env.define(x, Value::Int(1));
        env.push_scope();
        assert_eq!(env.lookup(x), Some(Value::Int(1)));
    }

    #[test]
    fn define_shadows_in_current_scope() {
        let interner = SharedInterner::new();
        let x = interner.intern("X");
        let mut env = Environment::new();
        env.define(x, Value::Int(1));
        env.push_scope();
        env.define(x, Value::Int(2));
        assert_eq!(env.lookup(x), Some(Value::Int(2)));
        env.pop_scope();
        assert_eq!(env.lookup(x), Some(Value::Int(1)));
    }

    #[test]
    fn global_scope_survives_pop() {
        let mut env = Environment::new();
        assert_eq!(env.depth(), 1);
        env.pop_scope();
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn define_global_is_visible_from_inner_scopes() {
        let interner = SharedInterner::new();
        let pi = interner.intern("PI");
        let mut env = Environment::new();
        env.push_scope();
        env.define_global(pi, Value::Float(3.25));
        assert_eq!(env.lookup(pi), Some(Value::Float(3.25)));
    }

    #[test]
    fn shared_cells_alias() {
        let cell = LocalScope::new(7);
        let other = cell.clone();
        *cell.borrow_mut() = 9;
        assert_eq!(*other.borrow(), 9);
    }
}
