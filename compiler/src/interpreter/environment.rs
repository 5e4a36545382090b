/**
Runtime environment for the Strata interpreter

Scopes live in an arena and refer to their parent by index. Scopes are
opened and closed in strict LIFO order, so closing one truncates the arena.
A block scope's parent is the scope it was opened in; a call scope's parent
is always the global scope, so function bodies never see the caller's
locals.
*/
use crate::ast::FunctionDecl;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use strata_runtime::{Module, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub value: Value,
    pub mutable: bool,
}

#[derive(Debug, Default)]
struct Scope<'r> {
    parent: Option<ScopeId>,
    vars: FxHashMap<String, Binding>,
    functions: FxHashMap<String, Arc<FunctionDecl>>,
    modules: FxHashMap<String, &'r Module>,
}

#[derive(Debug)]
pub struct Environment<'r> {
    scopes: Vec<Scope<'r>>,
    current: ScopeId,
}

impl<'r> Environment<'r> {
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope::default()],
            current: ScopeId::GLOBAL,
        }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Open a block scope nested in the current one. Returns the scope to
    /// restore with [`Environment::exit`].
    pub fn enter_block(&mut self) -> ScopeId {
        self.enter(self.current)
    }

    /// Open a function call scope, a child of the global scope
    pub fn enter_call(&mut self) -> ScopeId {
        self.enter(ScopeId::GLOBAL)
    }

    fn enter(&mut self, parent: ScopeId) -> ScopeId {
        let previous = self.current;
        self.scopes.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        });
        self.current = ScopeId(self.scopes.len() - 1);
        previous
    }

    /// Close the innermost scope and make `previous` current again
    pub fn exit(&mut self, previous: ScopeId) {
        if self.current != ScopeId::GLOBAL {
            self.scopes.truncate(self.current.0);
        }
        self.current = previous;
    }

    /// Bind a variable in the current scope, shadowing outer bindings
    pub fn define(&mut self, name: &str, value: Value, mutable: bool) {
        self.scope_mut()
            .vars
            .insert(name.to_string(), Binding { value, mutable });
    }

    pub fn define_function(&mut self, decl: Arc<FunctionDecl>) {
        self.scope_mut().functions.insert(decl.name.clone(), decl);
    }

    pub fn define_module(&mut self, name: &str, module: &'r Module) {
        self.scope_mut().modules.insert(name.to_string(), module);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.find(|scope| scope.vars.get(name))
            .map(|binding| &binding.value)
    }

    /// The nearest binding of `name`, for assignment
    pub fn binding_mut(&mut self, name: &str) -> Option<&mut Binding> {
        let id = self.resolve(|scope| scope.vars.contains_key(name))?;
        self.scopes[id.0].vars.get_mut(name)
    }

    pub fn function(&self, name: &str) -> Option<Arc<FunctionDecl>> {
        self.find(|scope| scope.functions.get(name)).cloned()
    }

    pub fn module(&self, name: &str) -> Option<&'r Module> {
        self.find(|scope| scope.modules.get(name)).copied()
    }

    fn scope_mut(&mut self) -> &mut Scope<'r> {
        &mut self.scopes[self.current.0]
    }

    fn find<'a, T>(&'a self, mut lookup: impl FnMut(&'a Scope<'r>) -> Option<T>) -> Option<T> {
        let mut id = Some(self.current);
        while let Some(ScopeId(index)) = id {
            let scope = &self.scopes[index];
            if let Some(found) = lookup(scope) {
                return Some(found);
            }
            id = scope.parent;
        }
        None
    }

    fn resolve(&self, mut contains: impl FnMut(&Scope<'r>) -> bool) -> Option<ScopeId> {
        let mut id = Some(self.current);
        while let Some(scope_id) = id {
            let scope = &self.scopes[scope_id.0];
            if contains(scope) {
                return Some(scope_id);
            }
            id = scope.parent;
        }
        None
    }
}

impl Default for Environment<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_scope_shadows_without_mutating() {
        let mut env = Environment::new();
        env.define("x", Value::Int(1), false);

        let previous = env.enter_block();
        env.define("x", Value::Int(2), false);
        assert_eq!(env.get("x"), Some(&Value::Int(2)));
        env.exit(previous);

        assert_eq!(env.get("x"), Some(&Value::Int(1)));
        assert_eq!(env.current(), ScopeId::GLOBAL);
    }

    #[test]
    fn test_block_sees_enclosing_locals() {
        let mut env = Environment::new();
        let outer = env.enter_block();
        env.define("local", Value::Bool(true), true);
        let inner = env.enter_block();
        assert_eq!(env.get("local"), Some(&Value::Bool(true)));
        env.exit(inner);
        env.exit(outer);
        assert_eq!(env.get("local"), None);
    }

    #[test]
    fn test_call_scope_sees_only_globals() {
        let mut env = Environment::new();
        env.define("global", Value::Int(1), false);
        let block = env.enter_block();
        env.define("local", Value::Int(2), false);

        let caller = env.enter_call();
        assert_eq!(env.get("global"), Some(&Value::Int(1)));
        assert_eq!(env.get("local"), None);
        env.exit(caller);

        assert_eq!(env.get("local"), Some(&Value::Int(2)));
        env.exit(block);
    }

    #[test]
    fn test_binding_mut_finds_outer_scope() {
        let mut env = Environment::new();
        env.define("count", Value::Int(0), true);
        let previous = env.enter_block();
        if let Some(binding) = env.binding_mut("count") {
            binding.value = Value::Int(5);
        }
        env.exit(previous);
        assert_eq!(env.get("count"), Some(&Value::Int(5)));
        assert!(env.binding_mut("missing").is_none());
    }

    #[test]
    fn test_exit_global_is_noop() {
        let mut env = Environment::new();
        env.define("x", Value::Nil, false);
        env.exit(ScopeId::GLOBAL);
        assert_eq!(env.get("x"), Some(&Value::Nil));
    }
}
