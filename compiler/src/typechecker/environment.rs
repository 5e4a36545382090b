/**
Type checking environment for Strata

A stack of scopes holding declared variable types and function signatures.
Function bodies are checked in a scope whose parent is the global scope,
the same way the interpreter runs them.
*/
use crate::ast::TypeDef;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub params: Vec<TypeDef>,
    pub return_type: TypeDef,
}

#[derive(Debug, Clone, Default)]
struct Scope {
    vars: FxHashMap<String, TypeDef>,
    functions: FxHashMap<String, FunctionSignature>,
}

#[derive(Debug, Clone)]
pub struct Environment {
    /// Innermost last; index 0 is the global scope
    scopes: Vec<Scope>,
}

/// Scopes set aside while a function body is being checked
pub struct SavedScopes(Vec<Scope>);

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Set aside every non-global scope and open a fresh one on top of the
    /// global scope
    pub fn enter_function(&mut self) -> SavedScopes {
        let saved = self.scopes.split_off(1);
        self.scopes.push(Scope::default());
        SavedScopes(saved)
    }

    pub fn exit_function(&mut self, saved: SavedScopes) {
        self.scopes.truncate(1);
        self.scopes.extend(saved.0);
    }

    pub fn add_var(&mut self, name: &str, ty: TypeDef) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.vars.insert(name.to_string(), ty);
        }
    }

    pub fn lookup_var(&self, name: &str) -> Option<&TypeDef> {
        self.scopes.iter().rev().find_map(|s| s.vars.get(name))
    }

    pub fn add_function(&mut self, name: &str, signature: FunctionSignature) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.functions.insert(name.to_string(), signature);
        }
    }

    pub fn lookup_function(&self, name: &str) -> Option<&FunctionSignature> {
        self.scopes.iter().rev().find_map(|s| s.functions.get(name))
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_shadows_and_pops() {
        let mut env = Environment::new();
        env.add_var("x", TypeDef::INT);
        env.push_scope();
        env.add_var("x", TypeDef::STRING);
        assert_eq!(env.lookup_var("x"), Some(&TypeDef::STRING));
        env.pop_scope();
        assert_eq!(env.lookup_var("x"), Some(&TypeDef::INT));
    }

    #[test]
    fn test_global_scope_is_never_popped() {
        let mut env = Environment::new();
        env.pop_scope();
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn test_function_scope_sees_only_globals() {
        let mut env = Environment::new();
        env.add_var("global", TypeDef::INT);
        env.push_scope();
        env.add_var("local", TypeDef::BOOL);

        let saved = env.enter_function();
        assert_eq!(env.lookup_var("global"), Some(&TypeDef::INT));
        assert_eq!(env.lookup_var("local"), None);
        env.exit_function(saved);

        assert_eq!(env.lookup_var("local"), Some(&TypeDef::BOOL));
        assert_eq!(env.depth(), 2);
    }

    #[test]
    fn test_function_signatures() {
        let mut env = Environment::new();
        env.add_function(
            "f",
            FunctionSignature {
                params: vec![TypeDef::INT],
                return_type: TypeDef::VOID,
            },
        );
        assert_eq!(env.lookup_function("f").map(|s| s.params.len()), Some(1));
        assert!(env.lookup_function("g").is_none());
    }
}
