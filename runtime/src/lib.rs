/*!
Strata Runtime - values and the standard library namespaces

The interpreter's only contract with this crate is: look a module up by its
import path, resolve a member by name, and invoke it with already evaluated
arguments. Everything is registered in a [`ModuleRegistry`] value built once
at startup and lent to the interpreter.
*/

pub mod collections;
pub mod file;
pub mod io;
pub mod math;
pub mod pattern;
pub mod prelude;
pub mod text;
pub mod time;
pub mod value;

pub use value::Value;

use rustc_hash::FxHashMap;
use std::io::Write;
use thiserror::Error;

/// Failure raised from inside a native function
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    #[error("{function}: expected {expected}, got {actual}")]
    TypeMismatch {
        function: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{function}: invalid regular expression: {message}")]
    InvalidPattern {
        function: &'static str,
        message: String,
    },

    #[error("{function}: {message}")]
    Failed {
        function: &'static str,
        message: String,
    },
}

pub type NativeResult = Result<Value, NativeError>;

/// What a native function may touch besides its arguments
pub struct Host<'a> {
    pub out: &'a mut dyn Write,
}

impl<'a> Host<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Host { out }
    }
}

pub type NativeFn = fn(&mut Host<'_>, &[Value]) -> NativeResult;

/// A host function with a fixed arity
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

impl Builtin {
    pub fn call(&self, host: &mut Host<'_>, args: &[Value]) -> NativeResult {
        (self.func)(host, args)
    }
}

#[derive(Debug, Clone)]
pub enum Member {
    Function(Builtin),
    Constant(Value),
}

/// A named namespace of builtins and constants, e.g. `std::math`
#[derive(Debug, Clone)]
pub struct Module {
    path: &'static str,
    members: FxHashMap<&'static str, Member>,
}

impl Module {
    pub fn new(path: &'static str) -> Self {
        Module {
            path,
            members: FxHashMap::default(),
        }
    }

    pub fn function(mut self, name: &'static str, arity: usize, func: NativeFn) -> Self {
        self.members
            .insert(name, Member::Function(Builtin { name, arity, func }));
        self
    }

    pub fn constant(mut self, name: &'static str, value: Value) -> Self {
        self.members.insert(name, Member::Constant(value));
        self
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// Member names in sorted order
    pub fn member_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.members.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Import path -> module table, plus the bare-call prelude
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: FxHashMap<&'static str, Module>,
    /// Short import names resolving to a registered path
    aliases: FxHashMap<&'static str, &'static str>,
    prelude: Module,
}

impl ModuleRegistry {
    /// A registry with no importable modules and an empty prelude
    pub fn empty() -> Self {
        ModuleRegistry {
            modules: FxHashMap::default(),
            aliases: FxHashMap::default(),
            prelude: Module::new("prelude"),
        }
    }

    /// Every `std::*` namespace plus the prelude builtins.
    /// `math` and `str` are accepted as short names for `std::math` and `std::io`.
    pub fn standard() -> Self {
        let mut registry = ModuleRegistry {
            modules: FxHashMap::default(),
            aliases: FxHashMap::default(),
            prelude: prelude::module(),
        };
        registry.register(io::module());
        registry.register(math::module());
        registry.register(text::module());
        registry.register(file::module());
        registry.register(time::module());
        registry.register(collections::list_module());
        registry.register(collections::map_module());
        registry.register(collections::set_module());
        registry.register(pattern::module());
        registry.alias("math", "std::math");
        registry.alias("str", "std::io");
        registry
    }

    pub fn register(&mut self, module: Module) {
        self.modules.insert(module.path(), module);
    }

    pub fn alias(&mut self, name: &'static str, path: &'static str) {
        self.aliases.insert(name, path);
    }

    pub fn get(&self, path: &str) -> Option<&Module> {
        self.modules
            .get(path)
            .or_else(|| self.modules.get(*self.aliases.get(path)?))
    }

    pub fn prelude(&self) -> &Module {
        &self.prelude
    }

    pub fn module_paths(&self) -> Vec<&'static str> {
        let mut paths: Vec<_> = self.modules.keys().copied().collect();
        paths.sort_unstable();
        paths
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

static NIL: Value = Value::Nil;

/// Positional argument, `nil` when the caller passed fewer
pub(crate) fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NIL)
}

/// Display form of a positional argument
pub(crate) fn arg_string(args: &[Value], index: usize) -> String {
    arg(args, index).to_display()
}

#[cfg(test)]
pub(crate) fn call(module: &Module, name: &str, args: &[Value]) -> NativeResult {
    let mut sink = Vec::new();
    let mut host = Host::new(&mut sink);
    match module.get(name) {
        Some(Member::Function(builtin)) => builtin.call(&mut host, args),
        _ => panic!("{} has no function {}", module.path(), name),
    }
}
