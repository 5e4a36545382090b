/**
Runtime errors for the Strata interpreter

Raised at the point of evaluation. Every variant carries the location of
the statement or expression being evaluated.
*/
use crate::ast::SourceLoc;
use strata_runtime::NativeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("{loc}: undefined variable '{name}'")]
    UndefinedVariable { name: String, loc: SourceLoc },

    #[error("{loc}: cannot reassign immutable variable '{name}'")]
    ImmutableAssignment { name: String, loc: SourceLoc },

    #[error("{loc}: function '{name}' not found")]
    UndefinedFunction { name: String, loc: SourceLoc },

    /// `m.f()` where `m` was never imported
    #[error("{loc}: module '{name}' not imported")]
    ModuleNotImported { name: String, loc: SourceLoc },

    /// `import m from a::b` where `a::b` is not registered
    #[error("{loc}: module not found: {path}")]
    ModuleNotFound { path: String, loc: SourceLoc },

    #[error("{loc}: module '{module}' has no member '{member}'")]
    UnknownMember {
        module: String,
        member: String,
        loc: SourceLoc,
    },

    #[error("{loc}: '{name}' is not a function")]
    NotAFunction { name: String, loc: SourceLoc },

    #[error("{loc}: function '{name}' cannot be used as a value")]
    FunctionValue { name: String, loc: SourceLoc },

    #[error("{loc}: function '{name}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
        loc: SourceLoc,
    },

    #[error("{loc}: division by zero")]
    DivisionByZero { loc: SourceLoc },

    #[error("{loc}: unsupported operator '{op}'")]
    UnsupportedOperator { op: String, loc: SourceLoc },

    #[error("{loc}: {source}")]
    Native { source: NativeError, loc: SourceLoc },
}

impl RuntimeError {
    pub fn loc(&self) -> &SourceLoc {
        match self {
            RuntimeError::UndefinedVariable { loc, .. }
            | RuntimeError::ImmutableAssignment { loc, .. }
            | RuntimeError::UndefinedFunction { loc, .. }
            | RuntimeError::ModuleNotImported { loc, .. }
            | RuntimeError::ModuleNotFound { loc, .. }
            | RuntimeError::UnknownMember { loc, .. }
            | RuntimeError::NotAFunction { loc, .. }
            | RuntimeError::FunctionValue { loc, .. }
            | RuntimeError::ArityMismatch { loc, .. }
            | RuntimeError::DivisionByZero { loc }
            | RuntimeError::UnsupportedOperator { loc, .. }
            | RuntimeError::Native { loc, .. } => loc,
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
