/**
Type checking errors for Strata
*/
use crate::ast::{SourceLoc, TypeDef};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// Inferred type is not compatible with the declared one
    #[error("{loc}: type mismatch in {context}: expected {expected}, found {actual}")]
    Mismatch {
        expected: TypeDef,
        actual: TypeDef,
        context: String,
        loc: SourceLoc,
    },

    #[error("{loc}: return statement outside function")]
    ReturnOutsideFunction { loc: SourceLoc },

    /// Bare `return` in a function declared to produce a value
    #[error("{loc}: function '{function}' must return a value of type {expected}")]
    MissingReturnValue {
        function: String,
        expected: TypeDef,
        loc: SourceLoc,
    },

    #[error("{loc}: function '{function}' expects {expected} argument(s), found {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
        loc: SourceLoc,
    },
}

impl TypeError {
    pub fn loc(&self) -> &SourceLoc {
        match self {
            TypeError::Mismatch { loc, .. } => loc,
            TypeError::ReturnOutsideFunction { loc } => loc,
            TypeError::MissingReturnValue { loc, .. } => loc,
            TypeError::ArityMismatch { loc, .. } => loc,
        }
    }
}

/// Every error found in one checking pass, in source order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeErrors(pub Vec<TypeError>);

impl TypeErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeError> {
        self.0.iter()
    }
}

impl fmt::Display for TypeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for TypeErrors {}

pub type TypeResult<T> = Result<T, TypeErrors>;
