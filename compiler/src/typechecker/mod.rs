/**
Type checker for Strata

Structural checking of declarations, assignments, conditions, calls and
returns against the `TypeDef` compatibility relation. All mismatches in a
program are collected and reported together.
*/
pub mod checker;
pub mod environment;
pub mod errors;

pub use checker::TypeChecker;
pub use errors::{TypeError, TypeErrors, TypeResult};
