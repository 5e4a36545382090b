/**
Error types for writing generated C
*/
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    /// Output path rejected before anything was written
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Result type for code generation operations
pub type CodegenResult<T> = Result<T, CodegenError>;
