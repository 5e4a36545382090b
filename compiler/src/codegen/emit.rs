/**
Writing generated C to disk

The default output path sits beside the source file (or in a configured
directory) and is written as is. An output path given explicitly on the
command line goes through `validate_path` first.
*/
use super::{CodegenError, CodegenResult};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Validate a user supplied output path
///
/// Rejects paths that:
/// - Start with '-' (would read as a flag to whatever consumes the file next)
/// - Contain '..' (directory traversal)
pub fn validate_path(path: &str) -> CodegenResult<()> {
    if path.starts_with('-') {
        return Err(CodegenError::InvalidPath {
            path: path.to_string(),
            reason: "cannot start with '-'",
        });
    }

    if Path::new(path)
        .components()
        .any(|component| component == Component::ParentDir)
    {
        return Err(CodegenError::InvalidPath {
            path: path.to_string(),
            reason: "cannot contain '..'",
        });
    }

    Ok(())
}

/// `dir/prog.str` becomes `dir/prog.c`, or `<c_dir>/prog.c` when a C output
/// directory is configured
pub fn default_output_path(source: &Path, c_dir: Option<&Path>) -> PathBuf {
    let c_file = source.with_extension("c");
    match (c_dir, c_file.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => c_file,
    }
}

/// Write the generated C source, creating the parent directory if needed
pub fn write_c_source(code: &str, path: &Path) -> CodegenResult<()> {
    let write_error = |source| CodegenError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, code).map_err(write_error)
}
