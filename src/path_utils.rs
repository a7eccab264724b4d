//! Path validation and utility functions

use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Validates that a path string is not empty or just whitespace
pub fn validate_path_str(path_str: &str) -> Result<(), String> {
    if path_str.trim().is_empty() {
        return Err("Path cannot be empty or contain only whitespace".to_string());
    }
    if path_str.contains('\0') {
        return Err("Path cannot contain NUL bytes".to_string());
    }
    Ok(())
}

/// Resolves `path` against `cwd` when it is relative.
pub fn absolutize_from(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Captures the base directory once: either the given override or the
/// current working directory, resolved to a canonical absolute path.
pub fn capture_base_dir(override_dir: Option<&Path>) -> io::Result<PathBuf> {
    let cwd = env::current_dir()?;
    let base = match override_dir {
        Some(dir) => absolutize_from(dir, &cwd),
        None => cwd,
    };
    base.canonicalize()
}
