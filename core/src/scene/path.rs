//! Prim path parsing.
//!
//! A prim path is absolute (`/World/Cone`): it starts with `/` and every
//! segment between slashes is a valid prim name. The bare root `/` names
//! the synthetic document root and cannot be defined.

use crate::error::{Result, SceneError};

/// Path of the synthetic document root.
pub const ROOT_PATH: &str = "/";

/// Deepest prim nesting a path may describe.
pub const MAX_DEPTH: usize = 32;

/// Check a single prim name. Returns the reason on failure.
pub fn check_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        return Err("empty segment");
    }
    if name.contains('/') {
        return Err("segment contains '/'");
    }
    if name == "." || name == ".." {
        return Err("relative segment");
    }
    if name.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err("segment contains whitespace or control characters");
    }
    Ok(())
}

/// Split an absolute prim path into its segments.
pub fn segments(path: &str) -> Result<Vec<&str>> {
    let invalid = |reason: &str| SceneError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| invalid("path must start with '/'"))?;
    if rest.is_empty() {
        return Err(invalid("the root path cannot be defined"));
    }

    let parts: Vec<&str> = rest.split('/').collect();
    if parts.len() > MAX_DEPTH {
        return Err(invalid("path is nested too deeply"));
    }
    for part in &parts {
        check_name(part).map_err(invalid)?;
    }
    Ok(parts)
}

/// Append a child name to a parent path.
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}
