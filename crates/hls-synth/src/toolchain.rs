//! Synthesis tool discovery.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use hls_core::config::ToolConfig;
use hls_core::domain::error::{HlsError, Result};
use tracing::debug;

#[cfg(windows)]
const EXTENSIONS: &[&str] = &["", "bat", "exe", "cmd"];
#[cfg(not(windows))]
const EXTENSIONS: &[&str] = &[""];

/// Find the synthesis tool executable.
///
/// Order: `explicit` (or `config.path`), the configured install candidates,
/// then `config.names` on `PATH`. An explicit path that does not exist is an
/// error unless it is a bare name found on `PATH`.
pub fn locate_tool(explicit: Option<&Path>, config: &ToolConfig) -> Result<PathBuf> {
    let path_var = std::env::var_os("PATH");
    locate_tool_in(explicit, config, path_var.as_deref())
}

/// [`locate_tool`] against an explicit `PATH` value.
pub fn locate_tool_in(
    explicit: Option<&Path>,
    config: &ToolConfig,
    path_var: Option<&OsStr>,
) -> Result<PathBuf> {
    let mut searched = Vec::new();

    if let Some(explicit) = explicit.or(config.path.as_deref()) {
        if explicit.is_file() {
            return resolved(explicit);
        }
        searched.push(explicit.display().to_string());
        if is_bare_name(explicit) {
            if let Some(found) = search_path(explicit.as_os_str(), path_var) {
                return resolved(&found);
            }
        }
        return Err(HlsError::ToolNotFound { searched });
    }

    for candidate in &config.candidates {
        if candidate.is_file() {
            return resolved(candidate);
        }
        searched.push(candidate.display().to_string());
    }

    for name in &config.names {
        if let Some(found) = search_path(OsStr::new(name), path_var) {
            return resolved(&found);
        }
        searched.push(format!("{} on PATH", name));
    }

    Err(HlsError::ToolNotFound { searched })
}

fn is_bare_name(path: &Path) -> bool {
    !path.is_absolute() && path.components().count() == 1
}

fn search_path(name: &OsStr, path_var: Option<&OsStr>) -> Option<PathBuf> {
    let path_var = path_var?;
    std::env::split_paths(path_var).find_map(|dir| {
        EXTENSIONS.iter().find_map(|ext| {
            let candidate = dir.join(name);
            let candidate = if ext.is_empty() {
                candidate
            } else {
                candidate.with_extension(ext)
            };
            candidate.is_file().then_some(candidate)
        })
    })
}

// The tool runs with the workspace as its working directory, so relative
// paths must be resolved first.
fn resolved(path: &Path) -> Result<PathBuf> {
    let absolute = std::fs::canonicalize(path)?;
    debug!(tool = %absolute.display(), "located synthesis tool");
    Ok(absolute)
}
