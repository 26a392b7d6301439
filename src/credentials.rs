use std::path::{Path, PathBuf};

use crate::error::ScrapeError;

const ENV_FILE_NAME: &str = ".env";

/// Look `var` up in the env file (explicit path, or the nearest `.env` from
/// the working directory upwards), then in the process environment.
pub fn load_api_key(env_file: Option<&Path>, var: &str) -> Result<String, ScrapeError> {
    let file = match env_file {
        Some(path) => Some(path.to_path_buf()),
        None => std::env::current_dir()
            .ok()
            .and_then(|cwd| find_env_file(&cwd)),
    };

    if let Some(path) = file.as_deref() {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                if let Some(value) = lookup_env_value(&contents, var) {
                    tracing::debug!(path = %path.display(), var, "API key loaded from env file");
                    return Ok(value);
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "env file unreadable");
            }
        }
    }

    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ScrapeError::MissingCredential(var.to_string()))
}

fn find_env_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(ENV_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Parse `KEY=VALUE` lines; last assignment wins, like a shell would.
fn lookup_env_value(contents: &str, key: &str) -> Option<String> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (k, v) = line.split_once('=')?;
            if k.trim() != key {
                return None;
            }
            Some(unquote(v.trim()).to_string())
        })
        .last()
        .filter(|v| !v.is_empty())
}

fn unquote(v: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(rest) = v.strip_prefix(q) {
            // Anything after the closing quote (e.g. a comment) is dropped.
            if let Some(end) = rest.find(q) {
                return &rest[..end];
            }
        }
    }
    // Unquoted values may carry a trailing comment.
    match v.find(" #") {
        Some(idx) => v[..idx].trim_end(),
        None => v,
    }
}
