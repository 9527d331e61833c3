// Persisted defaults
// ------------------
// The config file is a JSON object mirroring `PostOptions` without `url`
// and `save`. A missing or unreadable file never stops a post: it just
// contributes nothing to the merge. A single bad key is skipped on its own.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::options::PostOptions;

/// Environment variable overriding the config location.
pub const CONFIG_ENV: &str = "SOUNDLROUS_CONFIG";
pub const CONFIG_FILE_NAME: &str = ".soundlrous";

/// Where the config lives: explicit path, then `$SOUNDLROUS_CONFIG`, then
/// `~/.soundlrous`.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(CONFIG_FILE_NAME)
}

/// Read and parse the config file. Fails only when the file cannot be read
/// or is not a JSON object; keys with unusable values are logged and
/// skipped.
pub fn read(path: &Path) -> Result<PostOptions, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let object: Map<String, Value> =
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let (options, rejected) = PostOptions::from_object(object);
    for key in rejected {
        warn!(path = %path.display(), key = %key, "skipping config key with a value of the wrong type");
    }
    Ok(options)
}

/// Load persisted options, or empty options when there is nothing usable.
/// A broken file is reported on `out` and otherwise ignored.
pub fn load<W: Write>(path: &Path, out: &mut W) -> PostOptions {
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return PostOptions::default();
    }
    match read(path) {
        Ok(options) => {
            debug!(path = %path.display(), "loaded config");
            options
        }
        Err(e) => {
            warn!(error = %e, "ignoring config file");
            if let Err(io) = writeln!(out, "Unable to load configuration from {}.", path.display()) {
                warn!(error = %io, "could not report config error");
            }
            PostOptions::default()
        }
    }
}

/// Write `options` as pretty JSON, leaving out `url` and `save`.
pub fn save(path: &Path, options: &PostOptions) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(&options.persistable())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "saved config");
    Ok(())
}

/// Whether this run should write the config: always when none exists yet,
/// otherwise only on request.
pub fn should_save(path: &Path, options: &PostOptions) -> bool {
    !path.exists() || options.save.unwrap_or(false)
}
