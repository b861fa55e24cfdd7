//! Configuration file loading.
//!
//! Looks for the editor configuration in an explicit path first, then in
//! `neonforge.toml` in the working directory, and otherwise falls back to
//! the built-in defaults.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use thiserror::Error;

use nf_editor::config::EditorConfig;

/// File name searched for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "neonforge.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Find and load the editor configuration.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. `neonforge.toml` in the working directory
/// 3. Default config
///
/// # Errors
///
/// Returns an error if an explicit path does not exist, or if a config
/// file is found but cannot be read or parsed.
pub fn load_config(explicit_path: Option<&Path>) -> Result<EditorConfig, ConfigError> {
    load_config_in(explicit_path, Path::new("."))
}

/// [`load_config`] with the local lookup rooted at `dir`.
pub fn load_config_in(explicit_path: Option<&Path>, dir: &Path) -> Result<EditorConfig, ConfigError> {
    if let Some(path) = explicit_path {
        info!("Loading configuration from {}", path.display());
        return load_config_file(path);
    }

    let local = dir.join(DEFAULT_CONFIG_FILE);
    if local.exists() {
        info!("Loading configuration from {}", local.display());
        return load_config_file(&local);
    }

    debug!("No configuration file found, using defaults");
    Ok(EditorConfig::default())
}

fn load_config_file(path: &Path) -> Result<EditorConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_in(None, dir.path()).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn local_file_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[history]\ncapacity = 7\n",
        )
        .unwrap();
        let config = load_config_in(None, dir.path()).unwrap();
        assert_eq!(config.history.capacity, 7);
        assert_eq!(config.canvas, EditorConfig::default().canvas);
    }

    #[test]
    fn explicit_path_wins_over_local_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[history]\ncapacity = 7\n").unwrap();
        let explicit = dir.path().join("other.toml");
        fs::write(&explicit, "[canvas]\ngrid_size = 8.0\n").unwrap();

        let config = load_config_in(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.canvas.grid_size, 8.0);
        assert_eq!(config.history, EditorConfig::default().history);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = load_config_in(Some(&path), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(p) if p == path));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[history\n").unwrap();
        let err = load_config_in(None, dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
