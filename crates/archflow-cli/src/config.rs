//! Configuration file discovery for the CLI
//!
//! Finds the TOML configuration that sets the conflict policies and output
//! options, and falls back to defaults when there is none.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use archflow::{ArchflowError, config::AppConfig};

/// Local configuration path, relative to the working directory.
const LOCAL_CONFIG: &str = "archflow/config.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for ArchflowError {
    fn from(err: ConfigError) -> Self {
        ArchflowError::Io(std::io::Error::other(err.to_string()))
    }
}

/// Find and load configuration
///
/// Search order:
/// 1. Explicit path if provided
/// 2. `archflow/config.toml` under the working directory
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ArchflowError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new(LOCAL_CONFIG);
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    match ProjectDirs::from("com", "archflow", "archflow") {
        Some(proj_dirs) => {
            let system_config = proj_dirs.config_dir().join("config.toml");
            if system_config.exists() {
                info!(path = system_config.display().to_string(); "Loading configuration from system path");
                return load_config_file(system_config);
            }
            debug!(path = system_config.display().to_string(); "System configuration file not found");
        }
        None => debug!("Could not determine platform-specific config directory"),
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ArchflowError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content, path)
}

fn parse_config(content: &str, path: &Path) -> Result<AppConfig, ArchflowError> {
    let config: AppConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    debug!(
        merge = config.policies().merge().as_str(),
        publishers = config.policies().publishers().as_str(),
        pretty = config.output().pretty();
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use archflow::policy::ConflictPolicy;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_explicit_path_is_loaded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[policies]\nmerge = \"last_wins\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.policies().merge(), ConflictPolicy::LastWins);
        assert_eq!(config.policies().publishers(), ConflictPolicy::LastWins);
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = load_config(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_invalid_toml_names_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\npretty = \"sometimes\"").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Failed to parse TOML configuration"));
        assert!(message.contains(&file.path().display().to_string()));
    }
}
