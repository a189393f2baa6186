use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use agent_logging::agent_info;
use mscroller_core::AgentConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Reads an [`AgentConfig`] from a RON file. A missing file yields the
/// defaults; fields left out of the file keep their default values.
pub fn load_config(path: &Path) -> Result<AgentConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            agent_info!("no config at {:?}, using defaults", path);
            return Ok(AgentConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mscroller_core::SpeedProfile;
    use tempfile::TempDir;

    #[test]
    fn missing_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AgentConfig::default());
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mscroller.ron");
        fs::write(&path, "(profile: compact, continue_countdown_secs: 5)").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.profile, SpeedProfile::Compact);
        assert_eq!(config.continue_countdown_secs, 5);
        assert_eq!(config.history_cap, AgentConfig::default().history_cap);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.ron");
        fs::write(&path, "(profile: ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }
}
