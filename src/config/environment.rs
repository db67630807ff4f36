//! Environment variable loading and management.
//!
//! Only a handful of deployment-level overrides are read from the
//! environment; everything else lives in the TOML configuration.

use std::env;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::model::Snowflake;

/// Loads environment variables from a .env file and the system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<PathBuf>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to a .env file. Nothing is loaded when `None`.
    pub fn new(env_file: Option<&Path>) -> Self {
        // Only an explicit path is loaded so tests never pick up a stray .env.
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(error) = dotenv::from_path(path) {
                    warn!(path = %path.display(), %error, "failed to load .env file");
                }
            } else {
                warn!(path = %path.display(), ".env file not found");
            }
        }

        Self {
            env_file: env_file.map(Path::to_path_buf),
        }
    }

    /// The .env file this loader was created with.
    pub fn env_file(&self) -> Option<&Path> {
        self.env_file.as_deref()
    }

    /// Prefix override from `BCK_PREFIX`.
    pub fn prefix(&self) -> Option<String> {
        env::var("BCK_PREFIX").ok().filter(|prefix| !prefix.is_empty())
    }

    /// Owner ids from `BCK_OWNERS`, comma separated. Malformed ids are skipped.
    pub fn owners(&self) -> Option<Vec<Snowflake>> {
        let raw = env::var("BCK_OWNERS").ok()?;
        let owners = raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .filter_map(|id| match id.parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(id, "ignoring malformed owner id in BCK_OWNERS");
                    None
                }
            })
            .collect();
        Some(owners)
    }

    /// Log level from `BCK_LOG_LEVEL`.
    pub fn log_level(&self) -> Option<String> {
        env::var("BCK_LOG_LEVEL").ok()
    }

    /// Configuration file from `BCK_CONFIG`.
    pub fn config_path(&self) -> Option<PathBuf> {
        env::var_os("BCK_CONFIG").map(PathBuf::from)
    }
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
