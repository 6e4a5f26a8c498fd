//! The user-global configuration for `stax`.

use crate::{
    constants::CONFIG_FILE_NAME,
    errors::{StError, StResult},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The user-global configuration, persisted in the home directory.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StConfig {
    /// The GitHub personal access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

impl StConfig {
    /// Loads the configuration from the home directory. A missing file yields the default
    /// configuration.
    pub fn load() -> StResult<Self> {
        Self::load_from(&config_path()?)
    }

    /// Persists the configuration to the home directory.
    pub fn save(&self) -> StResult<()> {
        self.save_to(&config_path()?)
    }

    /// Loads the configuration at `path`. A missing file yields the default configuration.
    pub fn load_from(path: &Path) -> StResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no configuration found");
            return Ok(Self::default());
        }
        Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
    }

    /// Persists the configuration to `path`, readable only by the owner.
    pub fn save_to(&self, path: &Path) -> StResult<()> {
        std::fs::write(path, toml::to_string_pretty(self)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %path.display(), "saved configuration");
        Ok(())
    }

    /// Returns the stored token, falling back to `env_token` (from `GITHUB_TOKEN`).
    pub fn token(&self, env_token: Option<String>) -> Option<String> {
        self.github_token
            .clone()
            .filter(|t| !t.is_empty())
            .or(env_token.filter(|t| !t.is_empty()))
    }
}

/// Returns the path of the user-global configuration file.
pub fn config_path() -> StResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILE_NAME))
        .ok_or(StError::MissingHomeDir)
}
