use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::keys::KeyType;
use crate::paths::{expand_tilde, SshPaths};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the SSH `config` file and key pairs
    #[serde(default = "default_ssh_dir")]
    pub ssh_dir: String,
    #[serde(default)]
    pub default_key_type: KeyType,
}

fn default_ssh_dir() -> String {
    "~/.ssh".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ssh_dir: default_ssh_dir(),
            default_key_type: KeyType::default(),
        }
    }
}

impl AppConfig {
    /// An empty `ssh_dir` falls back to `<home>/.ssh`.
    pub fn ssh_paths(&self, home: &Path) -> SshPaths {
        if self.ssh_dir.trim().is_empty() {
            SshPaths::from_home(home)
        } else {
            SshPaths::from_ssh_dir(expand_tilde(&self.ssh_dir, home))
        }
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("mssh");
        Self::with_dir(config_dir)
    }

    pub fn with_dir(config_dir: PathBuf) -> Result<Self> {
        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        }

        let config_file = config_dir.join("mssh.toml");

        Ok(Self {
            config_dir,
            config_file,
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        // If config file doesn't exist, create it with default values
        if !self.config_file.exists() {
            let default_config = AppConfig::default();
            self.save_config(&default_config)?;
        }

        let content =
            fs::read_to_string(&self.config_file).context("Failed to read config file")?;

        let config: AppConfig = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_file, toml).context("Failed to write config file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_default_config() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path().join("mssh")).unwrap();

        let config = manager.load_config().unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(dir.path().join("mssh").join("mssh.toml").exists());
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("mssh.toml"), "default_key_type = \"rsa\"\n").unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf()).unwrap();

        let config = manager.load_config().unwrap();

        assert_eq!(config.ssh_dir, "~/.ssh");
        assert_eq!(config.default_key_type, KeyType::Rsa);
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("mssh.toml"), "default_key_type = \"dsa\"\n").unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf()).unwrap();

        assert!(manager.load_config().is_err());
    }

    #[test]
    fn test_ssh_paths_expand_home() {
        let config = AppConfig::default();
        let paths = config.ssh_paths(Path::new("/home/alice"));
        assert_eq!(paths, SshPaths::from_home(Path::new("/home/alice")));

        let config = AppConfig {
            ssh_dir: String::new(),
            ..AppConfig::default()
        };
        assert_eq!(
            config.ssh_paths(Path::new("/home/bob")).config_file,
            PathBuf::from("/home/bob/.ssh/config")
        );

        let config = AppConfig {
            ssh_dir: "/srv/ssh".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.ssh_paths(Path::new("/home/bob")).key_dir, PathBuf::from("/srv/ssh"));
    }
}
