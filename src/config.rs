use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for puppet-release.
///
/// Everything here has a sensible default; a config file only needs the keys
/// it wants to change. Command-line flags always win over the file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Directory holding one checkout per module
    #[serde(default = "default_module_path")]
    pub module_path: String,

    /// Release branch a brand-new module is pinned to
    #[serde(default = "default_release_branch")]
    pub release_branch: String,

    /// Remote name used by `git-push`
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub install: InstallConfig,
}

fn default_module_path() -> String {
    "modules".to_string()
}

fn default_release_branch() -> String {
    "release/0.1".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Defaults for the install/checkout commands
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct InstallConfig {
    /// Concurrent module jobs; 0 means one per module
    #[serde(default)]
    pub throttle: usize,

    /// Always check out with `--force`
    #[serde(default)]
    pub force: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            module_path: default_module_path(),
            release_branch: default_release_branch(),
            remote: default_remote(),
            install: InstallConfig::default(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Lookup order:
/// 1. Custom path provided as parameter
/// 2. `puppetrelease.toml` in the current directory
/// 3. `.puppetrelease.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./puppetrelease.toml").exists() {
        fs::read_to_string("./puppetrelease.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".puppetrelease.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
