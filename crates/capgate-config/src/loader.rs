//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::gateway::{ConsoleMode, GatewayConfig, PROJECT_CONFIG_FILE};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.capgate/config.toml) - lowest priority
/// 2. Project config (./capgate.toml) - overrides global
/// 3. Environment variables (CAPGATE_*) - overrides project
/// 4. Host-supplied options - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Effective configuration after merging every source
    pub gateway: GatewayConfig,

    /// Directory where capgate.toml was found
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit user-level config file instead of ~/.capgate/config.toml
    pub fn with_global_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find capgate.toml, then merges it over
    /// the global config and applies environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;

        // Global config is optional; a broken one should not block context creation
        let mut gateway = self.load_global_config().unwrap_or_default();
        gateway.merge(&project_config);

        let gateway = self.apply_env_overrides(gateway)?;

        Ok(Config {
            gateway,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = GatewayConfig::load_from_file(config_path)?;
        let mut gateway = self.load_global_config().unwrap_or_default();
        gateway.merge(&project_config);

        let gateway = self.apply_env_overrides(gateway)?;

        Ok(Config {
            gateway,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, GatewayConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let project_config = GatewayConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, GatewayConfig::default())),
            }
        }
    }

    /// Load global configuration from ~/.capgate/config.toml
    fn load_global_config(&mut self) -> ConfigResult<GatewayConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = GatewayConfig::global_config_path()?;
                self.global_config_path = Some(path.clone());
                path
            }
        };

        if !path.exists() {
            return Ok(GatewayConfig::default());
        }

        GatewayConfig::load_from_file(&path)
    }

    /// Apply environment variable overrides
    ///
    /// CAPGATE_CONSOLE=discard|forward
    /// CAPGATE_NETWORK=true|1|yes (anything else disables)
    /// CAPGATE_AUDIT=true|1|yes (anything else disables)
    fn apply_env_overrides(&self, mut config: GatewayConfig) -> ConfigResult<GatewayConfig> {
        if let Ok(mode) = env::var("CAPGATE_CONSOLE") {
            let mode: ConsoleMode = mode.parse()?;
            config.console.get_or_insert_with(Default::default).mode =
                Some(mode.as_str().to_string());
        }

        if let Ok(network) = env::var("CAPGATE_NETWORK") {
            config.network.get_or_insert_with(Default::default).enabled = Some(parse_flag(&network));
        }

        if let Ok(audit) = env::var("CAPGATE_AUDIT") {
            config.audit.get_or_insert_with(Default::default).enabled = Some(parse_flag(&audit));
        }

        Ok(config)
    }

    /// Get the global configuration directory (~/.capgate)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".capgate"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    /// Effective console mode (defaults to discard)
    pub fn console_mode(&self) -> ConsoleMode {
        self.gateway.console_mode().unwrap_or_default()
    }

    /// Whether `net` / `tls` are exposed (defaults to off)
    pub fn network_enabled(&self) -> bool {
        self.gateway.network_enabled().unwrap_or(false)
    }

    /// Whether capability events are audited (defaults to off)
    pub fn audit_enabled(&self) -> bool {
        self.gateway.audit_enabled().unwrap_or(false)
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a capgate.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}
