//! Gateway Configuration (capgate.toml)
//!
//! The same file layout is used for the project file (`capgate.toml`) and the
//! user-level file (`~/.capgate/config.toml`).

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the project-level configuration file
pub const PROJECT_CONFIG_FILE: &str = "capgate.toml";

/// Capability configuration for sandbox contexts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Console sink settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console: Option<ConsoleSection>,

    /// Transport surface settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkSection>,

    /// Capability audit settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditSection>,
}

/// `[console]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConsoleSection {
    /// Sink mode ("discard" or "forward")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// `[network]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct NetworkSection {
    /// Expose `net` and `tls` to guest scripts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// `[audit]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct AuditSection {
    /// Record capability events through the audit logger
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Console sink mode as selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleMode {
    /// Accept and drop every logging call
    #[default]
    Discard,
    /// Route logging calls to the host bridge
    Forward,
}

impl ConsoleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleMode::Discard => "discard",
            ConsoleMode::Forward => "forward",
        }
    }
}

impl fmt::Display for ConsoleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsoleMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discard" => Ok(ConsoleMode::Discard),
            "forward" => Ok(ConsoleMode::Forward),
            other => Err(ConfigError::InvalidValue {
                field: "console.mode".to_string(),
                reason: format!("must be 'discard' or 'forward', got '{}'", other),
            }),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field values that serde cannot check on its own
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(mode) = self.console.as_ref().and_then(|c| c.mode.as_deref()) {
            mode.parse::<ConsoleMode>()?;
        }
        Ok(())
    }

    /// Get the user-level config file path (~/.capgate/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".capgate").join("config.toml"))
    }

    /// Configured console mode, if any
    pub fn console_mode(&self) -> Option<ConsoleMode> {
        self.console
            .as_ref()
            .and_then(|c| c.mode.as_deref())
            .and_then(|m| m.parse().ok())
    }

    /// Configured network switch, if any
    pub fn network_enabled(&self) -> Option<bool> {
        self.network.as_ref().and_then(|n| n.enabled)
    }

    /// Configured audit switch, if any
    pub fn audit_enabled(&self) -> Option<bool> {
        self.audit.as_ref().and_then(|a| a.enabled)
    }

    /// Merge another config into this one.
    /// Other config takes precedence for values it sets.
    pub fn merge(&mut self, other: &GatewayConfig) {
        if let Some(mode) = other.console.as_ref().and_then(|c| c.mode.clone()) {
            self.console.get_or_insert_with(Default::default).mode = Some(mode);
        }
        if let Some(enabled) = other.network_enabled() {
            self.network.get_or_insert_with(Default::default).enabled = Some(enabled);
        }
        if let Some(enabled) = other.audit_enabled() {
            self.audit.get_or_insert_with(Default::default).enabled = Some(enabled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[console]
mode = "forward"
"#;

        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.console_mode(), Some(ConsoleMode::Forward));
        assert_eq!(config.network_enabled(), None);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[console]
mode = "discard"

[network]
enabled = true

[audit]
enabled = false
"#;

        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.console_mode(), Some(ConsoleMode::Discard));
        assert_eq!(config.network_enabled(), Some(true));
        assert_eq!(config.audit_enabled(), Some(false));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
[network]
enabled = true
allow_udp = true
"#;
        assert!(toml::from_str::<GatewayConfig>(toml).is_err());
    }

    #[test]
    fn test_invalid_console_mode() {
        let config = GatewayConfig {
            console: Some(ConsoleSection {
                mode: Some("stdout".to_string()),
            }),
            ..Default::default()
        };

        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "console.mode"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_console_mode_parse_is_case_insensitive() {
        assert_eq!("FORWARD".parse::<ConsoleMode>().unwrap(), ConsoleMode::Forward);
        assert_eq!(" discard ".parse::<ConsoleMode>().unwrap(), ConsoleMode::Discard);
    }

    #[test]
    fn test_merge_configs() {
        let mut base = GatewayConfig {
            network: Some(NetworkSection {
                enabled: Some(false),
            }),
            ..Default::default()
        };
        let override_config = GatewayConfig {
            console: Some(ConsoleSection {
                mode: Some("forward".to_string()),
            }),
            ..Default::default()
        };

        base.merge(&override_config);
        assert_eq!(base.console_mode(), Some(ConsoleMode::Forward));
        assert_eq!(base.network_enabled(), Some(false));
    }
}
