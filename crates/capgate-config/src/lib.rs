//! Capgate Configuration
//!
//! Decides which capabilities a fresh sandbox context receives:
//! - Console sink mode (`discard` or `forward`)
//! - Whether the `net` / `tls` transport surface is exposed
//! - Whether capability audit logging is enabled
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.capgate/config.toml)
//! 2. Project config (./capgate.toml, searched upwards)
//! 3. Environment variables (CAPGATE_*)
//! 4. Explicit options passed by the host
//!
//! Nothing is persisted: each context reads the merged result once at creation.
//!
//! # Example
//!
//! ```no_run
//! use capgate_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("console mode: {}", config.console_mode());
//! ```

pub mod gateway;
pub mod loader;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use gateway::{AuditSection, ConsoleMode, ConsoleSection, GatewayConfig, NetworkSection};
pub use loader::{Config, ConfigLoader};
