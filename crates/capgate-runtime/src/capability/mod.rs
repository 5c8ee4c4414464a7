//! Capability registry and installation
//!
//! A [`CapabilitySet`] names every capability a context receives, as struct
//! fields rather than an open string map, so the full surface is visible at
//! compile time. The [`installer`] turns it into fixed, hidden global bindings.

pub mod installer;

use crate::console::ConsoleShim;
use crate::net::NetworkModule;
use crate::value::Value;
use thiserror::Error;

pub use installer::{install, install_bindings, GlobalBindingInstaller};

/// Global name of the console capability
pub const CONSOLE: &str = "console";
/// Global name of the plain transport capability
pub const NET: &str = "net";
/// Global name of the secure transport capability
pub const TLS: &str = "tls";

/// Capability installation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Capability '{name}' collides with an existing fixed global")]
    Collision { name: String },

    #[error("Capability set is empty")]
    EmptyCapabilitySet,

    #[error("Capability '{name}' is listed more than once")]
    DuplicateCapability { name: String },

    #[error("Invalid capability name '{name}'")]
    InvalidCapabilityName { name: String },

    #[error("Invalid capability '{name}': {reason}")]
    InvalidCapability { name: String, reason: String },
}

/// Every capability one context receives
#[derive(Debug, Clone)]
pub struct CapabilitySet {
    /// Console replacement (always installed)
    pub console: ConsoleShim,
    /// `net` / `tls` pair, when the host grants network access
    pub network: Option<NetworkModule>,
}

impl CapabilitySet {
    /// Capability set with only the console
    pub fn new(console: ConsoleShim) -> Self {
        Self {
            console,
            network: None,
        }
    }

    /// Add the transport pair
    pub fn with_network(mut self, network: NetworkModule) -> Self {
        self.network = Some(network);
        self
    }

    /// Global bindings in installation order
    pub fn bindings(&self) -> Vec<(&'static str, Value)> {
        let mut bindings = vec![(CONSOLE, self.console.to_value())];
        if let Some(network) = &self.network {
            bindings.push((NET, network.net()));
            bindings.push((TLS, network.tls()));
        }
        bindings
    }

    /// Names this set installs, in installation order
    pub fn names(&self) -> Vec<&'static str> {
        self.bindings().into_iter().map(|(name, _)| name).collect()
    }
}
