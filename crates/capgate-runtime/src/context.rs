//! Sandbox context bootstrap
//!
//! A [`SandboxContext`] owns one private global namespace. Construction
//! selects the capabilities, installs them once, and only then hands the
//! namespace to the engine adapter; nothing touches the installed bindings
//! afterwards.

use crate::bridge::HostFunctionBridge;
use crate::capability::{CapabilityError, CapabilitySet, GlobalBindingInstaller};
use crate::console::{ConsoleShim, SinkMode};
use crate::global::GlobalNamespace;
use crate::net::{NetworkModule, Transport};
use crate::security::audit::{AuditEvent, AuditLogger, NullAuditLogger, TracingAuditLogger};
use capgate_config::{Config, ConsoleMode};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Context construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("Console mode 'forward' requires a host function bridge")]
    BridgeRequired,

    #[error("Network access requires a transport")]
    TransportRequired,
}

/// What a new context exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextOptions {
    pub console: ConsoleMode,
    pub network: bool,
    pub audit: bool,
}

impl Default for ContextOptions {
    /// Fully sandboxed: console output is dropped, no network
    fn default() -> Self {
        Self {
            console: ConsoleMode::Discard,
            network: false,
            audit: false,
        }
    }
}

impl ContextOptions {
    /// Options from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            console: config.console_mode(),
            network: config.network_enabled(),
            audit: config.audit_enabled(),
        }
    }

    pub fn with_console(mut self, console: ConsoleMode) -> Self {
        self.console = console;
        self
    }

    pub fn with_network(mut self, network: bool) -> Self {
        self.network = network;
        self
    }

    pub fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }
}

/// Host-side services a context may be wired to
#[derive(Clone, Default)]
pub struct HostServices {
    pub bridge: Option<Arc<HostFunctionBridge>>,
    pub transport: Option<Arc<dyn Transport>>,
    /// Receives audit events when auditing is enabled; defaults to
    /// [`TracingAuditLogger`]
    pub audit_logger: Option<Arc<dyn AuditLogger>>,
}

impl HostServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bridge(mut self, bridge: Arc<HostFunctionBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_audit_logger(mut self, audit_logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = Some(audit_logger);
        self
    }
}

impl fmt::Debug for HostServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostServices")
            .field("bridge", &self.bridge)
            .field("transport", &self.transport.is_some())
            .field("audit_logger", &self.audit_logger.is_some())
            .finish()
    }
}

/// One isolated guest environment
pub struct SandboxContext {
    id: Uuid,
    global: GlobalNamespace,
    capabilities: Vec<&'static str>,
    audit_logger: Arc<dyn AuditLogger>,
}

impl SandboxContext {
    /// Build a context and install its capabilities
    ///
    /// Fails before any guest code could run if the requested capabilities
    /// cannot be wired up or installed.
    pub fn new(options: ContextOptions, host: HostServices) -> Result<Self, ContextError> {
        Self::new_in(GlobalNamespace::new(), options, host)
    }

    /// Like [`SandboxContext::new`], installing into a namespace the engine
    /// has already populated with its own globals
    ///
    /// A non-configurable engine global that clashes with a capability name
    /// fails construction with [`CapabilityError::Collision`].
    pub fn new_in(
        global: GlobalNamespace,
        options: ContextOptions,
        host: HostServices,
    ) -> Result<Self, ContextError> {
        let audit_logger: Arc<dyn AuditLogger> = if options.audit {
            host.audit_logger
                .unwrap_or_else(|| Arc::new(TracingAuditLogger::new()))
        } else {
            Arc::new(NullAuditLogger::new())
        };

        let mode = match options.console {
            ConsoleMode::Discard => SinkMode::Discard,
            ConsoleMode::Forward => {
                SinkMode::Forward(host.bridge.ok_or(ContextError::BridgeRequired)?)
            }
        };
        let mut capabilities =
            CapabilitySet::new(ConsoleShim::with_audit_logger(mode, Arc::clone(&audit_logger)));

        if options.network {
            let transport = host.transport.ok_or(ContextError::TransportRequired)?;
            capabilities = capabilities.with_network(NetworkModule::from_transport(transport));
        }

        Self::with_global(global, &capabilities, audit_logger)
    }

    /// Build a context around an already assembled capability set
    pub fn with_capabilities(
        capabilities: &CapabilitySet,
        audit_logger: Arc<dyn AuditLogger>,
    ) -> Result<Self, ContextError> {
        Self::with_global(GlobalNamespace::new(), capabilities, audit_logger)
    }

    /// Install `capabilities` into an engine-seeded namespace and wrap it
    pub fn with_global(
        mut global: GlobalNamespace,
        capabilities: &CapabilitySet,
        audit_logger: Arc<dyn AuditLogger>,
    ) -> Result<Self, ContextError> {
        let id = Uuid::new_v4();

        GlobalBindingInstaller::with_audit_logger(Arc::clone(&audit_logger))
            .install(&mut global, capabilities)?;

        let names = capabilities.names();
        info!(context_id = %id, capabilities = ?names, "sandbox context created");
        audit_logger.log(AuditEvent::ContextCreated {
            context_id: id.to_string(),
            capabilities: names.iter().map(|name| name.to_string()).collect(),
        });

        Ok(Self {
            id,
            global,
            capabilities: names,
            audit_logger,
        })
    }

    /// Sandboxed context with default options and no host services
    pub fn sandboxed() -> Result<Self, ContextError> {
        Self::new(ContextOptions::default(), HostServices::default())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn global(&self) -> &GlobalNamespace {
        &self.global
    }

    /// Namespace access for the engine adapter
    pub fn global_mut(&mut self) -> &mut GlobalNamespace {
        &mut self.global
    }

    /// Names of the installed capabilities, in installation order
    pub fn capabilities(&self) -> &[&'static str] {
        &self.capabilities
    }
}

impl fmt::Debug for SandboxContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SandboxContext")
            .field("id", &self.id)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

impl Drop for SandboxContext {
    fn drop(&mut self) {
        debug!(context_id = %self.id, "sandbox context destroyed");
        self.audit_logger.log(AuditEvent::ContextDestroyed {
            context_id: self.id.to_string(),
        });
    }
}
