//! Capgate Runtime - Capability gateway for sandboxed script contexts
//!
//! This library decides which host capabilities a guest context can reach:
//! - Global binding installation (fixed, hidden, all-or-nothing)
//! - Console shim (discard, or forward through the host function bridge)
//! - Network capability pass-through (`net` / `tls`)
//! - Sandbox context bootstrap and capability auditing

/// Capgate runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod api;
pub mod bridge;
pub mod capability;
pub mod console;
pub mod context;
pub mod global;
pub mod net;
pub mod security;
pub mod value;

// Re-export commonly used types
pub use api::NativeFunctionBuilder;
pub use bridge::{HostFunctionBridge, CONSOLE_LOG_KEY};
pub use capability::{
    install, install_bindings, CapabilityError, CapabilitySet, GlobalBindingInstaller,
};
pub use capgate_config::ConsoleMode;
pub use console::{format_log_args, ConsoleShim, SinkMode};
pub use context::{ContextError, ContextOptions, HostServices, SandboxContext};
pub use global::{GlobalNamespace, PropertyAttributes, PropertyDescriptor};
pub use net::{NetworkModule, Transport};
pub use security::{AuditEvent, AuditLogger, MemoryAuditLogger};
pub use value::{NativeFn, RuntimeError, Value};
