//! Capability audit logging
//!
//! Structured record of capability events (installation, collisions, missing
//! host functions, context lifecycle) for security monitoring.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Capability audit event types
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Context bootstrap finished; guest code may now run
    ContextCreated {
        context_id: String,
        capabilities: Vec<String>,
    },
    /// Context torn down
    ContextDestroyed { context_id: String },
    /// Capability binding installed on a global namespace
    CapabilityInstalled { name: String },
    /// Capability binding refused because the name is already fixed
    CapabilityCollision { name: String },
    /// Forwarding console call found no bridge entry
    HostFunctionMissing { key: String },
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::ContextCreated {
                context_id,
                capabilities,
            } => write!(
                f,
                "Context created: {} (capabilities: {})",
                context_id,
                capabilities.join(", ")
            ),
            AuditEvent::ContextDestroyed { context_id } => {
                write!(f, "Context destroyed: {}", context_id)
            }
            AuditEvent::CapabilityInstalled { name } => {
                write!(f, "Capability installed: {}", name)
            }
            AuditEvent::CapabilityCollision { name } => {
                write!(f, "Capability collision: {}", name)
            }
            AuditEvent::HostFunctionMissing { key } => {
                write!(f, "Host function missing: {}", key)
            }
        }
    }
}

/// Audit log entry with timestamp
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: AuditEvent,
}

impl AuditEntry {
    /// Create a new audit entry with current timestamp
    pub fn new(event: AuditEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }

    /// Format as log line
    pub fn to_log_line(&self) -> String {
        format!(
            "[{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.event
        )
    }

    /// Format as one JSON object (for machine-consumed host output)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Audit logger trait for customizable logging backends
pub trait AuditLogger: Send + Sync {
    /// Log an audit event
    fn log(&self, event: AuditEvent);

    /// Get all logged entries (for testing)
    fn entries(&self) -> Vec<AuditEntry>;

    /// Clear all logged entries (for testing)
    fn clear(&self);
}

/// In-memory audit logger
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLogger {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAuditLogger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditLogger for MemoryAuditLogger {
    fn log(&self, event: AuditEvent) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(AuditEntry::new(event));
    }

    fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Null audit logger (no-op)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditLogger;

impl NullAuditLogger {
    pub fn new() -> Self {
        Self
    }
}

impl AuditLogger for NullAuditLogger {
    fn log(&self, _event: AuditEvent) {}

    fn entries(&self) -> Vec<AuditEntry> {
        Vec::new()
    }

    fn clear(&self) {}
}

/// Emits every audit event as a `tracing` event on the `capgate::audit` target.
/// Keeps nothing in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

impl TracingAuditLogger {
    pub fn new() -> Self {
        Self
    }
}

impl AuditLogger for TracingAuditLogger {
    fn log(&self, event: AuditEvent) {
        match &event {
            AuditEvent::CapabilityCollision { .. } | AuditEvent::HostFunctionMissing { .. } => {
                tracing::warn!(target: "capgate::audit", "{}", event)
            }
            _ => tracing::info!(target: "capgate::audit", "{}", event),
        }
    }

    fn entries(&self) -> Vec<AuditEntry> {
        Vec::new()
    }

    fn clear(&self) {}
}
