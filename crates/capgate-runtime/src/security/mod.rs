//! Capability Security
//!
//! Contexts are sandboxed by default: a guest sees only the capabilities the
//! host selected at creation (`console` always, `net`/`tls` on request), every
//! one of them installed as a fixed, hidden binding.
//!
//! # Architecture
//!
//! - **AuditEvent / AuditLogger**: structured record of what was exposed,
//!   what was refused, and which host calls failed
//!
//! # Example
//!
//! ```
//! use capgate_runtime::security::{AuditEvent, AuditLogger, MemoryAuditLogger};
//!
//! let logger = MemoryAuditLogger::new();
//! logger.log(AuditEvent::CapabilityInstalled { name: "console".to_string() });
//! assert_eq!(logger.entries().len(), 1);
//! ```

pub mod audit;

pub use audit::{
    AuditEntry, AuditEvent, AuditLogger, MemoryAuditLogger, NullAuditLogger, TracingAuditLogger,
};
