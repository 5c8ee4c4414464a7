//! Global binding installer
//!
//! Installs capability values onto a global namespace as own properties with
//! enumerable = false, writable = false, configurable = false.
//!
//! Installation is all-or-nothing: every binding is validated against the
//! namespace before the first one is written. Reinstalling an identical set
//! is a no-op success; a name that is already fixed to something else is a
//! collision. Configurable properties of the same name (such as an engine's
//! default `console`) are replaced.

use super::{CapabilityError, CapabilitySet};
use crate::global::{GlobalNamespace, PropertyDescriptor};
use crate::security::audit::{AuditEvent, AuditLogger, NullAuditLogger};
use crate::value::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Words a capability can never be named after: a binding with one of these
/// names could not be reached by direct identifier access.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Installs capability sets, reporting to an audit logger
#[derive(Clone)]
pub struct GlobalBindingInstaller {
    audit_logger: Arc<dyn AuditLogger>,
}

impl Default for GlobalBindingInstaller {
    fn default() -> Self {
        Self {
            audit_logger: Arc::new(NullAuditLogger::new()),
        }
    }
}

impl GlobalBindingInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_audit_logger(audit_logger: Arc<dyn AuditLogger>) -> Self {
        Self { audit_logger }
    }

    /// Install every capability of `capabilities`
    pub fn install(
        &self,
        global: &mut GlobalNamespace,
        capabilities: &CapabilitySet,
    ) -> Result<(), CapabilityError> {
        self.install_bindings(global, &capabilities.bindings())
    }

    /// Install an ordered list of named values
    pub fn install_bindings<N: AsRef<str>>(
        &self,
        global: &mut GlobalNamespace,
        bindings: &[(N, Value)],
    ) -> Result<(), CapabilityError> {
        if bindings.is_empty() {
            return Err(CapabilityError::EmptyCapabilitySet);
        }

        // Validate everything first; nothing is written on failure
        let mut seen = HashSet::new();
        let mut pending = Vec::with_capacity(bindings.len());
        for (name, value) in bindings {
            let name = name.as_ref();
            if !is_valid_capability_name(name) {
                return Err(CapabilityError::InvalidCapabilityName {
                    name: name.to_string(),
                });
            }
            if !seen.insert(name) {
                return Err(CapabilityError::DuplicateCapability {
                    name: name.to_string(),
                });
            }

            let descriptor = PropertyDescriptor::fixed_hidden(value.clone());
            if global.check_define(name, &descriptor).is_err() {
                warn!(name, "capability collides with an existing fixed global");
                self.audit_logger.log(AuditEvent::CapabilityCollision {
                    name: name.to_string(),
                });
                return Err(CapabilityError::Collision {
                    name: name.to_string(),
                });
            }

            let already_installed = global
                .descriptor(name)
                .is_some_and(|existing| existing.is_identical(&descriptor));
            pending.push((name, descriptor, already_installed));
        }

        for (name, descriptor, already_installed) in pending {
            global
                .define_own_property(name, descriptor)
                .map_err(|_| CapabilityError::Collision {
                    name: name.to_string(),
                })?;

            if already_installed {
                debug!(name, "capability already installed");
            } else {
                debug!(name, "capability installed");
                self.audit_logger.log(AuditEvent::CapabilityInstalled {
                    name: name.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Install `capabilities` without auditing
pub fn install(
    global: &mut GlobalNamespace,
    capabilities: &CapabilitySet,
) -> Result<(), CapabilityError> {
    GlobalBindingInstaller::new().install(global, capabilities)
}

/// Install an ordered list of named values without auditing
pub fn install_bindings<N: AsRef<str>>(
    global: &mut GlobalNamespace,
    bindings: &[(N, Value)],
) -> Result<(), CapabilityError> {
    GlobalBindingInstaller::new().install_bindings(global, bindings)
}

/// Identifier-shaped and not a reserved word
fn is_valid_capability_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let head_ok = first.is_ascii_alphabetic() || first == '_' || first == '$';
    let tail_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    head_ok && tail_ok && !RESERVED_WORDS.contains(&name)
}
