//! Console capability shim
//!
//! Replaces the engine's default console (whose output is not JSON-formatted
//! and would pollute the host's machine-consumed stream) with a sink chosen
//! once at construction:
//! - `Discard`: every call succeeds and nothing reaches the host
//! - `Forward(bridge)`: every call is formatted into one line and handed to
//!   the bridge entry registered under `"console.log"`
//!
//! All console methods share the sink; which method was called (the severity)
//! does not affect formatting.
//!
//! # Example
//!
//! ```
//! use capgate_runtime::bridge::HostFunctionBridge;
//! use capgate_runtime::console::{ConsoleShim, SinkMode};
//! use capgate_runtime::value::Value;
//! use std::sync::{Arc, Mutex};
//!
//! let lines = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&lines);
//!
//! let bridge = HostFunctionBridge::shared();
//! bridge.register("console.log", move |args| {
//!     sink.lock().unwrap().push(args[0].to_string());
//!     Ok(Value::Undefined)
//! });
//!
//! let console = ConsoleShim::new(SinkMode::Forward(bridge));
//! console.log(&[Value::string("x"), Value::Number(1.0)]).unwrap();
//! assert_eq!(*lines.lock().unwrap(), vec!["x 1".to_string()]);
//! ```

pub mod format;

use crate::api::NativeFunctionBuilder;
use crate::bridge::{HostFunctionBridge, CONSOLE_LOG_KEY};
use crate::security::audit::{AuditEvent, AuditLogger, NullAuditLogger};
use crate::value::{RuntimeError, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub use format::{format_log_args, stringify};

/// Console methods exposed on the guest-visible `console` object
pub const CONSOLE_METHODS: [&str; 6] = ["log", "info", "debug", "warn", "error", "trace"];

/// Where console output goes
#[derive(Clone)]
pub enum SinkMode {
    /// Accept every call, forward nothing
    Discard,
    /// Forward formatted lines to the bridge entry `"console.log"`
    Forward(Arc<HostFunctionBridge>),
}

impl SinkMode {
    pub fn name(&self) -> &'static str {
        match self {
            SinkMode::Discard => "discard",
            SinkMode::Forward(_) => "forward",
        }
    }
}

impl fmt::Debug for SinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkMode::Discard => write!(f, "Discard"),
            SinkMode::Forward(bridge) => f.debug_tuple("Forward").field(bridge).finish(),
        }
    }
}

struct Sink {
    mode: SinkMode,
    audit_logger: Arc<dyn AuditLogger>,
}

impl Sink {
    fn write(&self, args: &[Value]) -> Result<(), RuntimeError> {
        let bridge = match &self.mode {
            SinkMode::Discard => return Ok(()),
            SinkMode::Forward(bridge) => bridge,
        };

        let Some(host_log) = bridge.resolve(CONSOLE_LOG_KEY) else {
            warn!(key = CONSOLE_LOG_KEY, "console call dropped: host function not registered");
            self.audit_logger.log(AuditEvent::HostFunctionMissing {
                key: CONSOLE_LOG_KEY.to_string(),
            });
            return Err(RuntimeError::MissingHostFunction {
                key: CONSOLE_LOG_KEY.to_string(),
            });
        };

        host_log(&[Value::string(format_log_args(args))]).map(|_| ())
    }
}

/// Guest-facing console replacement
///
/// The guest-visible object is built once; every call to [`ConsoleShim::to_value`]
/// returns the same object, so reinstalling the shim is idempotent.
#[derive(Clone)]
pub struct ConsoleShim {
    sink: Arc<Sink>,
    object: Value,
}

impl ConsoleShim {
    /// Create a shim with the given sink mode
    pub fn new(mode: SinkMode) -> Self {
        Self::with_audit_logger(mode, Arc::new(NullAuditLogger::new()))
    }

    /// Create a shim that reports dropped forwards to `audit_logger`
    pub fn with_audit_logger(mode: SinkMode, audit_logger: Arc<dyn AuditLogger>) -> Self {
        debug!(mode = mode.name(), "console shim created");
        let sink = Arc::new(Sink { mode, audit_logger });
        let object = build_console_object(&sink);
        Self { sink, object }
    }

    /// Shim that drops everything
    pub fn discard() -> Self {
        Self::new(SinkMode::Discard)
    }

    /// Shim that forwards into `bridge`
    pub fn forward(bridge: Arc<HostFunctionBridge>) -> Self {
        Self::new(SinkMode::Forward(bridge))
    }

    pub fn mode(&self) -> &SinkMode {
        &self.sink.mode
    }

    /// Handle one logging call
    ///
    /// In forward mode a missing `"console.log"` entry fails this call with
    /// `MissingHostFunction`; errors raised by the host callable are returned
    /// unchanged.
    pub fn log(&self, args: &[Value]) -> Result<(), RuntimeError> {
        self.sink.write(args)
    }

    /// The guest-visible `console` object
    pub fn to_value(&self) -> Value {
        self.object.clone()
    }
}

impl fmt::Debug for ConsoleShim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleShim")
            .field("mode", &self.sink.mode)
            .finish()
    }
}

fn build_console_object(sink: &Arc<Sink>) -> Value {
    Value::object(CONSOLE_METHODS.iter().map(|&method| {
        let sink = Arc::clone(sink);
        let function = NativeFunctionBuilder::new(format!("console.{}", method))
            .variadic()
            .build(move |args| sink.write(args).map(|_| Value::Undefined));
        (method, function)
    }))
}
