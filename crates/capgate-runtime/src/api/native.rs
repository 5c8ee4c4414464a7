//! Native function construction
//!
//! Every callable member a capability exposes (`console.log`, `net.connect`,
//! `tls.startTls`, ...) is a host closure wrapped into a [`Value`]. The
//! builder names the member for error messages and optionally fixes its
//! argument count.
//!
//! # Examples
//!
//! ```rust
//! use capgate_runtime::api::native::NativeFunctionBuilder;
//! use capgate_runtime::value::{RuntimeError, Value};
//!
//! let resolve = NativeFunctionBuilder::new("dns.resolve")
//!     .with_arity(1)
//!     .build(|args| match &args[0] {
//!         Value::String(_) => Ok(Value::string("127.0.0.1")),
//!         other => Err(RuntimeError::TypeError {
//!             msg: format!("dns.resolve expects a string, got {}", other.type_name()),
//!         }),
//!     });
//!
//! assert_eq!(
//!     resolve.call(&[Value::string("localhost")]).unwrap(),
//!     Value::string("127.0.0.1")
//! );
//! assert!(resolve.call(&[]).is_err());
//! ```

use crate::value::{RuntimeError, Value};

/// Builder for capability members
#[derive(Debug, Clone)]
pub struct NativeFunctionBuilder {
    name: String,
    arity: Option<usize>,
}

impl NativeFunctionBuilder {
    /// Start a variadic member called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: None,
        }
    }

    /// Require exactly `arity` arguments; mismatches fail with `TypeError`
    /// before the implementation runs
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Accept any number of arguments
    pub fn variadic(mut self) -> Self {
        self.arity = None;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wrap `implementation` as a callable value
    ///
    /// Results and errors of the implementation are returned unchanged.
    pub fn build<F>(self, implementation: F) -> Value
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        let Some(expected) = self.arity else {
            return Value::native(implementation);
        };

        let name = self.name;
        Value::native(move |args| {
            if args.len() != expected {
                return Err(RuntimeError::TypeError {
                    msg: format!(
                        "{} expects {} argument{}, got {}",
                        name,
                        expected,
                        if expected == 1 { "" } else { "s" },
                        args.len()
                    ),
                });
            }
            implementation(args)
        })
    }
}
