//! Host function bridge
//!
//! Host-owned table of callables reachable from sandboxed code by string key.
//! The table is shared (`Arc<HostFunctionBridge>`) between the host and every
//! shim that forwards into it, so the host may register entries after a shim
//! has been constructed. Lookups happen at call time.
//!
//! Registering an existing key replaces the previous callable and returns it.

use crate::value::{NativeFn, RuntimeError, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Key the console shim forwards formatted log lines to
pub const CONSOLE_LOG_KEY: &str = "console.log";

/// String-keyed table of host callables
#[derive(Default)]
pub struct HostFunctionBridge {
    functions: RwLock<HashMap<String, NativeFn>>,
}

impl HostFunctionBridge {
    /// Create an empty bridge
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bridge ready to be shared with shims
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a closure under `key`
    pub fn register<F>(&self, key: impl Into<String>, f: F) -> Option<NativeFn>
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.register_native(key, Arc::new(f))
    }

    /// Register an already-built native function under `key`
    pub fn register_native(&self, key: impl Into<String>, f: NativeFn) -> Option<NativeFn> {
        self.functions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), f)
    }

    /// Remove the callable under `key`
    pub fn unregister(&self, key: &str) -> Option<NativeFn> {
        self.functions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Look up the callable under `key`
    pub fn resolve(&self, key: &str) -> Option<NativeFn> {
        self.functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Invoke the callable under `key`
    ///
    /// The table lock is released before the callable runs, so host code may
    /// touch the bridge from inside the call.
    pub fn call(&self, key: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let f = self
            .resolve(key)
            .ok_or_else(|| RuntimeError::MissingHostFunction {
                key: key.to_string(),
            })?;
        f(args)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

impl fmt::Debug for HostFunctionBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunctionBridge")
            .field("keys", &self.keys())
            .finish()
    }
}
