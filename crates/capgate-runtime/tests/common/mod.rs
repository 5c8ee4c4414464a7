//! Shared helpers for integration tests

#![allow(dead_code)]

use capgate_runtime::bridge::{HostFunctionBridge, CONSOLE_LOG_KEY};
use capgate_runtime::value::Value;
use std::sync::{Arc, Mutex};

/// Lines the host received through `"console.log"`
#[derive(Clone, Default)]
pub struct HostLog {
    calls: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl HostLog {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The single string argument of each call, in order
    pub fn lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|args| {
                assert_eq!(args.len(), 1, "console.log takes exactly one argument");
                args[0].as_str().expect("console.log takes a string").to_string()
            })
            .collect()
    }
}

/// Bridge with a recording `"console.log"` entry
pub fn recording_bridge() -> (Arc<HostFunctionBridge>, HostLog) {
    let log = HostLog::default();
    let calls = Arc::clone(&log.calls);
    let bridge = HostFunctionBridge::shared();
    bridge.register(CONSOLE_LOG_KEY, move |args| {
        calls.lock().unwrap().push(args.to_vec());
        Ok(Value::Undefined)
    });
    (bridge, log)
}
