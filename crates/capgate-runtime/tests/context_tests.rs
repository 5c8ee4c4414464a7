//! Sandbox context tests
//!
//! Contexts built from configuration files, host services, and auditing.

mod common;

use capgate_config::ConfigLoader;
use capgate_runtime::capability::CapabilityError;
use capgate_runtime::context::{ContextError, ContextOptions, HostServices, SandboxContext};
use capgate_runtime::global::{GlobalNamespace, PropertyDescriptor};
use capgate_runtime::net::Transport;
use capgate_runtime::security::{AuditEvent, AuditLogger, MemoryAuditLogger};
use capgate_runtime::value::{RuntimeError, Value};
use capgate_runtime::ConsoleMode;
use common::recording_bridge;
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct EchoTransport;

impl Transport for EchoTransport {
    fn connect(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        Ok(Value::array(args.to_vec()))
    }
    fn listen(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        Ok(Value::array(args.to_vec()))
    }
    fn connect_tls(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        Ok(Value::array(args.to_vec()))
    }
    fn listen_tls(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        Ok(Value::array(args.to_vec()))
    }
    fn start_tls(&self, _args: &[Value]) -> Result<Value, RuntimeError> {
        Err(RuntimeError::host("not connected"))
    }
}

fn options_from(content: &str) -> ContextOptions {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("capgate.toml"), content).unwrap();

    let mut loader = ConfigLoader::with_global_path(temp_dir.path().join("no-global.toml"));
    let config = loader.load_from_directory(temp_dir.path()).unwrap();
    ContextOptions::from_config(&config)
}

#[test]
fn test_empty_config_is_sandboxed() {
    let options = options_from("");
    assert_eq!(options, ContextOptions::default());

    let context = SandboxContext::new(options, HostServices::new()).unwrap();
    assert_eq!(context.capabilities(), &["console"]);
}

#[test]
fn test_forward_config_routes_console_to_host() {
    let options = options_from(
        r#"
[console]
mode = "forward"
"#,
    );
    assert_eq!(options.console, ConsoleMode::Forward);

    let (bridge, log) = recording_bridge();
    let context = SandboxContext::new(options, HostServices::new().with_bridge(bridge)).unwrap();

    context
        .global()
        .resolve("console")
        .unwrap()
        .member("warn")
        .unwrap()
        .call(&[Value::string("careful"), Value::Number(7.0)])
        .unwrap();

    assert_eq!(log.lines(), vec!["careful 7".to_string()]);
}

#[test]
fn test_network_config_exposes_transport() {
    let options = options_from(
        r#"
[network]
enabled = true
"#,
    );
    let host = HostServices::new().with_transport(Arc::new(EchoTransport));
    let context = SandboxContext::new(options, host).unwrap();

    assert_eq!(context.capabilities(), &["console", "net", "tls"]);
    assert_eq!(context.global().keys().count(), 0);

    let net = context.global().resolve("net").unwrap();
    let args = [Value::string("db.internal"), Value::Number(5432.0)];
    assert_eq!(
        net.member("connect").unwrap().call(&args).unwrap(),
        Value::array(args.to_vec())
    );

    let tls = context.global().resolve("tls").unwrap();
    assert_eq!(
        tls.member("startTls").unwrap().call(&[]).unwrap_err(),
        RuntimeError::host("not connected")
    );
}

#[test]
fn test_network_config_without_transport_fails() {
    let options = options_from("[network]\nenabled = true\n");
    assert_eq!(
        SandboxContext::new(options, HostServices::new()).unwrap_err(),
        ContextError::TransportRequired
    );
}

#[test]
fn test_guest_cannot_rebind_capabilities() {
    let mut context = SandboxContext::sandboxed().unwrap();
    let console = context.global().resolve("console").unwrap();

    assert!(context.global_mut().set("console", Value::Null).is_err());
    assert!(context.global_mut().delete("console").is_err());
    assert!(context
        .global()
        .resolve("console")
        .unwrap()
        .same_value(&console));
}

#[test]
fn test_missing_host_function_is_audited() {
    let logger = Arc::new(MemoryAuditLogger::new());
    let options = ContextOptions::default()
        .with_console(ConsoleMode::Forward)
        .with_audit(true);
    let host = HostServices::new()
        .with_bridge(Arc::new(capgate_runtime::HostFunctionBridge::new()))
        .with_audit_logger(logger.clone());

    let context = SandboxContext::new(options, host).unwrap();
    logger.clear();

    let err = context
        .global()
        .resolve("console")
        .unwrap()
        .member("log")
        .unwrap()
        .call(&[Value::string("nobody listening")])
        .unwrap_err();

    assert_eq!(
        err,
        RuntimeError::MissingHostFunction {
            key: "console.log".to_string()
        }
    );
    assert_eq!(
        logger
            .entries()
            .into_iter()
            .map(|entry| entry.event)
            .collect::<Vec<_>>(),
        vec![AuditEvent::HostFunctionMissing {
            key: "console.log".to_string()
        }]
    );
}

#[test]
fn test_audit_entries_serialize_as_json_lines() {
    let logger = Arc::new(MemoryAuditLogger::new());
    let host = HostServices::new().with_audit_logger(logger.clone());
    let context = SandboxContext::new(ContextOptions::default().with_audit(true), host).unwrap();

    let entries = logger.entries();
    let created = entries.last().unwrap().to_json_line().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&created).unwrap();

    assert_eq!(parsed["event"], "context_created");
    assert_eq!(parsed["context_id"], context.id().to_string());
    assert_eq!(parsed["capabilities"], serde_json::json!(["console"]));
}

// ============================================================================
// Engine-Seeded Namespaces
// ============================================================================

fn engine_global_with_fixed_tls() -> GlobalNamespace {
    let mut global = GlobalNamespace::new();
    global
        .define_own_property(
            "tls",
            PropertyDescriptor::fixed_hidden(Value::string("engine tls")),
        )
        .unwrap();
    global
}

#[test]
fn test_fixed_engine_global_aborts_construction() {
    let logger = Arc::new(MemoryAuditLogger::new());
    let options = ContextOptions::default().with_network(true).with_audit(true);
    let host = HostServices::new()
        .with_transport(Arc::new(EchoTransport))
        .with_audit_logger(logger.clone());

    let err = SandboxContext::new_in(engine_global_with_fixed_tls(), options, host).unwrap_err();

    assert_eq!(
        err,
        ContextError::Capability(CapabilityError::Collision {
            name: "tls".to_string()
        })
    );
    assert_eq!(
        err.to_string(),
        "Capability 'tls' collides with an existing fixed global"
    );
    // No context came into existence, so no creation or destruction events
    assert_eq!(
        logger
            .entries()
            .into_iter()
            .map(|entry| entry.event)
            .collect::<Vec<_>>(),
        vec![AuditEvent::CapabilityCollision {
            name: "tls".to_string()
        }]
    );
}

#[test]
fn test_sandboxed_context_ignores_unrelated_fixed_global() {
    // Without network, `tls` is not requested and cannot collide
    let context = SandboxContext::new_in(
        engine_global_with_fixed_tls(),
        ContextOptions::default(),
        HostServices::new(),
    )
    .unwrap();

    assert_eq!(context.capabilities(), &["console"]);
    assert_eq!(
        context.global().resolve("tls").unwrap(),
        Value::string("engine tls")
    );
}

#[test]
fn test_engine_console_is_replaced_and_other_globals_kept() {
    let mut global = GlobalNamespace::new();
    global.set("console", Value::string("engine console")).unwrap();
    global.set("version", Value::Number(3.0)).unwrap();

    let context =
        SandboxContext::new_in(global, ContextOptions::default(), HostServices::new()).unwrap();

    assert!(context
        .global()
        .resolve("console")
        .unwrap()
        .member("log")
        .is_some());
    assert_eq!(context.global().keys().collect::<Vec<_>>(), vec!["version"]);
}
