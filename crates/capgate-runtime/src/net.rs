//! Network capability module
//!
//! Re-exports the transport layer's public surface under the reserved global
//! names `net` and `tls`. Nothing is wrapped, filtered or checked here: guest
//! arguments reach the transport verbatim and its results and errors come
//! back unchanged. This module only scopes the surface under two names.
//!
//! Hosts either hand over two ready-made namespace objects
//! ([`NetworkModule::new`]) or implement [`Transport`] and let the module
//! project it onto `net { connect, listen }` and
//! `tls { connect, listen, startTls }` ([`NetworkModule::from_transport`]).

use crate::api::NativeFunctionBuilder;
use crate::capability::{CapabilityError, NET, TLS};
use crate::value::{RuntimeError, Value};
use std::fmt;
use std::sync::Arc;

/// Operations of the underlying transport layer
///
/// Argument and result shapes belong to the transport; they are passed
/// through untouched.
pub trait Transport: Send + Sync {
    /// Open a plain connection
    fn connect(&self, args: &[Value]) -> Result<Value, RuntimeError>;

    /// Listen for plain connections
    fn listen(&self, args: &[Value]) -> Result<Value, RuntimeError>;

    /// Open a TLS connection
    fn connect_tls(&self, args: &[Value]) -> Result<Value, RuntimeError>;

    /// Listen for TLS connections
    fn listen_tls(&self, args: &[Value]) -> Result<Value, RuntimeError>;

    /// Upgrade an established plain connection to TLS
    fn start_tls(&self, args: &[Value]) -> Result<Value, RuntimeError>;
}

/// The `net` / `tls` capability pair
#[derive(Clone)]
pub struct NetworkModule {
    net: Value,
    tls: Value,
}

impl NetworkModule {
    /// Use two existing namespace objects as-is
    pub fn new(net: Value, tls: Value) -> Result<Self, CapabilityError> {
        ensure_namespace(NET, &net)?;
        ensure_namespace(TLS, &tls)?;
        Ok(Self { net, tls })
    }

    /// Project a transport implementation onto `net` and `tls`
    pub fn from_transport(transport: Arc<dyn Transport>) -> Self {
        let net = Value::object([
            ("connect", pass_through(&transport, NET, "connect", |t, args| t.connect(args))),
            ("listen", pass_through(&transport, NET, "listen", |t, args| t.listen(args))),
        ]);
        let tls = Value::object([
            ("connect", pass_through(&transport, TLS, "connect", |t, args| t.connect_tls(args))),
            ("listen", pass_through(&transport, TLS, "listen", |t, args| t.listen_tls(args))),
            ("startTls", pass_through(&transport, TLS, "startTls", |t, args| t.start_tls(args))),
        ]);
        Self { net, tls }
    }

    /// The `net` namespace object
    pub fn net(&self) -> Value {
        self.net.clone()
    }

    /// The `tls` namespace object
    pub fn tls(&self) -> Value {
        self.tls.clone()
    }
}

impl fmt::Debug for NetworkModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkModule")
            .field("net", &self.net)
            .field("tls", &self.tls)
            .finish()
    }
}

fn ensure_namespace(name: &str, value: &Value) -> Result<(), CapabilityError> {
    match value {
        Value::Object(_) => Ok(()),
        other => Err(CapabilityError::InvalidCapability {
            name: name.to_string(),
            reason: format!("expected a namespace object, got {}", other.type_name()),
        }),
    }
}

/// Variadic member `namespace.member` forwarding to one transport operation
fn pass_through<F>(transport: &Arc<dyn Transport>, namespace: &str, member: &str, op: F) -> Value
where
    F: Fn(&dyn Transport, &[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    let transport = Arc::clone(transport);
    NativeFunctionBuilder::new(format!("{}.{}", namespace, member))
        .variadic()
        .build(move |args| op(transport.as_ref(), args))
}
