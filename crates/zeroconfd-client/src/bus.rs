//! Bus message model and the transport seam (enables mocking in tests).
//!
//! The daemon speaks a request/reply protocol plus asynchronous push
//! signals. How the bus connection is established and pumped is the
//! embedding application's business; this module only models the messages
//! that cross the seam.

use async_trait::async_trait;
use thiserror::Error;
use zeroconfd_core::Error;

/// Well-known name the daemon owns on the bus.
pub const DAEMON_BUS_NAME: &str = "org.zeroconf.Daemon";

/// Server-side singleton object every create request is addressed to.
pub const SERVER_PATH: &str = "/";
pub const SERVER_INTERFACE: &str = "org.zeroconf.Daemon.Server";

pub const SERVICE_RESOLVER_INTERFACE: &str = "org.zeroconf.Daemon.ServiceResolver";
pub const HOST_NAME_RESOLVER_INTERFACE: &str = "org.zeroconf.Daemon.HostNameResolver";
pub const ADDRESS_RESOLVER_INTERFACE: &str = "org.zeroconf.Daemon.AddressResolver";

pub const MEMBER_FOUND: &str = "Found";
pub const MEMBER_TIMEOUT: &str = "Timeout";
pub const MEMBER_FREE: &str = "Free";

/// One wire argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusValue {
    I32(i32),
    U16(u16),
    Str(String),
    /// Object-path-style handle text.
    ObjectPath(String),
    /// Array of byte arrays (TXT metadata records).
    ByteArrays(Vec<Vec<u8>>),
}

impl BusValue {
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            BusValue::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            BusValue::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BusValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object_path(&self) -> Option<&str> {
        match self {
            BusValue::ObjectPath(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_byte_arrays(&self) -> Option<&[Vec<u8>]> {
        match self {
            BusValue::ByteArrays(a) => Some(a),
            _ => None,
        }
    }
}

/// An outbound method call addressed to a daemon-side object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub path: String,
    pub interface: String,
    pub member: String,
    pub args: Vec<BusValue>,
}

/// The reply to a method call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub args: Vec<BusValue>,
}

/// An inbound notification, as handed in by the external dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    /// Object path of the daemon-side operation that emitted the signal.
    pub path: String,
    pub interface: String,
    pub member: String,
    pub args: Vec<BusValue>,
}

/// Verdict returned to the external dispatch layer, so it can try other
/// routing for signals this client does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    NotHandled,
}

/// Errors from the bus connection itself.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("bus round trip failed: {0}")]
    Io(String),

    #[error("remote fault {name}: {message}")]
    Remote { name: String, message: String },
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e.to_string())
    }
}

/// Connection to the message bus, implemented by the embedding
/// application.
///
/// The library issues exactly one round trip per [`call`](Self::call); the
/// calling task suspends until the reply or a transport error arrives.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait BusTransport: Send + Sync {
    async fn call(&self, call: MethodCall) -> Result<Reply, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod bus_value {
        use super::*;

        #[test]
        fn accessors_match_variant() {
            assert_eq!(BusValue::I32(-1).as_i32(), Some(-1));
            assert_eq!(BusValue::U16(631).as_u16(), Some(631));
            assert_eq!(BusValue::Str("x".into()).as_str(), Some("x"));
            assert_eq!(
                BusValue::ObjectPath("/s/1".into()).as_object_path(),
                Some("/s/1")
            );
            let arrays = vec![vec![1u8, 2], vec![]];
            assert_eq!(
                BusValue::ByteArrays(arrays.clone()).as_byte_arrays(),
                Some(arrays.as_slice())
            );
        }

        #[test]
        fn accessors_reject_other_variants() {
            assert_eq!(BusValue::Str("7".into()).as_i32(), None);
            assert_eq!(BusValue::I32(631).as_u16(), None);
            assert_eq!(BusValue::ObjectPath("/s/1".into()).as_str(), None);
            assert_eq!(BusValue::Str("/s/1".into()).as_object_path(), None);
            assert_eq!(BusValue::I32(0).as_byte_arrays(), None);
        }
    }

    #[test]
    fn transport_error_maps_to_transport() {
        let err: Error = TransportError::Io("connection reset".into()).into();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.to_string().contains("connection reset"));

        let err: Error = TransportError::Remote {
            name: "org.zeroconf.Error.NotFound".into(),
            message: "no such host".into(),
        }
        .into();
        assert!(err.to_string().contains("no such host"));
    }
}
