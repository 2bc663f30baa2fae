//! Protocol families, interface indexes, and structured addresses.

use crate::error::{Error, ProtocolError};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Protocol family as carried on the wire (signed 32-bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Protocol {
    /// Either family; lets the daemon choose.
    Unspec = -1,
    /// IPv4.
    Inet = 0,
    /// IPv6.
    Inet6 = 1,
}

impl Protocol {
    /// Decode the wire representation, rejecting unknown values.
    pub fn from_raw(raw: i32) -> Result<Self, ProtocolError> {
        match raw {
            -1 => Ok(Protocol::Unspec),
            0 => Ok(Protocol::Inet),
            1 => Ok(Protocol::Inet6),
            other => Err(ProtocolError::UnknownProtocol(other)),
        }
    }

    pub fn to_raw(self) -> i32 {
        self as i32
    }
}

/// Network interface index. `UNSPEC` lets the daemon pick the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IfIndex(pub i32);

impl IfIndex {
    pub const UNSPEC: IfIndex = IfIndex(-1);
}

impl fmt::Display for IfIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A structured address value.
///
/// Always holds a valid numeric address; `Display` renders the presentation
/// form (dotted-quad or colon-hex), and format -> parse -> format is the
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    ip: IpAddr,
}

impl Address {
    /// Parse presentation-form text under a declared protocol family.
    ///
    /// `Inet` accepts dotted-quad only, `Inet6` colon-hex only, `Unspec`
    /// either. Text that does not parse under the declared family is
    /// rejected rather than reinterpreted.
    pub fn parse(text: &str, protocol: Protocol) -> Result<Self, Error> {
        let ip = IpAddr::from_str(text)
            .map_err(|_| Error::InvalidAddress(text.to_string()))?;

        match (protocol, ip) {
            (Protocol::Unspec, _)
            | (Protocol::Inet, IpAddr::V4(_))
            | (Protocol::Inet6, IpAddr::V6(_)) => Ok(Address { ip }),
            _ => Err(Error::InvalidAddress(format!(
                "{text} is not a member of the declared family"
            ))),
        }
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// The family this address actually belongs to (never `Unspec`).
    pub fn protocol(&self) -> Protocol {
        match self.ip {
            IpAddr::V4(_) => Protocol::Inet,
            IpAddr::V6(_) => Protocol::Inet6,
        }
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        Address { ip }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ip)
    }
}
