//! Typed resolver events and the payload decoders that produce them.
//!
//! Every decoder fails closed: a wrong argument count, a wrong argument
//! type, or an address that does not parse under its declared family
//! rejects the whole event instead of delivering partial data. A rejected
//! event is recoverable (the signal is reported as not handled); it is
//! never surfaced through the caller's resolution callback.

use crate::bus::BusValue;
use zeroconfd_core::error::ProtocolError;
use zeroconfd_core::{Address, Error, IfIndex, Protocol, TxtList, TxtRecord};

/// Successful service resolution result.
#[derive(Debug, Clone)]
pub struct ServiceFound {
    pub ifindex: IfIndex,
    pub protocol: Protocol,
    pub name: String,
    pub service_type: String,
    pub domain: String,
    pub host: String,
    pub address: Address,
    pub port: u16,
    /// Auxiliary metadata records, order-preserving.
    pub txt: TxtList,
}

/// Successful hostname resolution result.
#[derive(Debug, Clone)]
pub struct HostNameFound {
    pub ifindex: IfIndex,
    pub protocol: Protocol,
    pub name: String,
    pub address: Address,
}

/// Successful reverse-address resolution result.
#[derive(Debug, Clone)]
pub struct AddressFound {
    pub ifindex: IfIndex,
    pub protocol: Protocol,
    /// The queried address, carried back for symmetry; the resolved
    /// `name` is the authoritative output.
    pub address: Address,
    pub name: String,
}

/// Event delivered to a service resolver handler.
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    Found(ServiceFound),
    /// The daemon gave up without a result. Terminal from the caller's
    /// perspective, though the operation stays registered until released.
    Timeout,
}

/// Event delivered to a hostname resolver handler.
#[derive(Debug, Clone)]
pub enum HostNameEvent {
    Found(HostNameFound),
    Timeout,
}

/// Event delivered to an address resolver handler.
#[derive(Debug, Clone)]
pub enum AddressEvent {
    Found(AddressFound),
    Timeout,
}

impl ServiceEvent {
    pub fn found(&self) -> Option<&ServiceFound> {
        match self {
            ServiceEvent::Found(f) => Some(f),
            ServiceEvent::Timeout => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ServiceEvent::Timeout)
    }
}

impl HostNameEvent {
    pub fn found(&self) -> Option<&HostNameFound> {
        match self {
            HostNameEvent::Found(f) => Some(f),
            HostNameEvent::Timeout => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HostNameEvent::Timeout)
    }
}

impl AddressEvent {
    pub fn found(&self) -> Option<&AddressFound> {
        match self {
            AddressEvent::Found(f) => Some(f),
            AddressEvent::Timeout => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AddressEvent::Timeout)
    }
}

fn expect_args(args: &[BusValue], expected: usize) -> Result<(), ProtocolError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ProtocolError::ArgumentCount {
            expected,
            actual: args.len(),
        })
    }
}

fn arg_i32(args: &[BusValue], index: usize) -> Result<i32, ProtocolError> {
    args[index].as_i32().ok_or(ProtocolError::ArgumentType {
        index,
        expected: "int32",
    })
}

fn arg_u16(args: &[BusValue], index: usize) -> Result<u16, ProtocolError> {
    args[index].as_u16().ok_or(ProtocolError::ArgumentType {
        index,
        expected: "uint16",
    })
}

fn arg_str(args: &[BusValue], index: usize) -> Result<&str, ProtocolError> {
    args[index].as_str().ok_or(ProtocolError::ArgumentType {
        index,
        expected: "string",
    })
}

fn arg_byte_arrays(args: &[BusValue], index: usize) -> Result<&[Vec<u8>], ProtocolError> {
    args[index]
        .as_byte_arrays()
        .ok_or(ProtocolError::ArgumentType {
            index,
            expected: "array of byte arrays",
        })
}

/// Decode a service resolver `Found` signal payload.
///
/// Wire shape: interface, protocol, name, type, domain, host, aprotocol,
/// address, port, TXT records.
pub(crate) fn decode_service_found(args: &[BusValue]) -> Result<ServiceFound, Error> {
    expect_args(args, 10)?;

    let ifindex = IfIndex(arg_i32(args, 0)?);
    let protocol = Protocol::from_raw(arg_i32(args, 1)?)?;
    let name = arg_str(args, 2)?.to_string();
    let service_type = arg_str(args, 3)?.to_string();
    let domain = arg_str(args, 4)?.to_string();
    let host = arg_str(args, 5)?.to_string();
    let aprotocol = Protocol::from_raw(arg_i32(args, 6)?)?;
    let address = Address::parse(arg_str(args, 7)?, aprotocol)?;
    let port = arg_u16(args, 8)?;
    let txt: TxtList = arg_byte_arrays(args, 9)?
        .iter()
        .map(|bytes| TxtRecord::new(bytes.clone()))
        .collect();

    Ok(ServiceFound {
        ifindex,
        protocol,
        name,
        service_type,
        domain,
        host,
        address,
        port,
        txt,
    })
}

/// Decode a hostname resolver `Found` signal payload.
///
/// Wire shape: interface, protocol, name, aprotocol, address.
pub(crate) fn decode_host_name_found(args: &[BusValue]) -> Result<HostNameFound, Error> {
    expect_args(args, 5)?;

    let ifindex = IfIndex(arg_i32(args, 0)?);
    let protocol = Protocol::from_raw(arg_i32(args, 1)?)?;
    let name = arg_str(args, 2)?.to_string();
    let aprotocol = Protocol::from_raw(arg_i32(args, 3)?)?;
    let address = Address::parse(arg_str(args, 4)?, aprotocol)?;

    Ok(HostNameFound {
        ifindex,
        protocol,
        name,
        address,
    })
}

/// Decode an address resolver `Found` signal payload.
///
/// Wire shape: interface, protocol, aprotocol, address, name.
pub(crate) fn decode_address_found(args: &[BusValue]) -> Result<AddressFound, Error> {
    expect_args(args, 5)?;

    let ifindex = IfIndex(arg_i32(args, 0)?);
    let protocol = Protocol::from_raw(arg_i32(args, 1)?)?;
    let aprotocol = Protocol::from_raw(arg_i32(args, 2)?)?;
    let address = Address::parse(arg_str(args, 3)?, aprotocol)?;
    let name = arg_str(args, 4)?.to_string();

    Ok(AddressFound {
        ifindex,
        protocol,
        address,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_args() -> Vec<BusValue> {
        vec![
            BusValue::I32(2),
            BusValue::I32(0),
            BusValue::Str("Laser Printer".into()),
            BusValue::Str("_ipp._tcp".into()),
            BusValue::Str("local".into()),
            BusValue::Str("printer.local".into()),
            BusValue::I32(0),
            BusValue::Str("192.0.2.5".into()),
            BusValue::U16(631),
            BusValue::ByteArrays(vec![b"path=/queue".to_vec(), vec![], b"duplex".to_vec()]),
        ]
    }

    mod service {
        use super::*;

        #[test]
        fn decodes_well_formed_payload() {
            let found = decode_service_found(&service_args()).unwrap();
            assert_eq!(found.ifindex, IfIndex(2));
            assert_eq!(found.protocol, Protocol::Inet);
            assert_eq!(found.name, "Laser Printer");
            assert_eq!(found.service_type, "_ipp._tcp");
            assert_eq!(found.domain, "local");
            assert_eq!(found.host, "printer.local");
            assert_eq!(found.address.to_string(), "192.0.2.5");
            assert_eq!(found.port, 631);
        }

        #[test]
        fn txt_records_preserve_count_order_and_bytes() {
            let found = decode_service_found(&service_args()).unwrap();
            assert_eq!(found.txt.len(), 3);
            let records: Vec<&[u8]> = found.txt.iter().map(|r| r.as_bytes()).collect();
            assert_eq!(
                records,
                vec![b"path=/queue".as_slice(), b"".as_slice(), b"duplex".as_slice()]
            );
        }

        #[test]
        fn empty_txt_list_decodes_to_zero_records() {
            let mut args = service_args();
            args[9] = BusValue::ByteArrays(vec![]);
            let found = decode_service_found(&args).unwrap();
            assert!(found.txt.is_empty());
        }

        #[test]
        fn wrong_argument_count_rejected() {
            let mut args = service_args();
            args.pop();
            assert!(matches!(
                decode_service_found(&args),
                Err(Error::Protocol(ProtocolError::ArgumentCount {
                    expected: 10,
                    actual: 9
                }))
            ));
        }

        #[test]
        fn wrong_argument_type_rejected() {
            let mut args = service_args();
            args[8] = BusValue::Str("631".into());
            assert!(matches!(
                decode_service_found(&args),
                Err(Error::Protocol(ProtocolError::ArgumentType { index: 8, .. }))
            ));
        }

        #[test]
        fn address_family_mismatch_rejected() {
            let mut args = service_args();
            // Declared family says IPv6, text is dotted-quad
            args[6] = BusValue::I32(1);
            assert!(matches!(
                decode_service_found(&args),
                Err(Error::InvalidAddress(_))
            ));
        }

        #[test]
        fn unknown_protocol_family_rejected() {
            let mut args = service_args();
            args[1] = BusValue::I32(9);
            assert!(matches!(
                decode_service_found(&args),
                Err(Error::Protocol(ProtocolError::UnknownProtocol(9)))
            ));
        }
    }

    mod host_name {
        use super::*;

        #[test]
        fn decodes_well_formed_payload() {
            let args = vec![
                BusValue::I32(-1),
                BusValue::I32(-1),
                BusValue::Str("printer.local".into()),
                BusValue::I32(1),
                BusValue::Str("2001:db8::7".into()),
            ];
            let found = decode_host_name_found(&args).unwrap();
            assert_eq!(found.ifindex, IfIndex::UNSPEC);
            assert_eq!(found.protocol, Protocol::Unspec);
            assert_eq!(found.name, "printer.local");
            assert_eq!(found.address.protocol(), Protocol::Inet6);
        }

        #[test]
        fn malformed_address_rejected() {
            let args = vec![
                BusValue::I32(0),
                BusValue::I32(0),
                BusValue::Str("printer.local".into()),
                BusValue::I32(0),
                BusValue::Str("not-an-address".into()),
            ];
            assert!(matches!(
                decode_host_name_found(&args),
                Err(Error::InvalidAddress(_))
            ));
        }
    }

    mod address {
        use super::*;

        #[test]
        fn decodes_well_formed_payload() {
            let args = vec![
                BusValue::I32(3),
                BusValue::I32(0),
                BusValue::I32(0),
                BusValue::Str("192.0.2.9".into()),
                BusValue::Str("printer.local".into()),
            ];
            let found = decode_address_found(&args).unwrap();
            assert_eq!(found.ifindex, IfIndex(3));
            assert_eq!(found.name, "printer.local");
            assert_eq!(found.address.to_string(), "192.0.2.9");
        }

        #[test]
        fn malformed_address_rejected() {
            let args = vec![
                BusValue::I32(0),
                BusValue::I32(0),
                BusValue::I32(0),
                BusValue::Str("not-an-address".into()),
                BusValue::Str("printer.local".into()),
            ];
            assert!(matches!(
                decode_address_found(&args),
                Err(Error::InvalidAddress(_))
            ));
        }
    }
}
