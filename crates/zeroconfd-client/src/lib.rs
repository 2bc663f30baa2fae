//! # zeroconfd-client
//!
//! Client library for the zeroconfd resolution daemon, which is reachable
//! only through an inter-process message bus owned by the embedding
//! application.
//!
//! This crate provides:
//! - A [`Client`] session that issues resolution requests and tracks the
//!   pending operations the daemon has acknowledged
//! - Service, hostname, and reverse-address resolvers
//! - Routing of asynchronous daemon notifications back to the right
//!   pending operation, with typed payload decoding
//!
//! The bus connection itself is an external collaborator: the embedding
//! application implements [`BusTransport`] for its connection and feeds
//! inbound signals into [`Client::handle_signal`] from its dispatch loop.
//!
//! ## Example
//!
//! ```ignore
//! use zeroconfd_client::{Client, HostNameEvent};
//! use zeroconfd_core::{IfIndex, Protocol};
//!
//! let client = Client::new(transport);
//! let resolver = client
//!     .resolve_host_name(
//!         IfIndex::UNSPEC,
//!         Protocol::Unspec,
//!         "printer.local",
//!         Protocol::Inet,
//!         |event: HostNameEvent| match event {
//!             HostNameEvent::Found(f) => println!("{} is {}", f.name, f.address),
//!             HostNameEvent::Timeout => println!("gave up"),
//!         },
//!     )
//!     .await?;
//! // ... later, from the bus dispatch loop:
//! // client.handle_signal(&signal);
//! resolver.release().await?;
//! ```

pub mod bus;
pub mod client;
pub mod event;
pub mod resolver;

pub use bus::{BusTransport, BusValue, Dispatch, MethodCall, Reply, Signal, TransportError};
pub use client::Client;
pub use event::{
    AddressEvent, AddressFound, HostNameEvent, HostNameFound, ServiceEvent, ServiceFound,
};
pub use resolver::{
    AddressHandler, AddressResolver, HostNameHandler, HostNameResolver, ResolveHandler,
    ServiceHandler, ServiceResolver,
};

pub use zeroconfd_core::{Address, Error, IfIndex, Protocol, Result, TxtList, TxtRecord};
