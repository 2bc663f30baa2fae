//! The client session: request issuer, pending-operation registry, and
//! event router.

use crate::bus::{
    BusTransport, BusValue, Dispatch, MethodCall, Signal, ADDRESS_RESOLVER_INTERFACE,
    HOST_NAME_RESOLVER_INTERFACE, MEMBER_FOUND, MEMBER_FREE, MEMBER_TIMEOUT,
    SERVER_INTERFACE, SERVER_PATH, SERVICE_RESOLVER_INTERFACE,
};
use crate::event::{
    decode_address_found, decode_host_name_found, decode_service_found, AddressEvent,
    HostNameEvent, ServiceEvent,
};
use crate::resolver::{AddressResolver, HostNameResolver, ResolveHandler, ServiceResolver};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use zeroconfd_core::error::ProtocolError;
use zeroconfd_core::{Address, Error, IfIndex, Protocol, Result};

/// Resolver kinds; selects the registry and the daemon-side interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Service,
    HostName,
    Address,
}

impl Kind {
    pub(crate) fn interface(self) -> &'static str {
        match self {
            Kind::Service => SERVICE_RESOLVER_INTERFACE,
            Kind::HostName => HOST_NAME_RESOLVER_INTERFACE,
            Kind::Address => ADDRESS_RESOLVER_INTERFACE,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Kind::Service => "service",
            Kind::HostName => "host-name",
            Kind::Address => "address",
        }
    }
}

type Registry<E> = Mutex<HashMap<String, Arc<dyn ResolveHandler<E>>>>;

pub(crate) struct ClientInner<T: BusTransport> {
    transport: T,
    connected: AtomicBool,
    request_timeout: Option<Duration>,
    service: Registry<ServiceEvent>,
    host_name: Registry<HostNameEvent>,
    address: Registry<AddressEvent>,
}

impl<T: BusTransport> ClientInner<T> {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn call_with_timeout(&self, call: MethodCall) -> Result<crate::bus::Reply> {
        match self.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.transport.call(call)).await {
                Ok(reply) => Ok(reply?),
                Err(_) => Err(Error::Transport(format!(
                    "round trip did not complete within {limit:?}"
                ))),
            },
            None => Ok(self.transport.call(call).await?),
        }
    }

    /// One blocking round trip to the server object; the reply must carry
    /// a single object-path handle.
    async fn create(&self, member: &'static str, args: Vec<BusValue>) -> Result<String> {
        if !self.is_connected() {
            return Err(Error::BadState);
        }

        let reply = self
            .call_with_timeout(MethodCall {
                path: SERVER_PATH.to_string(),
                interface: SERVER_INTERFACE.to_string(),
                member: member.to_string(),
                args,
            })
            .await?;

        match reply.args.first() {
            Some(BusValue::ObjectPath(path)) if !path.is_empty() => Ok(path.clone()),
            _ => Err(Error::Protocol(ProtocolError::MissingHandle)),
        }
    }

    fn remove(&self, kind: Kind, handle: &str) -> bool {
        match kind {
            Kind::Service => self.service.lock().remove(handle).is_some(),
            Kind::HostName => self.host_name.lock().remove(handle).is_some(),
            Kind::Address => self.address.lock().remove(handle).is_some(),
        }
    }

    pub(crate) async fn release(&self, kind: Kind, handle: &str) -> Result<()> {
        // Remove first: once release has begun, no event may be dispatched
        // to this operation.
        if !self.remove(kind, handle) {
            debug!(handle, kind = kind.name(), "released resolver was not registered");
        }

        if !self.is_connected() {
            return Ok(());
        }

        // Best-effort; the outcome is reported to the caller but the local
        // teardown above stands regardless.
        self.call_with_timeout(MethodCall {
            path: handle.to_string(),
            interface: kind.interface().to_string(),
            member: MEMBER_FREE.to_string(),
            args: Vec::new(),
        })
        .await
        .map(|_| ())
    }
}

fn register<E>(
    registry: &Registry<E>,
    handle: String,
    handler: Arc<dyn ResolveHandler<E>>,
) -> Result<()> {
    let mut registry = registry.lock();
    if registry.contains_key(&handle) {
        return Err(Error::Protocol(ProtocolError::DuplicateHandle(handle)));
    }
    registry.insert(handle, handler);
    Ok(())
}

/// Route one signal to the pending operation its path names.
///
/// The registry lock is released before the handler runs, so a handler may
/// release its own resolver without deadlocking.
fn route<E>(
    registry: &Registry<E>,
    kind: Kind,
    signal: &Signal,
    decode: impl FnOnce(&[BusValue]) -> Result<E>,
) -> Dispatch {
    let handler = {
        let registry = registry.lock();
        match registry.get(&signal.path) {
            Some(handler) => Arc::clone(handler),
            None => {
                debug!(
                    path = %signal.path,
                    kind = kind.name(),
                    "no pending resolver for signal"
                );
                return Dispatch::NotHandled;
            }
        }
    };

    let event = match decode(&signal.args) {
        Ok(event) => event,
        Err(error) => {
            warn!(
                %error,
                path = %signal.path,
                kind = kind.name(),
                "dropping malformed resolver event"
            );
            return Dispatch::NotHandled;
        }
    };

    handler.on_event(event);
    Dispatch::Handled
}

/// A session with the resolution daemon.
///
/// Owns one registry of pending operations per resolver kind. Creation and
/// release suspend the calling task for one bus round trip; signal routing
/// is synchronous and never suspends.
pub struct Client<T: BusTransport> {
    inner: Arc<ClientInner<T>>,
}

impl<T: BusTransport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Client {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: BusTransport> Client<T> {
    /// Create a session over an established bus connection.
    ///
    /// Round trips wait indefinitely; see
    /// [`with_request_timeout`](Self::with_request_timeout) to bound them.
    pub fn new(transport: T) -> Self {
        Self::build(transport, None)
    }

    /// Create a session whose create/release round trips are abandoned
    /// with a transport error after `timeout`. An abandoned creation
    /// leaves no registry entry behind.
    pub fn with_request_timeout(transport: T, timeout: Duration) -> Self {
        Self::build(transport, Some(timeout))
    }

    fn build(transport: T, request_timeout: Option<Duration>) -> Self {
        Client {
            inner: Arc::new(ClientInner {
                transport,
                connected: AtomicBool::new(true),
                request_timeout,
                service: Mutex::new(HashMap::new()),
                host_name: Mutex::new(HashMap::new()),
                address: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    /// Mark the session disconnected. Called by the embedding application
    /// when the bus connection drops; subsequent creations fail with
    /// [`Error::BadState`] and releases skip the remote call.
    pub fn set_disconnected(&self) {
        self.inner.connected.store(false, Ordering::SeqCst);
    }

    /// Number of operations currently awaiting daemon events, across all
    /// resolver kinds.
    pub fn pending_operations(&self) -> usize {
        self.inner.service.lock().len()
            + self.inner.host_name.lock().len()
            + self.inner.address.lock().len()
    }

    /// Resolve a named service instance to host, address, port, and TXT
    /// metadata.
    ///
    /// `domain` of `None` leaves the choice to the daemon; `aprotocol`
    /// selects the family of the resolved target address.
    pub async fn resolve_service(
        &self,
        ifindex: IfIndex,
        protocol: Protocol,
        name: &str,
        service_type: &str,
        domain: Option<&str>,
        aprotocol: Protocol,
        handler: impl ResolveHandler<ServiceEvent> + 'static,
    ) -> Result<ServiceResolver<T>> {
        if name.is_empty() {
            return Err(Error::EmptyArgument("name"));
        }
        if service_type.is_empty() {
            return Err(Error::EmptyArgument("service_type"));
        }

        let handle = self
            .inner
            .create(
                "ServiceResolverNew",
                vec![
                    BusValue::I32(ifindex.0),
                    BusValue::I32(protocol.to_raw()),
                    BusValue::Str(name.to_string()),
                    BusValue::Str(service_type.to_string()),
                    BusValue::Str(domain.unwrap_or("").to_string()),
                    BusValue::I32(aprotocol.to_raw()),
                ],
            )
            .await?;

        register(&self.inner.service, handle.clone(), Arc::new(handler))?;
        trace!(handle = %handle, name, service_type, "service resolver created");
        Ok(ServiceResolver::new(Arc::clone(&self.inner), handle))
    }

    /// Resolve a hostname to an address of the `aprotocol` family.
    pub async fn resolve_host_name(
        &self,
        ifindex: IfIndex,
        protocol: Protocol,
        name: &str,
        aprotocol: Protocol,
        handler: impl ResolveHandler<HostNameEvent> + 'static,
    ) -> Result<HostNameResolver<T>> {
        if name.is_empty() {
            return Err(Error::EmptyArgument("name"));
        }

        let handle = self
            .inner
            .create(
                "HostNameResolverNew",
                vec![
                    BusValue::I32(ifindex.0),
                    BusValue::I32(protocol.to_raw()),
                    BusValue::Str(name.to_string()),
                    BusValue::I32(aprotocol.to_raw()),
                ],
            )
            .await?;

        register(&self.inner.host_name, handle.clone(), Arc::new(handler))?;
        trace!(handle = %handle, name, "host name resolver created");
        Ok(HostNameResolver::new(Arc::clone(&self.inner), handle))
    }

    /// Reverse-resolve a structured address to a hostname.
    pub async fn resolve_address(
        &self,
        ifindex: IfIndex,
        protocol: Protocol,
        address: &Address,
        handler: impl ResolveHandler<AddressEvent> + 'static,
    ) -> Result<AddressResolver<T>> {
        self.resolve_address_str(ifindex, protocol, &address.to_string(), handler)
            .await
    }

    /// Reverse-resolve a presentation-form address string.
    ///
    /// The text must be a valid numeric address of either family; it is
    /// rejected with [`Error::InvalidAddress`] before any bus traffic.
    pub async fn resolve_address_str(
        &self,
        ifindex: IfIndex,
        protocol: Protocol,
        address: &str,
        handler: impl ResolveHandler<AddressEvent> + 'static,
    ) -> Result<AddressResolver<T>> {
        Address::parse(address, Protocol::Unspec)?;

        let handle = self
            .inner
            .create(
                "AddressResolverNew",
                vec![
                    BusValue::I32(ifindex.0),
                    BusValue::I32(protocol.to_raw()),
                    BusValue::Str(address.to_string()),
                ],
            )
            .await?;

        register(&self.inner.address, handle.clone(), Arc::new(handler))?;
        trace!(handle = %handle, address, "address resolver created");
        Ok(AddressResolver::new(Arc::clone(&self.inner), handle))
    }

    /// Route one inbound notification to the pending operation it
    /// addresses.
    ///
    /// Returns [`Dispatch::NotHandled`] for signals this client does not
    /// recognize — unknown interface or member, no pending operation with
    /// the signal's path, or a payload that fails to decode — so the
    /// external dispatch layer can attempt other routing. The matched
    /// operation's handler is invoked exactly once, synchronously, and the
    /// registry is never modified on this path.
    pub fn handle_signal(&self, signal: &Signal) -> Dispatch {
        let found = match signal.member.as_str() {
            MEMBER_FOUND => true,
            MEMBER_TIMEOUT => false,
            _ => return Dispatch::NotHandled,
        };

        match signal.interface.as_str() {
            SERVICE_RESOLVER_INTERFACE => {
                route(&self.inner.service, Kind::Service, signal, |args| {
                    if found {
                        decode_service_found(args).map(ServiceEvent::Found)
                    } else {
                        Ok(ServiceEvent::Timeout)
                    }
                })
            }
            HOST_NAME_RESOLVER_INTERFACE => {
                route(&self.inner.host_name, Kind::HostName, signal, |args| {
                    if found {
                        decode_host_name_found(args).map(HostNameEvent::Found)
                    } else {
                        Ok(HostNameEvent::Timeout)
                    }
                })
            }
            ADDRESS_RESOLVER_INTERFACE => {
                route(&self.inner.address, Kind::Address, signal, |args| {
                    if found {
                        decode_address_found(args).map(AddressEvent::Found)
                    } else {
                        Ok(AddressEvent::Timeout)
                    }
                })
            }
            _ => Dispatch::NotHandled,
        }
    }
}
