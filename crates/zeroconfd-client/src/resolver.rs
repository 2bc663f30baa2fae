//! Resolver handles and their event handlers.
//!
//! The three resolver kinds share one shape: a daemon-assigned handle, a
//! caller-supplied handler invoked once per inbound event, and an explicit
//! release that tears the operation down. `release` consumes the handle
//! object, so releasing twice is unrepresentable.

use crate::bus::BusTransport;
use crate::client::{ClientInner, Kind};
use crate::event::{AddressEvent, HostNameEvent, ServiceEvent};
use std::sync::Arc;
use tracing::debug;
use zeroconfd_core::Result;

/// Handler invoked for every event delivered to one pending operation.
///
/// Implemented for any `Fn(E)` closure; caller context travels in the
/// closure's captures. Handlers run synchronously on the thread that is
/// dispatching bus traffic and must return promptly.
pub trait ResolveHandler<E>: Send + Sync {
    fn on_event(&self, event: E);
}

impl<E, F> ResolveHandler<E> for F
where
    F: Fn(E) + Send + Sync,
{
    fn on_event(&self, event: E) {
        self(event)
    }
}

/// Handler for service resolver events.
pub type ServiceHandler = dyn ResolveHandler<ServiceEvent>;
/// Handler for hostname resolver events.
pub type HostNameHandler = dyn ResolveHandler<HostNameEvent>;
/// Handler for address resolver events.
pub type AddressHandler = dyn ResolveHandler<AddressEvent>;

/// Shared guard state for all resolver kinds.
struct Guard<T: BusTransport> {
    client: Arc<ClientInner<T>>,
    handle: Option<String>,
    kind: Kind,
}

impl<T: BusTransport> Guard<T> {
    fn new(client: Arc<ClientInner<T>>, handle: String, kind: Kind) -> Self {
        Guard {
            client,
            handle: Some(handle),
            kind,
        }
    }

    fn handle(&self) -> &str {
        // The handle is only taken by release, which consumed the guard.
        self.handle.as_deref().unwrap_or("")
    }

    async fn release(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => self.client.release(self.kind, &handle).await,
            None => Ok(()),
        }
    }
}

impl<T: BusTransport> Drop for Guard<T> {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            debug!(
                handle = %handle,
                kind = self.kind.name(),
                "resolver dropped without release; the operation stays pending"
            );
        }
    }
}

/// A pending service resolution, tracked by its daemon-assigned handle
/// until released.
pub struct ServiceResolver<T: BusTransport> {
    guard: Guard<T>,
}

impl<T: BusTransport> ServiceResolver<T> {
    pub(crate) fn new(client: Arc<ClientInner<T>>, handle: String) -> Self {
        ServiceResolver {
            guard: Guard::new(client, handle, Kind::Service),
        }
    }

    /// The daemon-assigned operation handle.
    pub fn handle(&self) -> &str {
        self.guard.handle()
    }

    /// Release the operation.
    ///
    /// The operation is removed from the client's registry before the
    /// best-effort remote `Free` call goes out; that call's outcome is
    /// returned, but the local teardown stands either way.
    pub async fn release(mut self) -> Result<()> {
        self.guard.release().await
    }
}

/// A pending hostname resolution.
pub struct HostNameResolver<T: BusTransport> {
    guard: Guard<T>,
}

impl<T: BusTransport> HostNameResolver<T> {
    pub(crate) fn new(client: Arc<ClientInner<T>>, handle: String) -> Self {
        HostNameResolver {
            guard: Guard::new(client, handle, Kind::HostName),
        }
    }

    /// The daemon-assigned operation handle.
    pub fn handle(&self) -> &str {
        self.guard.handle()
    }

    /// Release the operation. See [`ServiceResolver::release`].
    pub async fn release(mut self) -> Result<()> {
        self.guard.release().await
    }
}

/// A pending reverse-address resolution.
pub struct AddressResolver<T: BusTransport> {
    guard: Guard<T>,
}

impl<T: BusTransport> AddressResolver<T> {
    pub(crate) fn new(client: Arc<ClientInner<T>>, handle: String) -> Self {
        AddressResolver {
            guard: Guard::new(client, handle, Kind::Address),
        }
    }

    /// The daemon-assigned operation handle.
    pub fn handle(&self) -> &str {
        self.guard.handle()
    }

    /// Release the operation. See [`ServiceResolver::release`].
    pub async fn release(mut self) -> Result<()> {
        self.guard.release().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn closures_implement_resolve_handler() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let handler = move |event: ServiceEvent| {
            if event.is_timeout() {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }
        };

        handler.on_event(ServiceEvent::Timeout);
        handler.on_event(ServiceEvent::Timeout);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
