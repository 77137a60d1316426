//! The transport handle: a reference to the remote command endpoint.
//!
//! Medialink does not open, close, or own the communication channel — the
//! handshake layer does. What crosses the wire is only a token
//! ([`HandleRef`]); turning that token back into something callable is the
//! receiving side's job, done through whatever registry it maintains.
//!
//! This module defines the two seams: [`TransportHandle`] (the resolved
//! reference the aggregate stores) and [`HandleResolver`] (how decode gets
//! from token to handle). [`LocalHandle`] and [`HandleTable`] are simple
//! in-process implementations for demos and tests; a real deployment
//! implements the traits over its own endpoint type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use medialink_wire::HandleRef;

/// A resolved reference to the remote session's command-dispatch endpoint.
///
/// Deliberately minimal: identity only. Two handles are the same endpoint
/// exactly when their tokens are equal; anything beyond that (actually
/// dispatching commands) belongs to the concrete implementation and is
/// outside this crate's scope.
pub trait TransportHandle: fmt::Debug + Send + Sync {
    /// The stable token identifying this endpoint — also its wire
    /// representation.
    fn token(&self) -> HandleRef;
}

/// Resolves a wire token back into a live handle.
///
/// Supplied by the handshake layer at decode time. Returning `None` makes
/// the decode fail: a connection state whose mandatory handle cannot be
/// materialized is unusable.
pub trait HandleResolver {
    /// Looks up the endpoint for a token, if one is known.
    fn resolve(&self, token: HandleRef) -> Option<Arc<dyn TransportHandle>>;
}

// ---------------------------------------------------------------------------
// In-process implementations
// ---------------------------------------------------------------------------

/// A [`TransportHandle`] that is nothing but its token.
///
/// Enough for in-process wiring, demos, and tests, where both endpoints
/// share an address space and the dispatch channel is found elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalHandle {
    token: HandleRef,
}

impl LocalHandle {
    /// Creates a handle with the given token.
    pub fn new(token: HandleRef) -> Self {
        Self { token }
    }
}

impl TransportHandle for LocalHandle {
    fn token(&self) -> HandleRef {
        self.token
    }
}

/// A registry mapping tokens to handles.
///
/// The handshake layer registers an endpoint when it hands out a token and
/// unregisters it when the connection is torn down. Not internally
/// synchronized — like the rest of this crate it is owned by whoever
/// drives the handshake and shared at a higher level if needed.
#[derive(Debug, Default)]
pub struct HandleTable {
    handles: HashMap<HandleRef, Arc<dyn TransportHandle>>,
}

impl HandleTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handle under its own token, replacing any previous
    /// registration for that token.
    pub fn register(&mut self, handle: Arc<dyn TransportHandle>) {
        let token = handle.token();
        tracing::debug!(%token, "transport handle registered");
        self.handles.insert(token, handle);
    }

    /// Removes a registration.
    pub fn unregister(&mut self, token: HandleRef) {
        if self.handles.remove(&token).is_some() {
            tracing::debug!(%token, "transport handle unregistered");
        }
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if no handles are registered.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl HandleResolver for HandleTable {
    fn resolve(&self, token: HandleRef) -> Option<Arc<dyn TransportHandle>> {
        self.handles.get(&token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_resolves_registered_token() {
        let mut table = HandleTable::new();
        table.register(Arc::new(LocalHandle::new(HandleRef(7))));

        let handle = table.resolve(HandleRef(7)).unwrap();
        assert_eq!(handle.token(), HandleRef(7));
    }

    #[test]
    fn test_table_misses_unknown_token() {
        let table = HandleTable::new();
        assert!(table.resolve(HandleRef(1)).is_none());
    }

    #[test]
    fn test_unregister_removes_handle() {
        let mut table = HandleTable::new();
        table.register(Arc::new(LocalHandle::new(HandleRef(3))));
        table.unregister(HandleRef(3));
        assert!(table.resolve(HandleRef(3)).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_register_replaces_same_token() {
        let mut table = HandleTable::new();
        table.register(Arc::new(LocalHandle::new(HandleRef(9))));
        table.register(Arc::new(LocalHandle::new(HandleRef(9))));
        assert_eq!(table.len(), 1);
    }
}
