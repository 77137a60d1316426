//! Opaque caller-supplied payloads.
//!
//! Two of the connection state's members carry data this crate never
//! interprets: free-form metadata attached by the owning endpoint
//! ([`Extras`]) and an optional descriptor the controller can use to bring
//! the session's user interface to the foreground ([`ActivityLauncher`]).
//! Both travel as raw bytes; what is inside is an agreement between the
//! two applications, not between the two protocol layers.

/// Opaque key/value metadata attached by the owning endpoint.
///
/// Defaults to empty; an absent extras field on the wire decodes to
/// [`Extras::EMPTY`], never to an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extras(Vec<u8>);

impl Extras {
    /// No metadata.
    pub const EMPTY: Self = Self(Vec::new());

    /// Wraps caller-encoded bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True if there is no payload.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An opaque descriptor for launching the session's user interface.
///
/// The connection state only ferries it across; absent is a perfectly
/// valid state (not every session has a UI to launch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLauncher(Vec<u8>);

impl ActivityLauncher {
    /// Wraps caller-encoded bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
