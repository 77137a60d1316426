//! Error types for the session layer.

use medialink_wire::{HandleRef, WireError};

use crate::Field;

/// A connection-state payload could not be decoded.
///
/// This is deliberately a short list. Absent optional fields are *not*
/// errors — they resolve to neutral defaults so endpoints on older schema
/// versions interoperate. What remains fatal:
///
/// - the one mandatory field (the transport handle) being absent or
///   unresolvable, and
/// - a field that *is* present but structurally invalid, which means the
///   two endpoints disagree about the schema.
///
/// There is nothing to retry: decode is a pure local transform, so a
/// failure propagates once to the caller and that is the end of it.
#[derive(Debug, thiserror::Error)]
pub enum MalformedStateError {
    /// A mandatory field was absent from the payload.
    ///
    /// Only [`Field::TransportHandle`] is mandatory; a connection state
    /// without a command endpoint is unusable no matter how tolerant the
    /// rest of the decode is.
    #[error("missing mandatory field {0}")]
    MissingField(Field),

    /// The transport handle token was present but the resolver knows no
    /// endpoint for it.
    #[error("transport handle {0} did not resolve to an endpoint")]
    UnresolvedHandle(HandleRef),

    /// A field was present but structurally invalid — wrong value kind,
    /// or a malformed sub-container.
    #[error("invalid field {field}: {source}")]
    InvalidField {
        field: Field,
        #[source]
        source: WireError,
    },
}

impl MalformedStateError {
    /// Wraps a wire error with the aggregate field it occurred under.
    pub(crate) fn invalid(field: Field) -> impl FnOnce(WireError) -> Self {
        move |source| Self::InvalidField { field, source }
    }
}
