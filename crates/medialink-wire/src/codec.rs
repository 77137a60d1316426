//! Byte-level codec for moving containers over a transport.
//!
//! The container layer deals in [`TaggedContainer`](crate::TaggedContainer)
//! values; the transport deals in bytes. A [`Codec`] bridges the two. The
//! trait is a seam: the tagged format's semantics (stable tags, defaults,
//! unknown-key tolerance) live entirely in the container, so any
//! self-describing byte encoding can sit underneath without those
//! semantics changing.
//!
//! [`JsonCodec`] is the provided implementation, behind the default-on
//! `json` feature.

use serde::{de::DeserializeOwned, Serialize};

use crate::WireError;

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` so a single codec instance can be shared with
/// whatever transport machinery ends up driving it.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`WireError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, WireError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`WireError::Decode`] if the bytes are malformed,
    /// truncated, or not the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, WireError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// JSON keeps captured payloads human-readable, which matters most while
/// debugging a handshake between endpoints on different schema versions:
/// you can see exactly which wire keys a peer did or did not send.
///
/// ## Example
///
/// ```rust
/// use medialink_wire::{Codec, JsonCodec, TaggedContainer, WireValue};
///
/// let codec = JsonCodec;
///
/// let mut container = TaggedContainer::new();
/// container.insert(0, WireValue::Int(3));
///
/// let bytes = codec.encode(&container).unwrap();
/// let decoded: TaggedContainer = codec.decode(&bytes).unwrap();
/// assert_eq!(container, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(value).map_err(WireError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, WireError> {
        serde_json::from_slice(data).map_err(WireError::Decode)
    }
}
