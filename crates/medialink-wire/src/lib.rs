//! Wire format for Medialink.
//!
//! This crate defines the container every Medialink message is built from:
//!
//! - **Container** ([`TaggedContainer`], [`WireValue`], [`HandleRef`]) —
//!   a flat map from stable integer field tags to values.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how a container is
//!   converted to/from bytes for the transport.
//! - **Errors** ([`WireError`]) — what can go wrong while reading or
//!   writing a container.
//!
//! # Additive schema evolution
//!
//! The container is the compatibility mechanism. Encoders write only the
//! fields they have; decoders look up each tag they know and fall back to
//! a defined default when it is absent. Keys a decoder does not recognize
//! are simply never looked up, so payloads from newer senders pass through
//! harmlessly. Tags are assigned once and never reused or renumbered —
//! removing or renumbering a tag is a breaking change.
//!
//! ```text
//! Transport (bytes) → Codec → TaggedContainer → domain decode (medialink-session)
//! ```

mod codec;
mod container;
mod error;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use container::{key_for_tag, HandleRef, TaggedContainer, WireValue};
pub use error::WireError;
