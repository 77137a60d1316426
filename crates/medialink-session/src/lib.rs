//! Connection-state transfer for Medialink.
//!
//! When a media session accepts a controller's connection request, it sends
//! back one message describing everything the controller needs to operate:
//! protocol versions, a handle to the session's command endpoint, the custom
//! commands the controller may invoke, two permission masks over built-in
//! playback operations, opaque caller metadata, and a permission-filtered
//! snapshot of current player state. This crate is that message.
//!
//! # How it fits in the stack
//!
//! ```text
//! Handshake layer (above)  ← builds/consumes ConnectionState, owns the transport
//!     ↕
//! Session layer (this crate)  ← the aggregate, its permissions, its projection
//!     ↕
//! Wire layer (below)  ← TaggedContainer, byte codecs (medialink-wire)
//! ```
//!
//! Everything here is an immutable value type. Encode and decode are pure
//! functions: no locks, no I/O, no shared mutable state, safe to call
//! concurrently on distinct instances. The transport resource behind a
//! [`TransportHandle`] is owned elsewhere; this crate only stores and
//! forwards the reference.
//!
//! # Permission model
//!
//! A playback capability is *effective* only when both independently
//! granted masks contain it: the one the session chose to expose
//! ([`ConnectionState::player_commands_from_session`]) and the one the
//! player itself supports ([`ConnectionState::player_commands_from_player`]).
//! Snapshot categories the controller has no effective permission for are
//! emptied before transmission — see [`SnapshotExclusions`].

mod command;
mod connection;
mod error;
mod handle;
mod opaque;
mod session_command;
mod snapshot;

pub use command::{PlayerCommand, PlayerCommands};
pub use connection::{
    ConnectionState, Field, INTERFACE_VERSION, PROTOCOL_VERSION,
};
pub use error::MalformedStateError;
pub use handle::{HandleResolver, HandleTable, LocalHandle, TransportHandle};
pub use opaque::{ActivityLauncher, Extras};
pub use session_command::{SessionCommand, SessionCommands};
pub use snapshot::{
    Caption, MediaMetadata, RepeatMode, SnapshotExclusions, StateSnapshot,
    Timeline, TimelineItem, Track, TrackKind,
};
