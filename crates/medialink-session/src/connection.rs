//! The connection-state aggregate: everything a controller learns at
//! connection-accept time, as one encodable unit.
//!
//! Built once by the owning endpoint when it accepts a connection request,
//! transmitted, decoded once by the controller into an immutable local
//! copy, and discarded when the connection is renegotiated or torn down.
//! State changes after that travel in separate, later messages outside
//! this crate.
//!
//! # Versioning
//!
//! Two version numbers ride along: the protocol version (which schema
//! generation built the payload) and the interface version (which
//! command-dispatch surface the handle speaks). Version 0 means
//! unknown/legacy, which is also what an absent version field decodes to —
//! versions are never mandatory, because the whole point of the tagged
//! format is that an older sender simply leaves newer tags out.

use std::fmt;
use std::sync::Arc;

use medialink_wire::{TaggedContainer, WireValue};

use crate::{
    ActivityLauncher, Extras, HandleResolver, MalformedStateError,
    PlayerCommands, SessionCommands, SnapshotExclusions, StateSnapshot,
    TransportHandle,
};

/// Protocol version this build writes into payloads it encodes.
pub const PROTOCOL_VERSION: i32 = 4;

/// Command-dispatch interface version this build's handles speak.
pub const INTERFACE_VERSION: i32 = 2;

// ---------------------------------------------------------------------------
// Field tags
// ---------------------------------------------------------------------------

/// The aggregate's field tags.
///
/// A closed enum rather than bare integers so every encode and decode
/// site matches on it exhaustively — adding a field without handling it
/// everywhere is a compile error, not a silent wire gap. Discriminants
/// are the wire tags: assigned once, append-only, never renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Field {
    ProtocolVersion = 0,
    TransportHandle = 1,
    ActivityLauncher = 2,
    SessionCommands = 3,
    PlayerCommandsFromSession = 4,
    PlayerCommandsFromPlayer = 5,
    Extras = 6,
    Snapshot = 7,
    InterfaceVersion = 8,
}
// Next field tag = 9.

impl Field {
    /// Every field, in tag order.
    pub const ALL: [Field; 9] = [
        Field::ProtocolVersion,
        Field::TransportHandle,
        Field::ActivityLauncher,
        Field::SessionCommands,
        Field::PlayerCommandsFromSession,
        Field::PlayerCommandsFromPlayer,
        Field::Extras,
        Field::Snapshot,
        Field::InterfaceVersion,
    ];

    /// The field's wire tag.
    pub const fn tag(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::ProtocolVersion => "protocol_version",
            Field::TransportHandle => "transport_handle",
            Field::ActivityLauncher => "activity_launcher",
            Field::SessionCommands => "session_commands",
            Field::PlayerCommandsFromSession => "player_commands_from_session",
            Field::PlayerCommandsFromPlayer => "player_commands_from_player",
            Field::Extras => "extras",
            Field::Snapshot => "snapshot",
            Field::InterfaceVersion => "interface_version",
        };
        write!(f, "{name} (tag {})", self.tag())
    }
}

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// The state a session transfers to a controller when it accepts the
/// connection.
///
/// Immutable after construction: fields are private, there are no
/// setters, and encode/decode never mutate anything they were given.
/// Cloning is cheap where it matters — the handle is an `Arc`.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    protocol_version: i32,
    interface_version: i32,
    transport_handle: Arc<dyn TransportHandle>,
    activity_launcher: Option<ActivityLauncher>,
    session_commands: SessionCommands,
    player_commands_from_session: PlayerCommands,
    player_commands_from_player: PlayerCommands,
    extras: Extras,
    snapshot: StateSnapshot,
}

impl ConnectionState {
    /// Assembles a connection state. All fields up front; nothing can be
    /// changed afterwards.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        protocol_version: i32,
        interface_version: i32,
        transport_handle: Arc<dyn TransportHandle>,
        activity_launcher: Option<ActivityLauncher>,
        session_commands: SessionCommands,
        player_commands_from_session: PlayerCommands,
        player_commands_from_player: PlayerCommands,
        extras: Extras,
        snapshot: StateSnapshot,
    ) -> Self {
        Self {
            protocol_version,
            interface_version,
            transport_handle,
            activity_launcher,
            session_commands,
            player_commands_from_session,
            player_commands_from_player,
            extras,
            snapshot,
        }
    }

    pub fn protocol_version(&self) -> i32 {
        self.protocol_version
    }

    pub fn interface_version(&self) -> i32 {
        self.interface_version
    }

    pub fn transport_handle(&self) -> &Arc<dyn TransportHandle> {
        &self.transport_handle
    }

    pub fn activity_launcher(&self) -> Option<&ActivityLauncher> {
        self.activity_launcher.as_ref()
    }

    pub fn session_commands(&self) -> &SessionCommands {
        &self.session_commands
    }

    /// The playback capabilities the session chose to expose.
    pub fn player_commands_from_session(&self) -> PlayerCommands {
        self.player_commands_from_session
    }

    /// The playback capabilities the player itself supports.
    pub fn player_commands_from_player(&self) -> PlayerCommands {
        self.player_commands_from_player
    }

    /// The capabilities the controller can actually use: granted by the
    /// session *and* supported by the player.
    pub fn effective_player_commands(&self) -> PlayerCommands {
        self.player_commands_from_session
            .intersect(self.player_commands_from_player)
    }

    pub fn extras(&self) -> &Extras {
        &self.extras
    }

    /// The snapshot as carried by this value. On the sending side this is
    /// the unfiltered player state; projection happens during
    /// [`encode`](Self::encode), not here.
    pub fn snapshot(&self) -> &StateSnapshot {
        &self.snapshot
    }

    /// Encodes the aggregate into its wire container.
    ///
    /// Pure: computes the snapshot exclusions from the two masks, encodes
    /// the projected snapshot, and writes every field under its tag.
    /// Nothing is mutated, shared or otherwise.
    pub fn encode(&self) -> TaggedContainer {
        let exclusions = SnapshotExclusions::from_commands(
            self.player_commands_from_session,
            self.player_commands_from_player,
        );

        let mut container = TaggedContainer::new();
        for field in Field::ALL {
            let value = match field {
                Field::ProtocolVersion => {
                    Some(WireValue::Int(i64::from(self.protocol_version)))
                }
                Field::TransportHandle => {
                    Some(WireValue::Ref(self.transport_handle.token()))
                }
                Field::ActivityLauncher => self
                    .activity_launcher
                    .as_ref()
                    .map(|launcher| WireValue::Blob(launcher.as_bytes().to_vec())),
                Field::SessionCommands => {
                    Some(WireValue::Container(self.session_commands.encode()))
                }
                Field::PlayerCommandsFromSession => Some(WireValue::Container(
                    self.player_commands_from_session.encode(),
                )),
                Field::PlayerCommandsFromPlayer => Some(WireValue::Container(
                    self.player_commands_from_player.encode(),
                )),
                Field::Extras => {
                    Some(WireValue::Blob(self.extras.as_bytes().to_vec()))
                }
                Field::Snapshot => Some(WireValue::Container(
                    self.snapshot.encode_with(&exclusions),
                )),
                Field::InterfaceVersion => {
                    Some(WireValue::Int(i64::from(self.interface_version)))
                }
            };
            container.insert_some(field.tag(), value);
        }
        container
    }

    /// Decodes an aggregate from its wire container.
    ///
    /// Every optional field that is absent resolves to its neutral
    /// default — empty command set, empty (fail-closed) masks, empty
    /// extras, neutral snapshot, version 0 — so payloads from senders on
    /// an older schema decode cleanly. The one exception is the transport
    /// handle: without it there is no connection to speak of, so its
    /// absence (or an unresolvable token) is fatal.
    ///
    /// Keys this build has no tag for are ignored.
    pub fn decode(
        container: &TaggedContainer,
        resolver: &dyn HandleResolver,
    ) -> Result<Self, MalformedStateError> {
        let mut protocol_version = 0;
        let mut interface_version = 0;
        let mut transport_handle = None;
        let mut activity_launcher = None;
        let mut session_commands = SessionCommands::EMPTY;
        let mut player_commands_from_session = PlayerCommands::EMPTY;
        let mut player_commands_from_player = PlayerCommands::EMPTY;
        let mut extras = Extras::EMPTY;
        let mut snapshot = StateSnapshot::default();

        for field in Field::ALL {
            let invalid = MalformedStateError::invalid(field);
            let tag = field.tag();
            match field {
                Field::ProtocolVersion => {
                    protocol_version =
                        container.int_or(tag, 0).map_err(invalid)? as i32;
                }
                Field::TransportHandle => {
                    let token = container
                        .reference(tag)
                        .map_err(invalid)?
                        .ok_or(MalformedStateError::MissingField(field))?;
                    let handle = resolver.resolve(token).ok_or(
                        MalformedStateError::UnresolvedHandle(token),
                    )?;
                    tracing::debug!(%token, "transport handle resolved");
                    transport_handle = Some(handle);
                }
                Field::ActivityLauncher => {
                    activity_launcher = container
                        .blob(tag)
                        .map_err(invalid)?
                        .map(|bytes| ActivityLauncher::new(bytes.to_vec()));
                }
                Field::SessionCommands => {
                    session_commands = match container.container(tag).map_err(invalid)? {
                        Some(entries) => SessionCommands::decode(entries)
                            .map_err(MalformedStateError::invalid(field))?,
                        None => SessionCommands::EMPTY,
                    };
                }
                Field::PlayerCommandsFromSession => {
                    player_commands_from_session =
                        decode_mask(container, field)?;
                }
                Field::PlayerCommandsFromPlayer => {
                    player_commands_from_player =
                        decode_mask(container, field)?;
                }
                Field::Extras => {
                    extras = container
                        .blob(tag)
                        .map_err(invalid)?
                        .map(|bytes| Extras::new(bytes.to_vec()))
                        .unwrap_or(Extras::EMPTY);
                }
                Field::Snapshot => {
                    snapshot = match container.container(tag).map_err(invalid)? {
                        Some(entries) => StateSnapshot::decode(entries)
                            .map_err(MalformedStateError::invalid(field))?,
                        None => StateSnapshot::default(),
                    };
                }
                Field::InterfaceVersion => {
                    interface_version =
                        container.int_or(tag, 0).map_err(invalid)? as i32;
                }
            }
        }

        log_unrecognized_keys(container);

        // The loop above visits TransportHandle, so the option is always
        // populated by the time we get here; the early return on absence
        // already happened.
        let transport_handle = transport_handle
            .ok_or(MalformedStateError::MissingField(Field::TransportHandle))?;

        Ok(Self {
            protocol_version,
            interface_version,
            transport_handle,
            activity_launcher,
            session_commands,
            player_commands_from_session,
            player_commands_from_player,
            extras,
            snapshot,
        })
    }
}

/// Equality for the aggregate: handles compare by token, everything else
/// by value. Two decodes of the same payload against the same resolver
/// are equal.
impl PartialEq for ConnectionState {
    fn eq(&self, other: &Self) -> bool {
        self.protocol_version == other.protocol_version
            && self.interface_version == other.interface_version
            && self.transport_handle.token() == other.transport_handle.token()
            && self.activity_launcher == other.activity_launcher
            && self.session_commands == other.session_commands
            && self.player_commands_from_session == other.player_commands_from_session
            && self.player_commands_from_player == other.player_commands_from_player
            && self.extras == other.extras
            && self.snapshot == other.snapshot
    }
}

fn decode_mask(
    container: &TaggedContainer,
    field: Field,
) -> Result<PlayerCommands, MalformedStateError> {
    match container
        .container(field.tag())
        .map_err(MalformedStateError::invalid(field))?
    {
        Some(entries) => PlayerCommands::decode(entries)
            .map_err(MalformedStateError::invalid(field)),
        // Fail-closed: an absent mask grants nothing.
        None => Ok(PlayerCommands::EMPTY),
    }
}

fn log_unrecognized_keys(container: &TaggedContainer) {
    for key in container.keys() {
        let known = Field::ALL
            .iter()
            .any(|field| medialink_wire::key_for_tag(field.tag()) == key);
        if !known {
            tracing::debug!(key, "ignoring unrecognized wire key");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
