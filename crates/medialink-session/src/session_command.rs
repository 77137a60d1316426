//! Custom (non-built-in) commands a session can expose.
//!
//! Built-in playback operations are covered by
//! [`PlayerCommands`](crate::PlayerCommands); everything else a session
//! wants to offer — "thumbs up", "start radio", app-specific actions —
//! travels as a [`SessionCommand`]: a name the controller invokes by,
//! plus an opaque argument schema only the two applications understand.
//!
//! The connection state carries the session's full grant as a
//! [`SessionCommands`] collection. Order is preserved: sessions list
//! commands in the order they want controllers to surface them.

use medialink_wire::{TaggedContainer, WireError, WireValue};

use crate::Extras;

// Wire tags inside a command sub-container. Next tag = 2.
const FIELD_NAME: u32 = 0;
const FIELD_ARGS: u32 = 1;

/// One custom command descriptor.
///
/// Immutable once constructed, like every value in the connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCommand {
    name: String,
    args: Extras,
}

impl SessionCommand {
    /// Creates a descriptor with no argument schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Extras::EMPTY,
        }
    }

    /// Creates a descriptor with an opaque argument schema.
    pub fn with_args(name: impl Into<String>, args: Extras) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The name the controller invokes this command by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The opaque argument schema. Empty when the command takes none.
    pub fn args(&self) -> &Extras {
        &self.args
    }

    /// Encodes the descriptor into its own sub-container.
    ///
    /// Empty args are elided — the common no-arguments case costs one
    /// entry on the wire, not two.
    pub fn encode(&self) -> TaggedContainer {
        TaggedContainer::from_fields([
            (FIELD_NAME, Some(WireValue::Text(self.name.clone()))),
            (
                FIELD_ARGS,
                (!self.args.is_empty())
                    .then(|| WireValue::Blob(self.args.as_bytes().to_vec())),
            ),
        ])
    }

    /// Decodes a descriptor from its sub-container.
    ///
    /// The name is required: a command that cannot be invoked by name is
    /// meaningless, so its absence makes the sub-container malformed
    /// rather than defaultable.
    pub fn decode(container: &TaggedContainer) -> Result<Self, WireError> {
        let name = container
            .text(FIELD_NAME)?
            .ok_or(WireError::Missing { tag: FIELD_NAME })?
            .to_string();
        let args = container
            .blob(FIELD_ARGS)?
            .map(|bytes| Extras::new(bytes.to_vec()))
            .unwrap_or(Extras::EMPTY);
        Ok(Self { name, args })
    }
}

// ---------------------------------------------------------------------------
// SessionCommands
// ---------------------------------------------------------------------------

/// An ordered, immutable collection of custom command descriptors.
///
/// Encoded as an index-keyed sub-container: the descriptor at position
/// *i* sits under tag *i*. The wire format has no list kind, and inside a
/// collection's own tag space the positions *are* the stable tags, so
/// this stays within the flat-container discipline while preserving
/// order. Decode reads ascending indices up to the first gap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionCommands {
    commands: Vec<SessionCommand>,
}

impl SessionCommands {
    /// The grant of no custom commands — the decode default.
    pub const EMPTY: Self = Self {
        commands: Vec::new(),
    };

    /// Builds a collection in the given order.
    pub fn of(commands: impl IntoIterator<Item = SessionCommand>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }

    /// True if a command with the given name is granted.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.iter().any(|command| command.name() == name)
    }

    /// Iterates the descriptors in grant order.
    pub fn iter(&self) -> impl Iterator<Item = &SessionCommand> {
        self.commands.iter()
    }

    /// Number of granted commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if nothing is granted.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Encodes the collection into its own sub-container.
    pub fn encode(&self) -> TaggedContainer {
        let mut container = TaggedContainer::new();
        for (index, command) in self.commands.iter().enumerate() {
            container.insert(index as u32, WireValue::Container(command.encode()));
        }
        container
    }

    /// Decodes a collection from its sub-container.
    ///
    /// An empty container decodes to [`SessionCommands::EMPTY`]. A
    /// malformed descriptor is an error — it was present, so defaulting
    /// it away would silently drop part of the grant.
    pub fn decode(container: &TaggedContainer) -> Result<Self, WireError> {
        let mut commands = Vec::new();
        let mut index = 0;
        while let Some(entry) = container.container(index)? {
            commands.push(SessionCommand::decode(entry)?);
            index += 1;
        }
        Ok(Self { commands })
    }
}

// =========================================================================
// Tests
// =========================================================================
