//! Built-in playback capabilities and the permission mask over them.
//!
//! [`PlayerCommand`] is the closed set of operations a controller can ask
//! the player to perform. [`PlayerCommands`] is an immutable set of them —
//! the connection state carries two such masks, and a capability is only
//! usable when *both* contain it (see [`PlayerCommands::intersect`]).

use medialink_wire::{TaggedContainer, WireError, WireValue};

// ---------------------------------------------------------------------------
// PlayerCommand
// ---------------------------------------------------------------------------

/// One built-in playback operation.
///
/// Each command has a stable numeric code (`self as u32`) that doubles as
/// its bit position in a [`PlayerCommands`] mask. Codes are assigned once
/// and never reused or renumbered; new commands are appended with fresh
/// codes, so masks exchanged between different builds stay meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PlayerCommand {
    /// Toggle between playing and paused.
    PlayPause = 0,
    /// Prepare the player for playback.
    Prepare = 1,
    /// Stop playback and release transient resources.
    Stop = 2,
    /// Seek to an absolute position in the current item.
    SeekTo = 3,
    /// Seek backwards by the player's configured increment.
    SeekBack = 4,
    /// Seek forwards by the player's configured increment.
    SeekForward = 5,
    /// Change the playback speed.
    SetSpeed = 6,
    /// Change the repeat mode.
    SetRepeatMode = 7,
    /// Toggle shuffled playback.
    SetShuffleMode = 8,
    /// Read the timeline and its items.
    GetTimeline = 9,
    /// Read metadata of the current media item.
    GetMediaMetadata = 10,
    /// Read caption/subtitle text.
    GetText = 11,
    /// Read the available track list.
    GetTracks = 12,
    /// Read the current volume.
    GetVolume = 13,
    /// Change the volume.
    SetVolume = 14,
    /// Release the player entirely.
    Release = 15,
}

impl PlayerCommand {
    /// Every command, in code order. Kept in sync with the enum by the
    /// exhaustiveness test below.
    pub const ALL: [PlayerCommand; 16] = [
        PlayerCommand::PlayPause,
        PlayerCommand::Prepare,
        PlayerCommand::Stop,
        PlayerCommand::SeekTo,
        PlayerCommand::SeekBack,
        PlayerCommand::SeekForward,
        PlayerCommand::SetSpeed,
        PlayerCommand::SetRepeatMode,
        PlayerCommand::SetShuffleMode,
        PlayerCommand::GetTimeline,
        PlayerCommand::GetMediaMetadata,
        PlayerCommand::GetText,
        PlayerCommand::GetTracks,
        PlayerCommand::GetVolume,
        PlayerCommand::SetVolume,
        PlayerCommand::Release,
    ];

    /// The command's stable numeric code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    const fn bit(self) -> u32 {
        1 << self.code()
    }
}

// ---------------------------------------------------------------------------
// PlayerCommands
// ---------------------------------------------------------------------------

/// Wire tag inside a mask sub-container. Next tag = 1.
const FIELD_BITS: u32 = 0;

/// An immutable set of [`PlayerCommand`]s.
///
/// A plain bit-set under the hood: bit *n* set means the command with code
/// *n* is granted. `Copy` because it is a single `u32` — passing masks
/// around never clones anything.
///
/// The empty mask is the fail-closed default everywhere: a mask that is
/// absent from a payload decodes to [`PlayerCommands::EMPTY`], never to
/// "everything allowed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerCommands {
    bits: u32,
}

impl PlayerCommands {
    /// The mask granting nothing.
    pub const EMPTY: Self = Self { bits: 0 };

    /// The mask granting every command this build knows.
    pub const fn all() -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < PlayerCommand::ALL.len() {
            bits |= PlayerCommand::ALL[i].bit();
            i += 1;
        }
        Self { bits }
    }

    /// Builds a mask from the given commands.
    pub fn of(commands: impl IntoIterator<Item = PlayerCommand>) -> Self {
        commands
            .into_iter()
            .fold(Self::EMPTY, |mask, command| mask.with(command))
    }

    /// True if the command is granted by this mask.
    pub const fn contains(self, command: PlayerCommand) -> bool {
        self.bits & command.bit() != 0
    }

    /// The commands granted by *both* masks.
    ///
    /// This is how effective permission is computed: a capability granted
    /// by only one side is not effective.
    pub const fn intersect(self, other: Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// The commands granted by either mask.
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// A copy of this mask with one more command granted.
    pub const fn with(self, command: PlayerCommand) -> Self {
        Self {
            bits: self.bits | command.bit(),
        }
    }

    /// A copy of this mask with one command removed.
    pub const fn without(self, command: PlayerCommand) -> Self {
        Self {
            bits: self.bits & !command.bit(),
        }
    }

    /// True if nothing is granted.
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Iterates the granted commands in code order.
    pub fn iter(self) -> impl Iterator<Item = PlayerCommand> {
        PlayerCommand::ALL
            .into_iter()
            .filter(move |command| self.contains(*command))
    }

    /// Encodes the mask into its own sub-container.
    pub fn encode(self) -> TaggedContainer {
        TaggedContainer::from_fields([(FIELD_BITS, Some(WireValue::Int(self.bits as i64)))])
    }

    /// Decodes a mask from its sub-container.
    ///
    /// A missing bits value decodes to [`PlayerCommands::EMPTY`] — absence
    /// grants nothing. Bits that do not map to a command this build knows
    /// are discarded for the same reason: a newer sender cannot grant a
    /// capability this side cannot name.
    pub fn decode(container: &TaggedContainer) -> Result<Self, WireError> {
        let bits = container.int_or(FIELD_BITS, 0)? as u32;
        Ok(Self {
            bits: bits & Self::all().bits,
        })
    }
}

// =========================================================================
// Tests
// =========================================================================
