//! The player-state snapshot and its permission projection.
//!
//! A [`StateSnapshot`] is the picture of the player the controller starts
//! from: position, speed, modes, and four *gated categories* — timeline
//! items, media metadata, captions, and tracks. Gated categories are only
//! transmitted when the controller holds *effective* permission for them,
//! i.e. when both the session-granted and the player-supported mask
//! contain the matching `Get*` command.
//!
//! The projection never changes the snapshot's shape. An excluded category
//! is encoded as its empty placeholder — present and structurally valid,
//! just without content — so a decoder always finds the fields it expects
//! regardless of what it was allowed to see.
//!
//! One deliberate asymmetry, preserved from the source behavior this
//! protocol is compatible with: the timeline *container* is always
//! written, even when its *items* are suppressed. The other three
//! categories gate their whole content; the timeline gates only its item
//! payload, never its presence. [`SnapshotExclusions`] has no flag for the
//! container itself, so the asymmetry cannot be reintroduced by a caller.

use medialink_wire::{TaggedContainer, WireError, WireValue};

use crate::{PlayerCommand, PlayerCommands};

// Snapshot wire tags. Next tag = 9.
const FIELD_POSITION_MS: u32 = 0;
const FIELD_PLAYING: u32 = 1;
const FIELD_SPEED_MILLI: u32 = 2;
const FIELD_REPEAT_MODE: u32 = 3;
const FIELD_SHUFFLE: u32 = 4;
const FIELD_TIMELINE: u32 = 5;
const FIELD_METADATA: u32 = 6;
const FIELD_CAPTIONS: u32 = 7;
const FIELD_TRACKS: u32 = 8;

// ---------------------------------------------------------------------------
// Leaf types
// ---------------------------------------------------------------------------

/// How playback continues at the end of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum RepeatMode {
    /// Stop at the end of the queue.
    #[default]
    Off = 0,
    /// Repeat the current item.
    One = 1,
    /// Repeat the whole queue.
    All = 2,
}

impl RepeatMode {
    const fn code(self) -> i64 {
        self as i64
    }

    /// Unknown codes (from a newer sender) decode to `Off`, the neutral
    /// default, matching the tolerance rule for absent fields.
    fn from_code(code: i64) -> Self {
        match code {
            1 => RepeatMode::One,
            2 => RepeatMode::All,
            _ => RepeatMode::Off,
        }
    }
}

/// One entry in the playback queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineItem {
    /// Application-level identifier of the media item.
    pub media_id: String,
    /// Item duration, or a negative value when unknown.
    pub duration_ms: i64,
}

impl TimelineItem {
    // Tags inside an item sub-container. Next tag = 2.
    const FIELD_MEDIA_ID: u32 = 0;
    const FIELD_DURATION_MS: u32 = 1;

    fn encode(&self) -> TaggedContainer {
        TaggedContainer::from_fields([
            (
                Self::FIELD_MEDIA_ID,
                Some(WireValue::Text(self.media_id.clone())),
            ),
            (
                Self::FIELD_DURATION_MS,
                Some(WireValue::Int(self.duration_ms)),
            ),
        ])
    }

    fn decode(container: &TaggedContainer) -> Result<Self, WireError> {
        Ok(Self {
            media_id: container
                .text(Self::FIELD_MEDIA_ID)?
                .unwrap_or_default()
                .to_string(),
            duration_ms: container.int_or(Self::FIELD_DURATION_MS, -1)?,
        })
    }
}

/// The playback queue.
///
/// The container for the timeline is always transmitted; only `items` is
/// subject to permission gating. An excluded or empty timeline is simply
/// one with no items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timeline {
    /// Queue entries in playback order.
    pub items: Vec<TimelineItem>,
}

impl Timeline {
    /// Builds a timeline from items in playback order.
    pub fn of(items: impl IntoIterator<Item = TimelineItem>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    fn encode(&self, exclude_items: bool) -> TaggedContainer {
        if exclude_items {
            // Placeholder: the container exists, the item payload does not.
            TaggedContainer::new()
        } else {
            encode_indexed(&self.items, TimelineItem::encode)
        }
    }

    fn decode(container: &TaggedContainer) -> Result<Self, WireError> {
        Ok(Self {
            items: decode_indexed(container, TimelineItem::decode)?,
        })
    }
}

/// Descriptive metadata of the current media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    pub title: String,
    pub artist: String,
}

impl MediaMetadata {
    // Tags inside a metadata sub-container. Next tag = 2.
    const FIELD_TITLE: u32 = 0;
    const FIELD_ARTIST: u32 = 1;

    fn encode(&self) -> TaggedContainer {
        TaggedContainer::from_fields([
            (
                Self::FIELD_TITLE,
                Some(WireValue::Text(self.title.clone())),
            ),
            (
                Self::FIELD_ARTIST,
                Some(WireValue::Text(self.artist.clone())),
            ),
        ])
    }

    fn decode(container: &TaggedContainer) -> Result<Self, WireError> {
        Ok(Self {
            title: container
                .text(Self::FIELD_TITLE)?
                .unwrap_or_default()
                .to_string(),
            artist: container
                .text(Self::FIELD_ARTIST)?
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// One caption cue currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub language: String,
    pub text: String,
}

impl Caption {
    // Tags inside a caption sub-container. Next tag = 2.
    const FIELD_LANGUAGE: u32 = 0;
    const FIELD_TEXT: u32 = 1;

    fn encode(&self) -> TaggedContainer {
        TaggedContainer::from_fields([
            (
                Self::FIELD_LANGUAGE,
                Some(WireValue::Text(self.language.clone())),
            ),
            (Self::FIELD_TEXT, Some(WireValue::Text(self.text.clone()))),
        ])
    }

    fn decode(container: &TaggedContainer) -> Result<Self, WireError> {
        Ok(Self {
            language: container
                .text(Self::FIELD_LANGUAGE)?
                .unwrap_or_default()
                .to_string(),
            text: container
                .text(Self::FIELD_TEXT)?
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// The medium a track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TrackKind {
    Audio = 0,
    Video = 1,
    Text = 2,
    /// A kind this build does not know; newer senders decode to this.
    Other = 3,
}

impl TrackKind {
    const fn code(self) -> i64 {
        self as i64
    }

    fn from_code(code: i64) -> Self {
        match code {
            0 => TrackKind::Audio,
            1 => TrackKind::Video,
            2 => TrackKind::Text,
            _ => TrackKind::Other,
        }
    }
}

/// One selectable track of the current media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub kind: TrackKind,
    pub language: String,
}

impl Track {
    // Tags inside a track sub-container. Next tag = 3.
    const FIELD_ID: u32 = 0;
    const FIELD_KIND: u32 = 1;
    const FIELD_LANGUAGE: u32 = 2;

    fn encode(&self) -> TaggedContainer {
        TaggedContainer::from_fields([
            (Self::FIELD_ID, Some(WireValue::Text(self.id.clone()))),
            (Self::FIELD_KIND, Some(WireValue::Int(self.kind.code()))),
            (
                Self::FIELD_LANGUAGE,
                Some(WireValue::Text(self.language.clone())),
            ),
        ])
    }

    fn decode(container: &TaggedContainer) -> Result<Self, WireError> {
        Ok(Self {
            id: container
                .text(Self::FIELD_ID)?
                .unwrap_or_default()
                .to_string(),
            kind: TrackKind::from_code(container.int_or(Self::FIELD_KIND, 0)?),
            language: container
                .text(Self::FIELD_LANGUAGE)?
                .unwrap_or_default()
                .to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// SnapshotExclusions — the projector
// ---------------------------------------------------------------------------

/// Which gated categories must be emptied before transmission.
///
/// Computed from the two permission masks with
/// [`SnapshotExclusions::from_commands`]; a category is excluded exactly
/// when the controller's effective permission lacks it:
///
/// ```text
/// exclude(X) = !(from_session.contains(X) && from_player.contains(X))
/// ```
///
/// Note there is no `timeline` flag — the timeline container itself is
/// never excluded, only its items (see the module docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotExclusions {
    /// Suppress the timeline's item payload (`GetTimeline`).
    pub timeline_items: bool,
    /// Suppress media metadata (`GetMediaMetadata`).
    pub media_metadata: bool,
    /// Suppress caption cues (`GetText`).
    pub captions: bool,
    /// Suppress the track list (`GetTracks`).
    pub tracks: bool,
}

impl SnapshotExclusions {
    /// Exclude nothing — the projection of a fully permitted controller.
    pub const NONE: Self = Self {
        timeline_items: false,
        media_metadata: false,
        captions: false,
        tracks: false,
    };

    /// Computes the exclusion flags from the two independent masks.
    pub fn from_commands(
        from_session: PlayerCommands,
        from_player: PlayerCommands,
    ) -> Self {
        let effective = from_session.intersect(from_player);
        Self {
            timeline_items: !effective.contains(PlayerCommand::GetTimeline),
            media_metadata: !effective.contains(PlayerCommand::GetMediaMetadata),
            captions: !effective.contains(PlayerCommand::GetText),
            tracks: !effective.contains(PlayerCommand::GetTracks),
        }
    }
}

// ---------------------------------------------------------------------------
// StateSnapshot
// ---------------------------------------------------------------------------

/// The player's current state as transmitted at connection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// Playback position within the current item.
    pub position_ms: i64,
    /// True when actively playing.
    pub playing: bool,
    /// Playback speed in thousandths (1000 = normal speed).
    pub speed_milli: i64,
    pub repeat_mode: RepeatMode,
    pub shuffle: bool,
    /// The playback queue. Gated: items require `GetTimeline`.
    pub timeline: Timeline,
    /// Gated: requires `GetMediaMetadata`.
    pub metadata: Option<MediaMetadata>,
    /// Gated: requires `GetText`.
    pub captions: Vec<Caption>,
    /// Gated: requires `GetTracks`.
    pub tracks: Vec<Track>,
}

/// The neutral snapshot: stopped at zero, normal speed, nothing queued.
/// Also what an absent snapshot field decodes to.
impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            position_ms: 0,
            playing: false,
            speed_milli: 1000,
            repeat_mode: RepeatMode::Off,
            shuffle: false,
            timeline: Timeline::default(),
            metadata: None,
            captions: Vec::new(),
            tracks: Vec::new(),
        }
    }
}

impl StateSnapshot {
    /// Encodes the snapshot with the given exclusions applied.
    ///
    /// Excluded categories are written as their empty placeholders, never
    /// omitted: the receiver always finds a structurally valid snapshot.
    pub fn encode_with(&self, exclusions: &SnapshotExclusions) -> TaggedContainer {
        let metadata = if exclusions.media_metadata {
            // Placeholder; decodes back to `None`.
            Some(TaggedContainer::new())
        } else {
            self.metadata.as_ref().map(MediaMetadata::encode)
        };
        let captions = if exclusions.captions {
            TaggedContainer::new()
        } else {
            encode_indexed(&self.captions, Caption::encode)
        };
        let tracks = if exclusions.tracks {
            TaggedContainer::new()
        } else {
            encode_indexed(&self.tracks, Track::encode)
        };

        TaggedContainer::from_fields([
            (FIELD_POSITION_MS, Some(WireValue::Int(self.position_ms))),
            (FIELD_PLAYING, Some(WireValue::Int(i64::from(self.playing)))),
            (FIELD_SPEED_MILLI, Some(WireValue::Int(self.speed_milli))),
            (
                FIELD_REPEAT_MODE,
                Some(WireValue::Int(self.repeat_mode.code())),
            ),
            (FIELD_SHUFFLE, Some(WireValue::Int(i64::from(self.shuffle)))),
            // Unconditional: the timeline container is never excluded,
            // only its item payload.
            (
                FIELD_TIMELINE,
                Some(WireValue::Container(
                    self.timeline.encode(exclusions.timeline_items),
                )),
            ),
            (FIELD_METADATA, metadata.map(WireValue::Container)),
            (FIELD_CAPTIONS, Some(WireValue::Container(captions))),
            (FIELD_TRACKS, Some(WireValue::Container(tracks))),
        ])
    }

    /// Decodes a snapshot, substituting neutral defaults for absent
    /// fields.
    pub fn decode(container: &TaggedContainer) -> Result<Self, WireError> {
        let timeline = match container.container(FIELD_TIMELINE)? {
            Some(entries) => Timeline::decode(entries)?,
            None => Timeline::default(),
        };
        let metadata = match container.container(FIELD_METADATA)? {
            // The empty container is the excluded-metadata placeholder.
            Some(entries) if !entries.is_empty() => {
                Some(MediaMetadata::decode(entries)?)
            }
            _ => None,
        };
        let captions = match container.container(FIELD_CAPTIONS)? {
            Some(entries) => decode_indexed(entries, Caption::decode)?,
            None => Vec::new(),
        };
        let tracks = match container.container(FIELD_TRACKS)? {
            Some(entries) => decode_indexed(entries, Track::decode)?,
            None => Vec::new(),
        };

        Ok(Self {
            position_ms: container.int_or(FIELD_POSITION_MS, 0)?,
            playing: container.int_or(FIELD_PLAYING, 0)? != 0,
            speed_milli: container.int_or(FIELD_SPEED_MILLI, 1000)?,
            repeat_mode: RepeatMode::from_code(
                container.int_or(FIELD_REPEAT_MODE, 0)?,
            ),
            shuffle: container.int_or(FIELD_SHUFFLE, 0)? != 0,
            timeline,
            metadata,
            captions,
            tracks,
        })
    }
}

// ---------------------------------------------------------------------------
// Index-keyed collections
// ---------------------------------------------------------------------------

fn encode_indexed<T>(
    items: &[T],
    encode: impl Fn(&T) -> TaggedContainer,
) -> TaggedContainer {
    let mut container = TaggedContainer::new();
    for (index, item) in items.iter().enumerate() {
        container.insert(index as u32, WireValue::Container(encode(item)));
    }
    container
}

fn decode_indexed<T>(
    container: &TaggedContainer,
    decode: impl Fn(&TaggedContainer) -> Result<T, WireError>,
) -> Result<Vec<T>, WireError> {
    let mut items = Vec::new();
    let mut index = 0;
    while let Some(entry) = container.container(index)? {
        items.push(decode(entry)?);
        index += 1;
    }
    Ok(items)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn full_snapshot() -> StateSnapshot {
        StateSnapshot {
            position_ms: 93_500,
            playing: true,
            speed_milli: 1500,
            repeat_mode: RepeatMode::All,
            shuffle: true,
            timeline: Timeline::of([
                TimelineItem {
                    media_id: "track-1".into(),
                    duration_ms: 180_000,
                },
                TimelineItem {
                    media_id: "track-2".into(),
                    duration_ms: 240_000,
                },
            ]),
            metadata: Some(MediaMetadata {
                title: "Song".into(),
                artist: "Artist".into(),
            }),
            captions: vec![Caption {
                language: "en".into(),
                text: "hello".into(),
            }],
            tracks: vec![Track {
                id: "a0".into(),
                kind: TrackKind::Audio,
                language: "en".into(),
            }],
        }
    }

    // =====================================================================
    // Exclusion formula
    // =====================================================================

    #[test]
    fn test_both_sides_granted_means_not_excluded() {
        let mask = PlayerCommands::of([PlayerCommand::GetTimeline]);
        let exclusions = SnapshotExclusions::from_commands(mask, mask);
        assert!(!exclusions.timeline_items);
    }

    #[test]
    fn test_one_sided_grant_is_excluded() {
        // Session grants GetTimeline, player grants nothing.
        let exclusions = SnapshotExclusions::from_commands(
            PlayerCommands::of([PlayerCommand::GetTimeline]),
            PlayerCommands::EMPTY,
        );
        assert!(exclusions.timeline_items);

        // And the mirror image.
        let exclusions = SnapshotExclusions::from_commands(
            PlayerCommands::EMPTY,
            PlayerCommands::of([PlayerCommand::GetTimeline]),
        );
        assert!(exclusions.timeline_items);
    }

    #[test]
    fn test_each_category_follows_its_own_command() {
        let exclusions = SnapshotExclusions::from_commands(
            PlayerCommands::of([
                PlayerCommand::GetMediaMetadata,
                PlayerCommand::GetTracks,
            ]),
            PlayerCommands::all(),
        );
        assert!(exclusions.timeline_items);
        assert!(!exclusions.media_metadata);
        assert!(exclusions.captions);
        assert!(!exclusions.tracks);
    }

    #[test]
    fn test_full_permission_excludes_nothing() {
        let exclusions = SnapshotExclusions::from_commands(
            PlayerCommands::all(),
            PlayerCommands::all(),
        );
        assert_eq!(exclusions, SnapshotExclusions::NONE);
    }

    // =====================================================================
    // Projection on the wire
    // =====================================================================

    #[test]
    fn test_unprojected_round_trip() {
        let snapshot = full_snapshot();
        let decoded =
            StateSnapshot::decode(&snapshot.encode_with(&SnapshotExclusions::NONE))
                .unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_excluded_timeline_keeps_container_drops_items() {
        let snapshot = full_snapshot();
        let exclusions = SnapshotExclusions {
            timeline_items: true,
            ..SnapshotExclusions::NONE
        };
        let encoded = snapshot.encode_with(&exclusions);

        // The timeline container is present even though its items are not.
        let timeline = encoded.container(FIELD_TIMELINE).unwrap().unwrap();
        assert!(timeline.is_empty());

        let decoded = StateSnapshot::decode(&encoded).unwrap();
        assert!(decoded.timeline.items.is_empty());
        // Nothing else was touched.
        assert_eq!(decoded.metadata, snapshot.metadata);
        assert_eq!(decoded.tracks, snapshot.tracks);
    }

    #[test]
    fn test_excluded_metadata_becomes_placeholder_then_none() {
        let snapshot = full_snapshot();
        let exclusions = SnapshotExclusions {
            media_metadata: true,
            ..SnapshotExclusions::NONE
        };
        let encoded = snapshot.encode_with(&exclusions);

        // Present as a placeholder, not omitted.
        let metadata = encoded.container(FIELD_METADATA).unwrap().unwrap();
        assert!(metadata.is_empty());

        let decoded = StateSnapshot::decode(&encoded).unwrap();
        assert_eq!(decoded.metadata, None);
        assert_eq!(decoded.timeline, snapshot.timeline);
    }

    #[test]
    fn test_excluded_captions_and_tracks_round_trip_empty() {
        let snapshot = full_snapshot();
        let exclusions = SnapshotExclusions {
            captions: true,
            tracks: true,
            ..SnapshotExclusions::NONE
        };
        let decoded =
            StateSnapshot::decode(&snapshot.encode_with(&exclusions)).unwrap();
        assert!(decoded.captions.is_empty());
        assert!(decoded.tracks.is_empty());
        assert_eq!(decoded.position_ms, snapshot.position_ms);
    }

    // =====================================================================
    // Defaults and tolerance
    // =====================================================================

    #[test]
    fn test_empty_container_decodes_to_neutral_snapshot() {
        let decoded = StateSnapshot::decode(&TaggedContainer::new()).unwrap();
        assert_eq!(decoded, StateSnapshot::default());
        assert_eq!(decoded.speed_milli, 1000);
    }

    #[test]
    fn test_unknown_repeat_mode_decodes_to_off() {
        let mut container = TaggedContainer::new();
        container.insert(FIELD_REPEAT_MODE, WireValue::Int(57));
        let decoded = StateSnapshot::decode(&container).unwrap();
        assert_eq!(decoded.repeat_mode, RepeatMode::Off);
    }

    #[test]
    fn test_unknown_track_kind_decodes_to_other() {
        assert_eq!(TrackKind::from_code(42), TrackKind::Other);
    }

    #[test]
    fn test_mistyped_timeline_is_an_error() {
        let mut container = TaggedContainer::new();
        container.insert(FIELD_TIMELINE, WireValue::Int(1));
        assert!(StateSnapshot::decode(&container).is_err());
    }
}
