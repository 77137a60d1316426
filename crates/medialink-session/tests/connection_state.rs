//! Integration tests for the connection-state aggregate.
//!
//! These exercise the whole path a real handshake takes: build the
//! aggregate on the owning side, encode it (through the byte codec where
//! the wire shape matters), decode it on the controller side against a
//! handle registry, and check what survived the permission projection.

use std::sync::Arc;

use medialink_session::{
    ActivityLauncher, ConnectionState, Extras, HandleTable, LocalHandle,
    MalformedStateError, MediaMetadata, PlayerCommand, PlayerCommands,
    SessionCommand, SessionCommands, StateSnapshot, Timeline, TimelineItem,
    INTERFACE_VERSION, PROTOCOL_VERSION,
};
use medialink_wire::{Codec, HandleRef, JsonCodec, TaggedContainer, WireValue};

// =========================================================================
// Helpers
// =========================================================================

const SESSION_TOKEN: HandleRef = HandleRef(11);

fn resolver() -> HandleTable {
    let mut table = HandleTable::new();
    table.register(Arc::new(LocalHandle::new(SESSION_TOKEN)));
    table
}

fn two_item_snapshot() -> StateSnapshot {
    StateSnapshot {
        position_ms: 42_000,
        playing: true,
        timeline: Timeline::of([
            TimelineItem {
                media_id: "intro".into(),
                duration_ms: 30_000,
            },
            TimelineItem {
                media_id: "feature".into(),
                duration_ms: 5_400_000,
            },
        ]),
        metadata: Some(MediaMetadata {
            title: "Feature".into(),
            artist: "Studio".into(),
        }),
        ..StateSnapshot::default()
    }
}

fn full_state() -> ConnectionState {
    ConnectionState::new(
        PROTOCOL_VERSION,
        INTERFACE_VERSION,
        Arc::new(LocalHandle::new(SESSION_TOKEN)),
        Some(ActivityLauncher::new(vec![0xCA, 0xFE])),
        SessionCommands::of([SessionCommand::new("thumbs_up")]),
        PlayerCommands::all(),
        PlayerCommands::all(),
        Extras::new(vec![1, 2, 3]),
        two_item_snapshot(),
    )
}

// =========================================================================
// Round trip
// =========================================================================

#[test]
fn round_trip_through_bytes() {
    let state = full_state();

    let bytes = JsonCodec.encode(&state.encode()).unwrap();
    let container: TaggedContainer = JsonCodec.decode(&bytes).unwrap();
    let decoded = ConnectionState::decode(&container, &resolver()).unwrap();

    assert_eq!(decoded, state);
    assert_eq!(decoded.transport_handle().token(), SESSION_TOKEN);
}

#[test]
fn accept_scenario_with_full_permission() {
    // Version 3 sender, both masks full, empty command set and extras,
    // two-item timeline: everything must arrive intact, no exclusions.
    let state = ConnectionState::new(
        3,
        INTERFACE_VERSION,
        Arc::new(LocalHandle::new(SESSION_TOKEN)),
        None,
        SessionCommands::EMPTY,
        PlayerCommands::all(),
        PlayerCommands::all(),
        Extras::EMPTY,
        two_item_snapshot(),
    );

    let decoded =
        ConnectionState::decode(&state.encode(), &resolver()).unwrap();

    assert_eq!(decoded.protocol_version(), 3);
    assert_eq!(decoded.player_commands_from_session(), PlayerCommands::all());
    assert_eq!(decoded.player_commands_from_player(), PlayerCommands::all());
    assert_eq!(decoded.snapshot().timeline.items.len(), 2);
    assert_eq!(decoded.snapshot().timeline.items[0].media_id, "intro");
    assert_eq!(decoded.snapshot().timeline.items[1].media_id, "feature");
}

#[test]
fn encoded_payload_uses_base36_wire_keys() {
    // The key layout is contractual: tags 0–8 at the top level, rendered
    // in base-36. A capture of a full payload must show exactly those.
    let json: serde_json::Value =
        serde_json::to_value(full_state().encode()).unwrap();
    let keys: Vec<&str> = json
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["0", "1", "2", "3", "4", "5", "6", "7", "8"]);
    assert_eq!(json["1"]["kind"], "ref");
    assert_eq!(json["8"]["kind"], "int");
}

// =========================================================================
// Permission projection end to end
// =========================================================================

#[test]
fn one_sided_timeline_grant_suppresses_items_but_not_container() {
    // Session grants GetTimeline, player does not: not effective.
    let state = ConnectionState::new(
        PROTOCOL_VERSION,
        INTERFACE_VERSION,
        Arc::new(LocalHandle::new(SESSION_TOKEN)),
        None,
        SessionCommands::EMPTY,
        PlayerCommands::of([PlayerCommand::GetTimeline]),
        PlayerCommands::EMPTY,
        Extras::EMPTY,
        two_item_snapshot(),
    );

    let encoded = state.encode();

    // The snapshot's timeline container is on the wire, structurally
    // valid, with its item payload suppressed.
    let snapshot_container = encoded.container(7).unwrap().unwrap();
    let timeline_container = snapshot_container.container(5).unwrap().unwrap();
    assert!(timeline_container.is_empty());

    let decoded = ConnectionState::decode(&encoded, &resolver()).unwrap();
    assert!(decoded.snapshot().timeline.items.is_empty());
    // The masks themselves still round-trip as granted.
    assert!(decoded
        .player_commands_from_session()
        .contains(PlayerCommand::GetTimeline));
    assert!(!decoded
        .effective_player_commands()
        .contains(PlayerCommand::GetTimeline));
}

#[test]
fn effective_permission_filters_each_category() {
    let state = ConnectionState::new(
        PROTOCOL_VERSION,
        INTERFACE_VERSION,
        Arc::new(LocalHandle::new(SESSION_TOKEN)),
        None,
        SessionCommands::EMPTY,
        // Session exposes timeline + metadata; player supports
        // metadata + tracks. Only metadata is effective.
        PlayerCommands::of([
            PlayerCommand::GetTimeline,
            PlayerCommand::GetMediaMetadata,
        ]),
        PlayerCommands::of([
            PlayerCommand::GetMediaMetadata,
            PlayerCommand::GetTracks,
        ]),
        Extras::EMPTY,
        two_item_snapshot(),
    );

    let decoded =
        ConnectionState::decode(&state.encode(), &resolver()).unwrap();

    assert!(decoded.snapshot().timeline.items.is_empty());
    assert_eq!(
        decoded.snapshot().metadata.as_ref().map(|m| m.title.as_str()),
        Some("Feature")
    );
}

// =========================================================================
// Default substitution
// =========================================================================

#[test]
fn minimal_payload_decodes_with_all_defaults() {
    // Only the mandatory tag 1 present: every other member defaults.
    let mut container = TaggedContainer::new();
    container.insert(1, WireValue::Ref(SESSION_TOKEN));

    let decoded = ConnectionState::decode(&container, &resolver()).unwrap();

    assert_eq!(decoded.protocol_version(), 0);
    assert_eq!(decoded.interface_version(), 0);
    assert!(decoded.activity_launcher().is_none());
    assert!(decoded.session_commands().is_empty());
    assert_eq!(decoded.player_commands_from_session(), PlayerCommands::EMPTY);
    assert_eq!(decoded.player_commands_from_player(), PlayerCommands::EMPTY);
    assert!(decoded.extras().is_empty());
    assert_eq!(*decoded.snapshot(), StateSnapshot::default());
    // Fail-closed: nothing is effective.
    assert!(decoded.effective_player_commands().is_empty());
}

// =========================================================================
// Fatal mandatory field
// =========================================================================

#[test]
fn missing_transport_handle_is_fatal() {
    // A rich payload that lacks only tag 1 must still fail.
    let full = full_state().encode();
    let mut stripped = TaggedContainer::new();
    for tag in [0u32, 2, 3, 4, 5, 6, 7, 8] {
        if let Some(value) = full.get(tag) {
            stripped.insert(tag, value.clone());
        }
    }

    let err = ConnectionState::decode(&stripped, &resolver()).unwrap_err();
    assert!(matches!(err, MalformedStateError::MissingField(_)));
}

#[test]
fn unresolvable_handle_is_fatal() {
    let mut container = TaggedContainer::new();
    container.insert(1, WireValue::Ref(HandleRef(999)));

    let err = ConnectionState::decode(&container, &resolver()).unwrap_err();
    match err {
        MalformedStateError::UnresolvedHandle(token) => {
            assert_eq!(token, HandleRef(999));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn mistyped_handle_is_fatal() {
    let mut container = TaggedContainer::new();
    container.insert(1, WireValue::Int(11));

    let err = ConnectionState::decode(&container, &resolver()).unwrap_err();
    assert!(matches!(err, MalformedStateError::InvalidField { .. }));
}

// =========================================================================
// Unknown-tag tolerance
// =========================================================================

#[test]
fn unknown_tags_are_ignored() {
    let state = full_state();
    let reference =
        ConnectionState::decode(&state.encode(), &resolver()).unwrap();

    let mut container = state.encode();
    // Tag 99 from some future schema ("2r" in base-36).
    container.insert(99, WireValue::Text("from the future".into()));
    container.insert_raw("zz", WireValue::Int(-1));

    let decoded = ConnectionState::decode(&container, &resolver()).unwrap();
    assert_eq!(decoded, reference);
}

// =========================================================================
// Immutability / purity
// =========================================================================

#[test]
fn encode_is_repeatable_and_does_not_mutate() {
    let state = full_state();
    let first = state.encode();
    let second = state.encode();
    assert_eq!(first, second);

    // Decoding twice against the same resolver yields equal values.
    let resolver = resolver();
    let a = ConnectionState::decode(&first, &resolver).unwrap();
    let b = ConnectionState::decode(&second, &resolver).unwrap();
    assert_eq!(a, b);
}
