//! A walkthrough of the connection handshake payload.
//!
//! Plays both roles in one process: a "session" side that builds and
//! encodes its connection state, and a "controller" side that decodes it
//! against a handle registry and inspects what it was allowed to see.
//! The session deliberately withholds the caption permission, so the
//! decoded snapshot arrives with the caption category emptied.
//!
//! Run with `RUST_LOG=debug` to watch the decode-side logging.

use std::sync::Arc;

use medialink_session::{
    Caption, ConnectionState, Extras, HandleTable, LocalHandle, MediaMetadata,
    PlayerCommand, PlayerCommands, SessionCommand, SessionCommands,
    StateSnapshot, Timeline, TimelineItem, INTERFACE_VERSION, PROTOCOL_VERSION,
};
use medialink_wire::{Codec, HandleRef, JsonCodec, TaggedContainer};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // -- Session side -------------------------------------------------------

    let token = HandleRef(1);

    let snapshot = StateSnapshot {
        position_ms: 63_000,
        playing: true,
        timeline: Timeline::of([
            TimelineItem {
                media_id: "episode-12".into(),
                duration_ms: 1_800_000,
            },
            TimelineItem {
                media_id: "episode-13".into(),
                duration_ms: 1_740_000,
            },
        ]),
        metadata: Some(MediaMetadata {
            title: "Episode 12".into(),
            artist: "Some Podcast".into(),
        }),
        captions: vec![Caption {
            language: "en".into(),
            text: "…and that's why tags are append-only.".into(),
        }],
        ..StateSnapshot::default()
    };

    // The session exposes everything except caption access; the player
    // supports everything. Effective permission lacks GetText, so the
    // caption category will be emptied in transit.
    let state = ConnectionState::new(
        PROTOCOL_VERSION,
        INTERFACE_VERSION,
        Arc::new(LocalHandle::new(token)),
        None,
        SessionCommands::of([SessionCommand::new("thumbs_up")]),
        PlayerCommands::all().without(PlayerCommand::GetText),
        PlayerCommands::all(),
        Extras::EMPTY,
        snapshot,
    );

    let bytes = JsonCodec.encode(&state.encode())?;
    tracing::info!(len = bytes.len(), "session encoded connection state");

    // -- Controller side ----------------------------------------------------

    let mut registry = HandleTable::new();
    registry.register(Arc::new(LocalHandle::new(token)));

    let container: TaggedContainer = JsonCodec.decode(&bytes)?;
    let received = ConnectionState::decode(&container, &registry)?;

    tracing::info!(
        protocol_version = received.protocol_version(),
        interface_version = received.interface_version(),
        handle = %received.transport_handle().token(),
        "controller decoded connection state"
    );

    for command in received.session_commands().iter() {
        tracing::info!(name = command.name(), "custom command granted");
    }

    let effective = received.effective_player_commands();
    tracing::info!(
        timeline = effective.contains(PlayerCommand::GetTimeline),
        text = effective.contains(PlayerCommand::GetText),
        "effective read permissions"
    );

    let snapshot = received.snapshot();
    tracing::info!(
        queued = snapshot.timeline.items.len(),
        title = snapshot.metadata.as_ref().map(|m| m.title.as_str()),
        captions = snapshot.captions.len(),
        "snapshot as seen by the controller"
    );

    Ok(())
}
