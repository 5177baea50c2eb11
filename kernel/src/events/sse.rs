//! Server-Sent Events transport for `GET /events`.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use tracing::{info, warn};

use crate::events::types::{ClientId, ServerEvent};
use crate::host::MeldState;

/// Opens an event stream: replays every open session, then forwards live
/// events until the client disconnects, falls behind, or the daemon shuts
/// down.
pub async fn handle_events(
    State(state): State<MeldState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let client_id = ClientId::generate();
    let (replay, receiver) = state.subscribe();
    info!(client_id = %client_id, replayed = replay.len(), "Event stream opened");

    let live = stream::unfold(receiver, move |mut rx| async move {
        match rx.recv().await {
            Ok(event) => Some((event, rx)),
            Err(e) => {
                info!(client_id = %client_id, reason = %e, "Event stream ended");
                None
            }
        }
    });

    let events = stream::iter(replay)
        .chain(live)
        .take_until(state.streams_closed())
        .filter_map(move |event| async move {
            to_sse_event(client_id, &event).map(Ok::<Event, Infallible>)
        });

    Sse::new(events).keep_alive(KeepAlive::new().interval(state.keep_alive()))
}

fn to_sse_event(client_id: ClientId, event: &ServerEvent) -> Option<Event> {
    match event.to_frame_payload() {
        Ok(payload) => Some(Event::default().data(payload)),
        Err(e) => {
            warn!(client_id = %client_id, kind = event.kind(), error = %e, "Dropping unserializable event");
            None
        }
    }
}
