use std::convert::Infallible;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use axum::routing::get;
use axum::Router;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::services::EventBus;

#[derive(Clone)]
pub struct SSEState {
    pub events: EventBus,
}

pub fn sse_router(sse_state: SSEState) -> Router {
    Router::new()
        .route("/api/events", get(sse_handler))
        .with_state(sse_state)
}

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "event",
    responses(
        (status = 200, description = "Stream of snapshot, panel, automation, conflict and error events")
    )
)]
pub async fn sse_handler(State(state): State<SSEState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();

    let stream = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(event) => match Event::default().event(event.name()).json_data(&event) {
            Ok(sse_event) => Some(Ok(sse_event)),
            Err(e) => {
                tracing::error!("Failed to encode {} event: {}", event.name(), e);
                None
            }
        },
        Err(e) => {
            tracing::warn!("event stream lagged: {}", e);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
