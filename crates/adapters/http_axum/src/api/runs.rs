//! Server-Sent Events stream of run signals.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

use ordercron_app::ports::AutomationStore;

use crate::state::AppState;

/// `GET /api/runs/stream`: one `run` event per fired automation.
///
/// Only signals emitted after the client connects are sent. A client that
/// falls behind skips the signals it missed.
pub async fn stream<S>(
    State(state): State<AppState<S>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: AutomationStore + Send + Sync + 'static,
{
    let runs = BroadcastStream::new(state.run_bus.subscribe()).filter_map(|result| match result {
        Ok(signal) => match serde_json::to_string(&signal) {
            Ok(json) => Some(Ok(Event::default().event("run").data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize run signal for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged, run signals dropped");
            None
        }
    });

    Sse::new(runs).keep_alive(KeepAlive::default())
}
