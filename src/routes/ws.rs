use axum::{
    extract::{ws::{WebSocket, WebSocketUpgrade}, Extension},
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::stream::StreamExt;

use crate::{participant::Participant, state::AppState};

pub fn router() -> Router {
    Router::new().route("/room", get(ws_handler))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    ws.on_failed_upgrade(|e| tracing::warn!("websocket upgrade failed: {e}"))
        .on_upgrade(move |sock| user_ws(sock, state))
}

/* ---------------- per user ---------------- */
async fn user_ws(sock: WebSocket, state: AppState) {
    let participant = Participant::join(&state.room, state.queue_capacity).await;
    tracing::debug!(id = %participant.id(), "websocket session opened");

    let (sink, stream) = sock.split();
    participant.serve(stream, sink).await;
}
