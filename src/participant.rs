//! One connected session, bridging a WebSocket to the room.

use std::{fmt::Display, num::NonZeroUsize};

use axum::extract::ws::{close_code, CloseFrame, Message as WsMessage};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::room::{FrameKind, Message, ParticipantId, RoomHandle};

pub const DEFAULT_QUEUE_CAPACITY: NonZeroUsize = NonZeroUsize::new(256).unwrap();

pub struct Participant {
    id:     ParticipantId,
    room:   RoomHandle,
    outbox: mpsc::Receiver<Message>,
}

/// Registration in the room; signals leave when dropped, whatever the exit path.
struct Membership {
    id:   ParticipantId,
    room: RoomHandle,
}

impl Drop for Membership {
    fn drop(&mut self) {
        self.room.leave(self.id);
    }
}

impl Participant {
    /// Creates the outbound queue and asks the room to admit it.
    ///
    /// The join is queued before this returns, so it is handled ahead of
    /// anything the participant forwards.
    pub async fn join(room: &RoomHandle, queue_capacity: NonZeroUsize) -> Self {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(queue_capacity.get());
        room.join(id, tx).await;
        Self { id, room: room.clone(), outbox: rx }
    }

    pub fn id(&self) -> ParticipantId { self.id }

    /// Runs both relays until either side of the connection is done.
    ///
    /// Leave is signalled exactly once, after which the outbound relay drains
    /// what is left in the queue and sends a close frame.
    pub async fn serve<S, E, K>(self, stream: S, sink: K)
    where
        S: Stream<Item = Result<WsMessage, E>> + Unpin,
        E: Display,
        K: Sink<WsMessage> + Unpin + Send + 'static,
        K::Error: Display + Send,
    {
        let Participant { id, room, outbox } = self;
        let membership = Membership { id, room: room.clone() };

        let mut outbound = tokio::spawn(write_loop(id, outbox, sink));

        let outbound_done = tokio::select! {
            () = read_loop(id, &room, stream) => false,
            res = &mut outbound => {
                if let Err(e) = res {
                    warn!(%id, "outbound relay aborted: {e}");
                }
                true
            }
        };

        drop(membership);
        if !outbound_done {
            if let Err(e) = outbound.await {
                warn!(%id, "outbound relay aborted: {e}");
            }
        }
        info!(%id, "connection finished");
    }
}

/* ---------------- inbound: socket -> room ----------------
 * Each forward waits for a slot in the room's intake, so at most one
 * message per connection is in flight towards the room.
 */
async fn read_loop<S, E>(id: ParticipantId, room: &RoomHandle, mut stream: S)
where
    S: Stream<Item = Result<WsMessage, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => room.forward(Message::text(text)).await,
            Ok(WsMessage::Binary(data)) => room.forward(Message::binary(data)).await,
            Ok(WsMessage::Close(_)) => {
                debug!(%id, "close frame from client");
                return;
            }
            // axum answers pings itself
            Ok(WsMessage::Ping(_) | WsMessage::Pong(_)) => {}
            Err(e) => {
                debug!(%id, "read failed: {e}");
                return;
            }
        }
    }
    debug!(%id, "client stream ended");
}

/* ---------------- outbound: queue -> socket ---------------- */
async fn write_loop<K>(id: ParticipantId, mut outbox: mpsc::Receiver<Message>, mut sink: K)
where
    K: Sink<WsMessage> + Unpin,
    K::Error: Display,
{
    while let Some(msg) = outbox.recv().await {
        if let Err(e) = sink.send(to_frame(msg)).await {
            warn!(%id, "write failed: {e}");
            return;
        }
    }

    let bye = WsMessage::Close(Some(CloseFrame { code: close_code::NORMAL, reason: "".into() }));
    if let Err(e) = sink.send(bye).await {
        debug!(%id, "close frame not sent: {e}");
    }
    let _ = sink.close().await;
}

fn to_frame(msg: Message) -> WsMessage {
    let data = msg.payload().to_vec();
    match msg.kind() {
        FrameKind::Binary => WsMessage::Binary(data),
        FrameKind::Text   => match String::from_utf8(data) {
            Ok(text) => WsMessage::Text(text),
            Err(e)   => WsMessage::Binary(e.into_bytes()),
        },
    }
}
