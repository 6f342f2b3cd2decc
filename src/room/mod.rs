//! The room: one task that owns membership and the message cache.
//!
//! Everything else talks to it through a [`RoomHandle`]. Events are handled
//! one at a time, so every member sees forwarded messages in the same order
//! and the cache is only ever touched from inside [`Room::run`].
//!
//! The intake is bounded: a sender waits while the room is behind, so a
//! single connection can never queue more than one event ahead of it.

mod cache;
mod message;
mod persist;

pub use cache::MessageCache;
pub use message::{FrameKind, Message};
pub use persist::{render, CachePersister, FilePersister};

use std::{collections::HashMap, num::NonZeroUsize};

use tokio::{
    runtime,
    sync::{mpsc, oneshot},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub type ParticipantId = Uuid;

pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(10).unwrap();
pub const DEFAULT_INTAKE_CAPACITY: NonZeroUsize = NonZeroUsize::new(64).unwrap();

enum RoomEvent {
    Join { id: ParticipantId, outbox: mpsc::Sender<Message> },
    Leave(ParticipantId),
    Forward(Message),
    Snapshot(oneshot::Sender<RoomSnapshot>),
}

/// Read-only view of the room at one point of its event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub members: usize,
    pub history: Vec<Message>,
}

/// Cheap, cloneable entry point into the room's event intake.
#[derive(Clone)]
pub struct RoomHandle {
    events: mpsc::Sender<RoomEvent>,
}

impl RoomHandle {
    /// Admits `id`; forwarded messages will be pushed into `outbox`.
    ///
    /// Returns once the join is queued, so later forwards from the same
    /// caller are handled after it.
    pub async fn join(&self, id: ParticipantId, outbox: mpsc::Sender<Message>) {
        self.send(RoomEvent::Join { id, outbox }).await;
    }

    /// Removes `id` and closes its outbox. Unknown ids are ignored.
    ///
    /// Not async so it can be called from `Drop`. If the intake is full the
    /// event is handed to a spawned task instead of being lost.
    pub fn leave(&self, id: ParticipantId) {
        match self.events.try_send(RoomEvent::Leave(id)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Closed(_)) => debug!(%id, "room loop is gone, dropping leave"),
            Err(mpsc::error::TrySendError::Full(ev)) => match runtime::Handle::try_current() {
                Ok(rt) => {
                    let events = self.events.clone();
                    rt.spawn(async move {
                        let _ = events.send(ev).await;
                    });
                }
                Err(_) => warn!(%id, "no runtime to deliver leave, dropped"),
            },
        }
    }

    /// Waits for room in the intake, not for the broadcast itself.
    pub async fn forward(&self, msg: Message) {
        self.send(RoomEvent::Forward(msg)).await;
    }

    /// `None` once the room loop has stopped.
    pub async fn snapshot(&self) -> Option<RoomSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(RoomEvent::Snapshot(tx)).await;
        rx.await.ok()
    }

    async fn send(&self, ev: RoomEvent) {
        if self.events.send(ev).await.is_err() {
            debug!("room loop is gone, dropping event");
        }
    }
}

pub struct Room {
    members:   HashMap<ParticipantId, mpsc::Sender<Message>>,
    cache:     MessageCache,
    persister: Box<dyn CachePersister>,
    events:    mpsc::Receiver<RoomEvent>,
}

impl Room {
    pub fn new(
        cache_capacity: NonZeroUsize,
        persister: Box<dyn CachePersister>,
    ) -> (Self, RoomHandle) {
        Self::with_intake(cache_capacity, DEFAULT_INTAKE_CAPACITY, persister)
    }

    /// Like [`Room::new`] with an explicit bound on pending events.
    pub fn with_intake(
        cache_capacity: NonZeroUsize,
        intake_capacity: NonZeroUsize,
        persister: Box<dyn CachePersister>,
    ) -> (Self, RoomHandle) {
        let (tx, rx) = mpsc::channel(intake_capacity.get());
        let room = Self {
            members: HashMap::new(),
            cache: MessageCache::new(cache_capacity),
            persister,
            events: rx,
        };
        (room, RoomHandle { events: tx })
    }
    /// Runs until every [`RoomHandle`] has been dropped.
    pub async fn run(mut self) {
        info!(capacity = self.cache.capacity().get(), "room loop started");
        while let Some(ev) = self.events.recv().await {
            match ev {
                RoomEvent::Join { id, outbox } => self.on_join(id, outbox),
                RoomEvent::Leave(id)           => self.on_leave(id),
                RoomEvent::Forward(msg)        => self.on_forward(msg).await,
                RoomEvent::Snapshot(reply)     => {
                    let _ = reply.send(RoomSnapshot {
                        members: self.members.len(),
                        history: self.cache.to_vec(),
                    });
                }
            }
        }
        info!("room loop stopped");
    }

    fn on_join(&mut self, id: ParticipantId, outbox: mpsc::Sender<Message>) {
        self.members.insert(id, outbox);
        info!(%id, members = self.members.len(), "participant joined");
    }

    fn on_leave(&mut self, id: ParticipantId) {
        // dropping the sender closes the participant's outbox
        match self.members.remove(&id) {
            Some(_) => info!(%id, members = self.members.len(), "participant left"),
            None    => debug!(%id, "leave for unknown participant ignored"),
        }
    }

    async fn on_forward(&mut self, msg: Message) {
        let mut gone = Vec::new();
        for (id, outbox) in &self.members {
            match outbox.try_send(msg.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(%id, "outbound queue full, message dropped for this participant");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => gone.push(*id),
            }
        }
        for id in gone {
            self.members.remove(&id);
            info!(%id, members = self.members.len(), "participant outbox closed, removed");
        }

        self.cache.push(msg);
        if let Err(e) = self.persister.persist(&self.cache).await {
            error!("persisting message cache failed: {e}");
        }
    }
}
