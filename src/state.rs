use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};

use crate::{config::Config, room::RoomHandle, routes::page::ChatPage};

/* ------------ 共享狀態 ------------ */
#[derive(Clone)]
pub struct AppState {
    pub room:           RoomHandle,
    pub queue_capacity: NonZeroUsize,
    pub cache_file:     Arc<PathBuf>,     // what /readCache serves back
    pub page:           Arc<ChatPage>,
}

impl AppState {
    pub fn new(room: RoomHandle, cfg: &Config) -> Self {
        Self {
            room,
            queue_capacity: cfg.queue_capacity,
            cache_file:     Arc::new(cfg.cache_file.clone()),
            page:           Arc::new(ChatPage::new(cfg.templates.join("chat.html"))),
        }
    }
}
