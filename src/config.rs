use std::{net::SocketAddr, num::NonZeroUsize, path::PathBuf};

use clap::Parser;

use crate::{
    participant::DEFAULT_QUEUE_CAPACITY,
    room::{DEFAULT_CACHE_CAPACITY, DEFAULT_INTAKE_CAPACITY},
};

/// Start-up settings. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Parser)]
#[command(name = "chat_room", about = "Single-room WebSocket chat with a mirrored message cache")]
pub struct Config {
    /// The addr of the application.
    #[arg(long, env = "CHAT_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// Flat file mirroring the recent-message cache.
    #[arg(long, env = "CHAT_CACHE_FILE", default_value = "cache.txt")]
    pub cache_file: PathBuf,

    /// How many recent messages the room keeps.
    #[arg(long, env = "CHAT_CACHE_CAPACITY", default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: NonZeroUsize,

    /// Outbound queue size per participant; overflow is dropped.
    #[arg(long, env = "CHAT_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: NonZeroUsize,

    /// Events the room accepts before senders have to wait.
    #[arg(long, env = "CHAT_INTAKE_CAPACITY", default_value_t = DEFAULT_INTAKE_CAPACITY)]
    pub intake_capacity: NonZeroUsize,

    /// Directory holding chat.html.
    #[arg(long, env = "CHAT_TEMPLATES", default_value = "templates")]
    pub templates: PathBuf,
}
