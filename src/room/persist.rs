use std::{io, path::PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::MessageCache;

/// Mirrors the message cache somewhere durable.
///
/// Called by the room after every accepted message, before the next event is
/// handled. Failures are reported back to the room, which only logs them.
#[async_trait]
pub trait CachePersister: Send + Sync {
    async fn persist(&self, cache: &MessageCache) -> io::Result<()>;
}

/// Writes the cache as a flat file, one message per line.
///
/// Every call truncates and rewrites the whole file.
#[derive(Debug, Clone)]
pub struct FilePersister {
    path: PathBuf,
}

impl FilePersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// One message per line, each terminated by `\n`.
pub fn render(cache: &MessageCache) -> Vec<u8> {
    let size = cache.iter().map(|m| m.payload().len() + 1).sum();
    let mut buf = Vec::with_capacity(size);
    for msg in cache.iter() {
        buf.extend_from_slice(msg.payload());
        buf.push(b'\n');
    }
    buf
}

#[async_trait]
impl CachePersister for FilePersister {
    async fn persist(&self, cache: &MessageCache) -> io::Result<()> {
        fs::write(&self.path, render(cache)).await
    }
}
