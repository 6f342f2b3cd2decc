use axum::{extract::Extension, http::StatusCode, routing::get, Router};
use tokio::fs;

use crate::state::AppState;

pub fn router() -> Router {
    Router::new().route("/readCache", get(read_cache))
}

/// Whatever the persister last wrote, verbatim. A missing or unreadable file
/// is served as an empty body.
async fn read_cache(Extension(state): Extension<AppState>) -> (StatusCode, Vec<u8>) {
    let body = fs::read(state.cache_file.as_path()).await.unwrap_or_else(|e| {
        tracing::warn!(path = %state.cache_file.display(), "reading cache file failed: {e}");
        Vec::new()
    });
    (StatusCode::OK, body)
}
