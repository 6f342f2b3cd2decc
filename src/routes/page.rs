use std::path::PathBuf;

use axum::{
    extract::Extension,
    http::{header::HOST, HeaderMap},
    response::Html,
    routing::get,
    Router,
};
use tokio::{fs, sync::OnceCell};

use crate::{
    error::{AppErr, AppResult},
    state::AppState,
};

const HOST_SLOT: &str = "{{host}}";

/// The chat page template, read from disk on first use and kept afterwards.
pub struct ChatPage {
    path:   PathBuf,
    source: OnceCell<String>,
}

impl ChatPage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), source: OnceCell::new() }
    }

    /// Renders the page for a client that reached us through `host`.
    pub async fn render(&self, host: &str) -> AppResult<String> {
        let source = self
            .source
            .get_or_try_init(|| async {
                fs::read_to_string(&self.path)
                    .await
                    .map_err(|source| AppErr::Template { path: self.path.clone(), source })
            })
            .await?;
        Ok(source.replace(HOST_SLOT, host))
    }
}

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> AppResult<Html<String>> {
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    Ok(Html(state.page.render(host).await?))
}
