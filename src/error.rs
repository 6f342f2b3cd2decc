use axum::{http::StatusCode, response::IntoResponse};
use std::path::PathBuf;

pub type AppResult<T> = Result<T, AppErr>;

#[derive(thiserror::Error, Debug)]
pub enum AppErr {
    #[error("template {}: {source}", path.display())]
    Template {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IntoResponse for AppErr {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("{self}");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
