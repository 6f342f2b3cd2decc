use axum::{http::Method, Extension, Router};
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};

use crate::state::AppState;

pub mod cache;
pub mod page;
pub mod ws;

pub fn router() -> Router {
    Router::new()
        .merge(page::router())
        .merge(cache::router())
        .merge(ws::router())
}

/// Full application: routes plus the shared state and middleware.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::HEAD]);

    router()
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
