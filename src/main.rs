use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chat_room::{
    config::Config,
    room::{FilePersister, Room},
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::parse();

    let (room, handle) = Room::with_intake(
        cfg.cache_capacity,
        cfg.intake_capacity,
        Box::new(FilePersister::new(&cfg.cache_file)),
    );
    tokio::spawn(room.run());  // 房間主迴圈

    let app = routes::app(AppState::new(handle, &cfg));

    let listener = tokio::net::TcpListener::bind(cfg.addr)
        .await
        .with_context(|| format!("binding {}", cfg.addr))?;
    tracing::info!("Starting web server on {}", cfg.addr);
    axum::serve(listener, app.into_make_service()).await.context("serving http")?;
    Ok(())
}
