use std::{net::SocketAddr, time::Duration};

use chat_room::{
    config::Config,
    room::{FilePersister, Room, RoomHandle},
    routes,
    state::AppState,
};
use clap::Parser;
use futures::{SinkExt, StreamExt};
use tempfile::TempDir;
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    room: RoomHandle,
    _dir: TempDir,
}

async fn spawn_server(cache_capacity: &str) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("chat.html"), "<script>new WebSocket(\"ws://{{host}}/room\")</script>").unwrap();

    let cfg = Config::try_parse_from([
        "chat_room",
        "--addr", "127.0.0.1:0",
        "--cache-capacity", cache_capacity,
        "--cache-file", dir.path().join("cache.txt").to_str().unwrap(),
        "--templates", dir.path().to_str().unwrap(),
    ])
    .unwrap();

    let (room, handle) = Room::new(cfg.cache_capacity, Box::new(FilePersister::new(&cfg.cache_file)));
    tokio::spawn(room.run());

    let listener = tokio::net::TcpListener::bind(cfg.addr).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::app(AppState::new(handle.clone(), &cfg));
    tokio::spawn(async move { axum::serve(listener, app.into_make_service()).await.unwrap() });

    TestServer { addr, room: handle, _dir: dir }
}

impl TestServer {
    async fn connect(&self) -> Client {
        let (ws, _) = connect_async(format!("ws://{}/room", self.addr)).await.unwrap();
        ws
    }

    async fn get(&self, path: &str) -> String {
        reqwest::get(format!("http://{}{}", self.addr, path)).await.unwrap().text().await.unwrap()
    }

    /// Waits until the room has processed everything sent so far and holds `n` members.
    async fn wait_for_members(&self, n: usize) {
        timeout(Duration::from_secs(2), async {
            while self.room.snapshot().await.unwrap().members != n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("member count never reached");
    }
}

async fn next_text(ws: &mut Client) -> String {
    let msg = timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for message")
        .expect("stream ended")
        .unwrap();
    match msg {
        Message::Text(text) => text,
        other => panic!("unexpected frame {other:?}"),
    }
}

#[tokio::test]
async fn message_from_one_client_reaches_every_client_and_the_cache_file() {
    let server = spawn_server("10").await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    server.wait_for_members(2).await;

    alice.send(Message::Text("hello".into())).await.unwrap();

    assert_eq!(next_text(&mut alice).await, "hello");
    assert_eq!(next_text(&mut bob).await, "hello");

    server.wait_for_members(2).await;
    assert_eq!(server.get("/readCache").await, "hello\n");
}

#[tokio::test]
async fn cache_file_keeps_only_the_most_recent_messages() {
    let server = spawn_server("2").await;
    let mut client = server.connect().await;
    server.wait_for_members(1).await;

    for m in ["a", "b", "c"] {
        client.send(Message::Text(m.into())).await.unwrap();
    }
    for m in ["a", "b", "c"] {
        assert_eq!(next_text(&mut client).await, m);
    }

    server.wait_for_members(1).await;
    assert_eq!(server.get("/readCache").await, "b\nc\n");
}

#[tokio::test]
async fn closing_a_client_removes_it_from_the_room() {
    let server = spawn_server("10").await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    server.wait_for_members(2).await;

    alice.close(None).await.unwrap();
    server.wait_for_members(1).await;

    bob.send(Message::Text("anyone?".into())).await.unwrap();
    assert_eq!(next_text(&mut bob).await, "anyone?");
}

#[tokio::test]
async fn read_cache_is_empty_before_any_message() {
    let server = spawn_server("10").await;

    assert_eq!(server.get("/readCache").await, "");
}

#[tokio::test]
async fn index_page_points_the_socket_at_the_request_host() {
    let server = spawn_server("10").await;

    let page = server.get("/").await;

    assert!(page.contains(&format!("ws://{}/room", server.addr)), "{page}");
}
