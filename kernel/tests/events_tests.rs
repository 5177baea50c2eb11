//! Event stream tests: replay on subscribe, live events and file watching
//! over both transports.

mod common;

use common::{client, quick_settings, TestServer};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

/// Reads `data:` payloads out of an SSE response body.
struct SseReader {
    response: reqwest::Response,
    buffer: String,
}

impl SseReader {
    async fn connect(server: &TestServer) -> Self {
        let response = client().get(server.url("/events")).send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));
        Self {
            response,
            buffer: String::new(),
        }
    }

    async fn next_event(&mut self) -> Value {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                let data: Vec<&str> = frame
                    .lines()
                    .filter_map(|line| line.strip_prefix("data:"))
                    .map(str::trim_start)
                    .collect();
                if data.is_empty() {
                    continue;
                }
                return serde_json::from_str(&data.join("\n")).unwrap();
            }
            let chunk = timeout(Duration::from_secs(5), self.response.chunk())
                .await
                .expect("timed out waiting for event")
                .unwrap()
                .expect("stream ended");
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    /// Reads until the server ends the stream.
    async fn wait_for_end(&mut self) {
        loop {
            let chunk = timeout(Duration::from_secs(5), self.response.chunk())
                .await
                .expect("stream still open")
                .unwrap();
            if chunk.is_none() {
                return;
            }
        }
    }

    /// Asserts no data event arrives within `window`.
    async fn assert_quiet(&mut self, window: Duration) {
        let result = timeout(window, self.next_event()).await;
        assert!(result.is_err(), "unexpected event {:?}", result.ok());
    }
}

async fn create(server: &TestServer, body: Value) -> String {
    let body: Value = client()
        .post(server.url("/diff"))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn late_subscriber_gets_exact_replay_before_new_events() {
    let server = TestServer::start().await;
    let mut ids = Vec::new();
    for i in 0..3 {
        ids.push(
            create(
                &server,
                json!({"leftContent": format!("left {i}"), "rightContent": format!("right {i}")}),
            )
            .await,
        );
    }

    let mut events = SseReader::connect(&server).await;
    for (i, id) in ids.iter().enumerate() {
        let event = events.next_event().await;
        assert_eq!(event["type"], "diff");
        assert_eq!(event["id"], id.as_str());
        assert_eq!(event["leftContent"], format!("left {i}"));
        assert_eq!(event["rightContent"], format!("right {i}"));
    }

    let fresh = create(&server, json!({"leftContent": "new"})).await;
    let event = events.next_event().await;
    assert_eq!(event["type"], "diff");
    assert_eq!(event["id"], fresh.as_str());
}

#[tokio::test]
async fn closing_a_diff_is_announced() {
    let server = TestServer::start().await;
    let id = create(&server, json!({"leftContent": "a"})).await;

    let mut events = SseReader::connect(&server).await;
    assert_eq!(events.next_event().await["id"], id.as_str());

    client()
        .delete(server.url(&format!("/diff/{id}")))
        .send()
        .await
        .unwrap();

    let event = events.next_event().await;
    assert_eq!(event, json!({"type": "diffClosed", "id": id}));
}

#[tokio::test]
async fn disconnecting_subscriber_is_deregistered() {
    let server = TestServer::start().await;
    let events = SseReader::connect(&server).await;
    assert_eq!(server.state.broadcaster().client_count(), 1);

    drop(events);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while server.state.broadcaster().client_count() > 0 {
        assert!(tokio::time::Instant::now() < deadline, "subscriber never deregistered");
        // Publishing forces the server to notice the closed socket.
        create(&server, json!({"leftContent": "ping"})).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn touching_a_watched_file_emits_one_change() {
    let server = TestServer::start_with(quick_settings()).await;
    let dir = tempfile::tempdir().unwrap();
    let left = dir.path().join("left.txt");
    std::fs::write(&left, "v1\n").unwrap();

    let shared = json!({"leftPath": left.to_string_lossy(), "rightContent": "r"});
    let first = create(&server, shared.clone()).await;
    let second = create(&server, shared).await;
    assert_eq!(server.state.watches().watch_count(), 1);

    let mut events = SseReader::connect(&server).await;
    events.next_event().await;
    events.next_event().await;

    // Let the watcher settle before editing.
    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(&left, "v2\n").unwrap();

    let event = events.next_event().await;
    assert_eq!(event["type"], "fileChange");
    assert_eq!(event["content"], "v2\n");
    events.assert_quiet(Duration::from_millis(400)).await;

    for id in [first, second] {
        let session = server.state.session(id.parse().unwrap()).unwrap();
        assert_eq!(session.left_content.as_deref(), Some("v2\n"));
    }
}

#[tokio::test]
async fn websocket_replays_and_streams() {
    let server = TestServer::start().await;
    let id = create(&server, json!({"leftContent": "a", "rightContent": "b"})).await;

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", server.addr))
        .await
        .unwrap();

    let next_json = |msg: Message| -> Value {
        let text = msg.into_text().unwrap();
        serde_json::from_str(text.as_str()).unwrap()
    };

    let replay = timeout(Duration::from_secs(5), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let replay = next_json(replay);
    assert_eq!(replay["type"], "diff");
    assert_eq!(replay["id"], id.as_str());

    client()
        .delete(server.url(&format!("/diff/{id}")))
        .send()
        .await
        .unwrap();

    loop {
        let msg = timeout(Duration::from_secs(5), socket.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if msg.is_text() {
            assert_eq!(next_json(msg), json!({"type": "diffClosed", "id": id}));
            break;
        }
    }

    socket.send(Message::Close(None)).await.unwrap();
}

#[tokio::test]
async fn shutdown_completes_with_subscribers_attached() {
    let server = TestServer::start_with(quick_settings()).await;
    create(&server, json!({"leftContent": "a", "rightContent": "b"})).await;

    let mut events = SseReader::connect(&server).await;
    assert_eq!(events.next_event().await["type"], "diff");
    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", server.addr))
        .await
        .unwrap();
    assert!(timeout(Duration::from_secs(5), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap()
        .is_text());

    timeout(Duration::from_secs(5), server.stop())
        .await
        .expect("server did not drain")
        .unwrap();

    events.wait_for_end().await;
    loop {
        match timeout(Duration::from_secs(5), socket.next()).await.unwrap() {
            Some(Ok(msg)) if msg.is_close() => break,
            Some(Ok(_)) => {}
            Some(Err(_)) | None => break,
        }
    }
}
