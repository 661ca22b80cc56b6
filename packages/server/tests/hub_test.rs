//! End-to-end tests: the router served on an ephemeral port, driven over real
//! WebSocket and HTTP connections.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use veranda_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{ConnectionTable, InMemoryParticipantRegistry, SqliteMessageRepository},
    },
    ui::{AppState, Server, SessionConfig},
};
use veranda_shared::time::SystemClock;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Helper struct to manage an in-process hub
struct TestHub {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<std::io::Result<()>>>,
}

impl TestHub {
    async fn start() -> Self {
        Self::start_with(SessionConfig::default()).await
    }

    async fn start_with(session_config: SessionConfig) -> Self {
        let clock = Arc::new(SystemClock);
        let repository = SqliteMessageRepository::in_memory(clock.clone())
            .await
            .expect("Failed to create message store");
        let table = ConnectionTable::shared();
        let app_state = AppState::new(
            Arc::new(InMemoryParticipantRegistry::new(table.clone(), clock)),
            Arc::new(repository),
            Arc::new(WebSocketMessagePusher::new(table)),
            session_config,
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let (tx, rx) = oneshot::channel::<()>();
        let server = tokio::spawn(Server::new(app_state).serve(listener, async move {
            let _ = rx.await;
        }));

        TestHub {
            addr,
            shutdown: Some(tx),
            server: Some(server),
        }
    }

    /// Trigger graceful shutdown; true if the server finished within `within`
    async fn stop(&mut self, within: Duration) -> bool {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.server.take() {
            Some(server) => matches!(
                tokio::time::timeout(within, server).await,
                Ok(Ok(Ok(())))
            ),
            None => true,
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn connect(&self) -> Client {
        let (client, _) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect");
        client
    }

    /// Connect and wait until the hub has announced this connection.
    ///
    /// The join notice is broadcast after registration, so once it arrives the
    /// connection is visible to every reporting endpoint.
    async fn join(&self) -> (Client, serde_json::Value) {
        let mut client = self.connect().await;
        let history = next_json(&mut client).await;
        assert_eq!(history["type"], "history");
        let joined = next_of_type(&mut client, "system").await;
        assert_eq!(joined["text"], "Guest connected");
        (client, history)
    }
}

impl Drop for TestHub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Next text frame as JSON, skipping transport frames
async fn next_json(client: &mut Client) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Connection closed")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
        }
    }
}

/// Read frames until one of the given `type` arrives
async fn next_of_type(client: &mut Client, kind: &str) -> serde_json::Value {
    loop {
        let frame = next_json(client).await;
        if frame["type"] == kind {
            return frame;
        }
    }
}

/// Keep `client` active with `ping` frames until a system notice with `text` arrives
async fn wait_for_notice_while_active(client: &mut Client, text: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        assert!(
            tokio::time::Instant::now() < deadline,
            "Timed out waiting for '{}'",
            text
        );
        send(client, serde_json::json!({"type": "ping"})).await;
        if let Ok(Some(Ok(Message::Text(raw)))) =
            tokio::time::timeout(Duration::from_millis(50), client.next()).await
        {
            let frame: serde_json::Value = serde_json::from_str(raw.as_str()).unwrap();
            if frame["type"] == "system" && frame["text"] == text {
                return;
            }
        }
    }
}

/// Skip queued text frames and report whether the server ended the connection
async fn closed_by_server(client: &mut Client) -> bool {
    loop {
        match tokio::time::timeout(Duration::from_secs(2), client.next()).await {
            Ok(Some(Ok(Message::Text(_)))) | Ok(Some(Ok(Message::Ping(_)))) => continue,
            Ok(Some(Ok(Message::Close(_)))) | Ok(Some(Err(_))) | Ok(None) => return true,
            Ok(Some(Ok(_))) => continue,
            Err(_) => return false,
        }
    }
}

async fn send(client: &mut Client, frame: serde_json::Value) {
    client
        .send(Message::text(frame.to_string()))
        .await
        .expect("Failed to send frame");
}

#[tokio::test]
async fn test_history_is_first_frame_and_chat_is_broadcast() {
    // テスト項目: 最初のフレームは history で、チャットは全員に届く
    // given (前提条件):
    let hub = TestHub::start().await;
    let (mut alice, history) = hub.join().await;
    assert_eq!(history["messages"].as_array().unwrap().len(), 0);

    send(&mut alice, serde_json::json!({"type": "set_nick", "nick": "alice"})).await;
    let renamed = next_of_type(&mut alice, "system").await;
    assert_eq!(renamed["text"], "Guest -> alice");

    let (mut bob, _) = hub.join().await;

    // when (操作):
    send(&mut alice, serde_json::json!({"type": "message", "text": "hi bob"})).await;

    // then (期待する結果):
    for client in [&mut alice, &mut bob] {
        let message = next_of_type(client, "message").await;
        assert_eq!(message["nick"], "alice");
        assert_eq!(message["text"], "hi bob");
        assert!(message["time_ms"].as_i64().unwrap() > 0);
    }
}

#[tokio::test]
async fn test_backlog_replayed_to_late_joiner() {
    // テスト項目: 後から接続した参加者に過去のメッセージが古い順に届く
    // given (前提条件):
    let hub = TestHub::start().await;
    let (mut alice, _) = hub.join().await;
    for text in ["one", "two", "three"] {
        send(&mut alice, serde_json::json!({"type": "message", "text": text})).await;
        next_of_type(&mut alice, "message").await;
    }

    // when (操作):
    let mut bob = hub.connect().await;

    // then (期待する結果):
    let history = next_json(&mut bob).await;
    assert_eq!(history["type"], "history");
    let texts: Vec<&str> = history["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_ping_gets_pong() {
    // テスト項目: ping フレームに pong が返る
    // given (前提条件):
    let hub = TestHub::start().await;
    let (mut alice, _) = hub.join().await;

    // when (操作):
    send(&mut alice, serde_json::json!({"type": "ping"})).await;

    // then (期待する結果):
    let pong = next_of_type(&mut alice, "pong").await;
    assert!(pong["time_ms"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_admin_state_and_disconnect_notice() {
    // テスト項目: 管理 API が接続状況を返し、切断で退出通知と件数減少が起きる
    // given (前提条件):
    let hub = TestHub::start().await;
    let (mut alice, _) = hub.join().await;
    send(&mut alice, serde_json::json!({"type": "set_nick", "nick": "alice"})).await;
    send(&mut alice, serde_json::json!({"type": "message", "text": "hello"})).await;
    next_of_type(&mut alice, "message").await;
    let (mut bob, _) = hub.join().await;

    let http = reqwest::Client::new();
    let state: serde_json::Value = http
        .get(hub.http_url("/api/admin/state"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["ok"], true);
    assert_eq!(state["clients_count"], 2);
    assert_eq!(state["clients"][0]["nick"], "alice");
    assert_eq!(state["clients"][1]["nick"], "Guest");
    assert_eq!(state["messages_count"], 1);

    // when (操作):
    alice.close(None).await.unwrap();

    // then (期待する結果):
    let left = loop {
        let notice = next_of_type(&mut bob, "system").await;
        if notice["text"] == "alice disconnected" {
            break notice;
        }
    };
    assert_eq!(left["type"], "system");
    let participants: serde_json::Value = http
        .get(hub.http_url("/api/participants"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(participants["count"], 1);
}

#[tokio::test]
async fn test_messages_endpoint_limit() {
    // テスト項目: /api/messages が limit を尊重し古い順で返す
    // given (前提条件):
    let hub = TestHub::start().await;
    let (mut alice, _) = hub.join().await;
    for i in 0..5 {
        send(&mut alice, serde_json::json!({"type": "message", "text": format!("m{}", i)})).await;
        next_of_type(&mut alice, "message").await;
    }

    // when (操作):
    let body: serde_json::Value = reqwest::get(hub.http_url("/api/messages?limit=2"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body["count"], 2);
    assert_eq!(body["messages"][0]["text"], "m3");
    assert_eq!(body["messages"][1]["text"], "m4");

    let health: serde_json::Value = reqwest::get(hub.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn test_joined_connection_is_listed_immediately() {
    // テスト項目: 参加通知を受け取った時点で、参加者一覧に必ず含まれている
    // given (前提条件):
    let hub = TestHub::start().await;
    let http = reqwest::Client::new();
    let mut clients = Vec::new();

    for expected in 1..=20 {
        // when (操作):
        let (client, _) = hub.join().await;
        clients.push(client);

        // then (期待する結果):
        let participants: serde_json::Value = http
            .get(hub.http_url("/api/participants"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(participants["count"], expected);
    }
}

#[tokio::test]
async fn test_silent_connection_is_closed_after_idle_timeout() {
    // テスト項目: 何も送らない接続はアイドルタイムアウトで閉じられ、
    //             他の参加者に退出通知が届き、参加者数が減る
    // given (前提条件):
    let hub = TestHub::start_with(SessionConfig {
        heartbeat_interval: Duration::from_secs(25),
        idle_timeout: Duration::from_millis(300),
    })
    .await;
    let (mut silent, _) = hub.join().await;
    send(&mut silent, serde_json::json!({"type": "set_nick", "nick": "silent"})).await;
    assert_eq!(
        next_of_type(&mut silent, "system").await["text"],
        "Guest -> silent"
    );
    let (mut active, _) = hub.join().await;

    // when (操作): active だけが送信を続ける
    wait_for_notice_while_active(&mut active, "silent disconnected").await;

    // then (期待する結果):
    let participants: serde_json::Value = reqwest::get(hub.http_url("/api/participants"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(participants["count"], 1);
    assert_eq!(participants["participants"][0]["nick"], "Guest");
    assert!(closed_by_server(&mut silent).await);
}

#[tokio::test]
async fn test_server_sends_heartbeat_pings() {
    // テスト項目: サーバーは heartbeat 間隔で WebSocket の Ping を送る
    // given (前提条件):
    let hub = TestHub::start_with(SessionConfig {
        heartbeat_interval: Duration::from_millis(100),
        idle_timeout: Duration::from_secs(5),
    })
    .await;
    let (mut alice, _) = hub.join().await;

    // when (操作):
    let ping = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match alice.next().await {
                Some(Ok(Message::Ping(_))) => return true,
                Some(Ok(_)) => continue,
                _ => return false,
            }
        }
    })
    .await;

    // then (期待する結果):
    assert!(matches!(ping, Ok(true)));
}

#[tokio::test]
async fn test_shutdown_closes_open_sessions() {
    // テスト項目: サーバー停止時、開いている接続は閉じられ、サーバーは停止を完了する
    // given (前提条件):
    let mut hub = TestHub::start().await;
    let (mut alice, _) = hub.join().await;
    let (mut bob, _) = hub.join().await;

    // when (操作):
    let stopped = hub.stop(Duration::from_secs(3)).await;

    // then (期待する結果):
    assert!(stopped);
    assert!(closed_by_server(&mut alice).await);
    assert!(closed_by_server(&mut bob).await);
}
