//! End-to-end tests driving the client against an in-process controller.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_util::sync::CancellationToken;

use recall_client::{ClientConfig, ClientHandle, ConnectionManager, ConnectionState};
use recall_protocol::Command;
use recall_surface::testing::{RecordingProvider, SurfaceCall};

const TIMEOUT: Duration = Duration::from_secs(5);

struct Controller {
    listener: TcpListener,
    seen_path: Arc<Mutex<String>>,
}

impl Controller {
    async fn bind() -> Self {
        Self {
            listener: TcpListener::bind("127.0.0.1:0").await.unwrap(),
            seen_path: Arc::new(Mutex::new(String::new())),
        }
    }

    fn host(&self) -> String {
        self.listener.local_addr().unwrap().to_string()
    }

    /// Accept the next client session and complete the WebSocket upgrade.
    async fn accept(&self) -> WebSocketStream<TcpStream> {
        let (stream, _) = timeout(TIMEOUT, self.listener.accept())
            .await
            .expect("client should connect")
            .unwrap();
        let seen = Arc::clone(&self.seen_path);
        let callback = move |req: &Request, resp: Response| {
            *seen.lock() = req.uri().path().to_string();
            Ok(resp)
        };
        accept_hdr_async(stream, callback).await.unwrap()
    }

    fn seen_path(&self) -> String {
        self.seen_path.lock().clone()
    }
}

fn boot_client(
    host: String,
    provider: RecordingProvider,
) -> (ClientHandle, CancellationToken, tokio::task::JoinHandle<()>) {
    let config = ClientConfig {
        host,
        reconnect_delay_ms: 50,
        position_poll_ms: 10,
        ..ClientConfig::default()
    };
    let manager = ConnectionManager::new(config, provider);
    let handle = manager.handle();
    let cancel = CancellationToken::new();
    let run = tokio::spawn(manager.run(cancel.clone()));
    (handle, cancel, run)
}

async fn read_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    let msg = timeout(TIMEOUT, ws.next())
        .await
        .expect("frame should arrive")
        .expect("stream should be open")
        .unwrap();
    msg.into_text().unwrap().as_str().to_string()
}

async fn wait_until(mut predicate: impl FnMut() -> bool) {
    for _ in 0..500 {
        if predicate() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 5s");
}

#[tokio::test]
async fn handshake_then_commands_route_to_surface() {
    let controller = Controller::bind().await;
    let provider = RecordingProvider::new();
    let surface = provider.surface();
    let (handle, cancel, run) = boot_client(controller.host(), provider);

    let mut ws = controller.accept().await;
    assert_eq!(controller.seen_path(), "/ws_recall");

    // Legacy greeting: a double-encoded JSON string, sent exactly once.
    assert_eq!(read_text(&mut ws).await, "\"{msg:'HELLO'}\"");

    {
        let handle = handle.clone();
        wait_until(move || handle.state() == ConnectionState::Open).await;
    }
    assert_eq!(handle.reconnect_count(), 0);

    ws.send(Message::Text(r#"{"type":"playVideo"}"#.into()))
        .await
        .unwrap();
    {
        let surface = Arc::clone(&surface);
        wait_until(move || surface.calls().contains(&SurfaceCall::Play)).await;
    }

    // Controller chatter that is not valid JSON must not disturb anything.
    ws.send(Message::Text("Broadcast: {\"type\":\"pauseVideo\"}".into()))
        .await
        .unwrap();
    ws.send(Message::Text(r#"{"type":"pauseVideo"}"#.into()))
        .await
        .unwrap();
    {
        let surface = Arc::clone(&surface);
        wait_until(move || surface.calls().contains(&SurfaceCall::Pause)).await;
    }
    assert_eq!(surface.calls(), vec![SurfaceCall::Play, SurfaceCall::Pause]);

    cancel.cancel();
    run.await.unwrap();
}

#[tokio::test]
async fn reconnects_once_per_close_forever() {
    let controller = Controller::bind().await;
    let provider = RecordingProvider::new();
    let (handle, cancel, run) = boot_client(controller.host(), provider);

    // Session one.
    let mut ws = controller.accept().await;
    assert_eq!(read_text(&mut ws).await, "\"{msg:'HELLO'}\"");
    drop(ws);

    // Session two, after exactly one scheduled reconnect.
    let mut ws = controller.accept().await;
    assert_eq!(read_text(&mut ws).await, "\"{msg:'HELLO'}\"");
    assert_eq!(handle.reconnect_count(), 1);
    drop(ws);

    // Session three: the client retries indefinitely.
    let mut ws = controller.accept().await;
    assert_eq!(read_text(&mut ws).await, "\"{msg:'HELLO'}\"");
    assert_eq!(handle.reconnect_count(), 2);

    cancel.cancel();
    run.await.unwrap();
}

#[tokio::test]
async fn interval_watch_clamps_through_position_polling() {
    let controller = Controller::bind().await;
    let provider = RecordingProvider::new();
    let surface = provider.surface();
    let (_handle, cancel, run) = boot_client(controller.host(), provider);

    let mut ws = controller.accept().await;
    let _hello = read_text(&mut ws).await;

    ws.send(Message::Text(
        r#"{"type":"updateVideoInterval","start":10,"end":20}"#.into(),
    ))
    .await
    .unwrap();
    {
        let surface = Arc::clone(&surface);
        wait_until(move || surface.is_playing()).await;
    }

    // Playback progresses past the interval end; the watch pauses and clamps.
    surface.set_position(25.0);
    {
        let surface = Arc::clone(&surface);
        wait_until(move || !surface.is_playing()).await;
    }
    assert!((surface.current_position() - 20.0).abs() < f64::EPSILON);

    cancel.cancel();
    run.await.unwrap();
}

#[tokio::test]
async fn outbound_send_is_best_effort() {
    let controller = Controller::bind().await;
    let provider = RecordingProvider::new();
    let (handle, cancel, run) = boot_client(controller.host(), provider);

    let mut ws = controller.accept().await;
    let _hello = read_text(&mut ws).await;
    {
        let handle = handle.clone();
        wait_until(move || handle.state() == ConnectionState::Open).await;
    }

    // While open, frames reach the controller.
    assert!(handle.send(&Command::PauseVideo));
    assert_eq!(read_text(&mut ws).await, r#"{"type":"pauseVideo"}"#);

    // After close, sends are dropped, not queued for the next session.
    drop(ws);
    {
        let handle = handle.clone();
        wait_until(move || handle.state() != ConnectionState::Open).await;
    }
    assert!(!handle.send(&Command::PlayVideo));

    let mut ws = controller.accept().await;
    assert_eq!(read_text(&mut ws).await, "\"{msg:'HELLO'}\"");
    // Nothing but the greeting arrives on the fresh session.
    let nothing = timeout(Duration::from_millis(200), ws.next()).await;
    assert!(nothing.is_err(), "no stale outbound frames expected");

    cancel.cancel();
    run.await.unwrap();
}
