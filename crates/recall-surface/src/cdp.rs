//! DevTools page session — thin client over `tokio-tungstenite`.
//!
//! Only implements the protocol subset this agent needs: `Runtime.evaluate`
//! against an already-running page. The session does not launch or own the
//! browser; it attaches to a page the hosting environment provides.

use std::collections::HashMap;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace, warn};

use crate::error::SurfaceError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Pending protocol command waiting for its response.
type PendingTx = oneshot::Sender<Result<Value, String>>;

/// How long a single protocol call may take before it is abandoned.
const CDP_TIMEOUT_MS: u64 = 10_000;

/// Internal protocol command message.
struct CdpCommand {
    method: String,
    params: Value,
    response_tx: PendingTx,
}

/// A DevTools session attached to the page holding the playback surface.
pub struct PageSession {
    cmd_tx: mpsc::Sender<CdpCommand>,
    _driver: JoinHandle<()>,
}

impl PageSession {
    /// Attach to a page via its DevTools WebSocket URL.
    pub async fn connect(ws_url: &str) -> Result<Self, SurfaceError> {
        let (ws, _) = connect_async(ws_url)
            .await
            .map_err(|e| SurfaceError::Session(format!("DevTools connect: {e}")))?;
        debug!(%ws_url, "attached to page");

        let (cmd_tx, cmd_rx) = mpsc::channel::<CdpCommand>(16);
        let driver = tokio::spawn(cdp_driver_loop(ws, cmd_rx));

        Ok(Self {
            cmd_tx,
            _driver: driver,
        })
    }

    /// Attach to the first debuggable page advertised on `host:port`.
    pub async fn discover(host: &str, port: u16) -> Result<Self, SurfaceError> {
        let url = format!("http://{host}:{port}/json");
        let resp = reqwest::get(&url)
            .await
            .map_err(|e| SurfaceError::Session(format!("DevTools discovery: {e}")))?;
        let pages: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| SurfaceError::Session(format!("DevTools discovery: {e}")))?;

        let ws_url = pages
            .iter()
            .find_map(|page| page["webSocketDebuggerUrl"].as_str())
            .ok_or_else(|| {
                SurfaceError::Session(format!("no debuggable page on {host}:{port}"))
            })?;
        Self::connect(ws_url).await
    }

    /// Evaluate a JavaScript expression in the page and return its value.
    ///
    /// Promises are awaited; an in-page exception maps to
    /// [`SurfaceError::Evaluate`].
    pub async fn evaluate(&self, expression: &str) -> Result<Value, SurfaceError> {
        let result = self
            .send_cdp(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;
        if let Some(exception) = result.get("exceptionDetails") {
            let msg = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("evaluation error");
            return Err(SurfaceError::Evaluate(msg.into()));
        }
        Ok(result["result"]["value"].clone())
    }

    async fn send_cdp(&self, method: &str, params: Value) -> Result<Value, SurfaceError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(CdpCommand {
                method: method.into(),
                params,
                response_tx: tx,
            })
            .await
            .map_err(|_| SurfaceError::Session("session driver closed".into()))?;

        let result = tokio::time::timeout(Duration::from_millis(CDP_TIMEOUT_MS), rx)
            .await
            .map_err(|_| SurfaceError::Timeout {
                timeout_ms: CDP_TIMEOUT_MS,
                context: method.to_string(),
            })?
            .map_err(|_| SurfaceError::Session("response dropped".into()))?;

        result.map_err(SurfaceError::Session)
    }
}

/// Session driver loop.
///
/// Sends queued commands over the WebSocket and routes responses back by id.
/// Protocol events (frames with a `method` and no `id`) are not subscribed
/// to and are dropped.
async fn cdp_driver_loop(ws: WsStream, mut cmd_rx: mpsc::Receiver<CdpCommand>) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let mut pending: HashMap<u64, PendingTx> = HashMap::new();
    let mut next_id: u64 = 1;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                let id = next_id;
                next_id += 1;
                let frame = json!({
                    "id": id,
                    "method": cmd.method,
                    "params": cmd.params,
                });
                let _ = pending.insert(id, cmd.response_tx);
                if ws_tx.send(Message::Text(frame.to_string().into())).await.is_err() {
                    warn!("page session write failed, stopping driver");
                    break;
                }
            }
            msg = ws_rx.next() => {
                let Some(Ok(msg)) = msg else {
                    warn!("page session closed");
                    break;
                };
                let Message::Text(text) = msg else { continue };
                let Ok(value): Result<Value, _> = serde_json::from_str(&text) else {
                    trace!("undecodable session frame");
                    continue;
                };
                if let Some(id) = value.get("id").and_then(Value::as_u64) {
                    if let Some(tx) = pending.remove(&id) {
                        if let Some(err) = value.get("error") {
                            let msg = err["message"].as_str().unwrap_or("protocol error");
                            let _ = tx.send(Err(msg.into()));
                        } else {
                            let _ = tx.send(Ok(value["result"].clone()));
                        }
                    }
                }
            }
        }
    }
}
