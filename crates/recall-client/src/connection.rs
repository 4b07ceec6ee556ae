//! Control-channel connection lifecycle.
//!
//! One manager owns one transport session at a time: connect, send the
//! greeting, drain inbound frames in arrival order, and on close or error
//! (treated identically) schedule exactly one reconnect attempt after a
//! fixed delay — indefinitely, with no backoff growth and no retry cap.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use recall_protocol::{Command, handshake_frame};
use recall_surface::SurfaceProvider;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::dispatch::CommandDispatcher;

/// Transport session lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// A connect attempt is in flight.
    Connecting,
    /// The session is established and frames flow.
    Open,
    /// No session; a reconnect may be pending.
    Closed,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<ConnectionState>,
    reconnects: AtomicU64,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock() = state;
    }
}

/// Observer and best-effort sender for a running [`ConnectionManager`].
#[derive(Clone, Debug)]
pub struct ClientHandle {
    shared: Arc<Shared>,
    outbound_tx: mpsc::Sender<String>,
}

impl ClientHandle {
    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// How many reconnect attempts have been scheduled so far.
    ///
    /// Exactly one per observed close or error event.
    #[must_use]
    pub fn reconnect_count(&self) -> u64 {
        self.shared.reconnects.load(Ordering::Relaxed)
    }

    /// Send a command to the controller, best-effort.
    ///
    /// Returns `false` — after a log line, never an error — when the
    /// connection is not open or the outbound queue is full. Frames are
    /// never held for a later session.
    pub fn send(&self, command: &Command) -> bool {
        if self.shared.state() != ConnectionState::Open {
            debug!("not connected, dropping outbound command");
            return false;
        }
        let json = match command.encode() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to encode outbound command");
                return false;
            }
        };
        if self.outbound_tx.try_send(json).is_ok() {
            true
        } else {
            warn!("outbound queue unavailable, dropping command");
            false
        }
    }
}

/// Owns the socket lifecycle and feeds inbound frames to the dispatcher.
pub struct ConnectionManager<P> {
    config: ClientConfig,
    dispatcher: CommandDispatcher<P>,
    shared: Arc<Shared>,
    outbound_tx: mpsc::Sender<String>,
    outbound_rx: mpsc::Receiver<String>,
}

impl<P: SurfaceProvider> ConnectionManager<P> {
    /// Create a manager for the configured endpoint and surface provider.
    pub fn new(config: ClientConfig, provider: P) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::channel(32);
        Self {
            config,
            dispatcher: CommandDispatcher::new(provider),
            shared: Arc::new(Shared {
                state: Mutex::new(ConnectionState::Closed),
                reconnects: AtomicU64::new(0),
            }),
            outbound_tx,
            outbound_rx,
        }
    }

    /// A handle for observing state and sending best-effort frames.
    #[must_use]
    pub fn handle(&self) -> ClientHandle {
        ClientHandle {
            shared: Arc::clone(&self.shared),
            outbound_tx: self.outbound_tx.clone(),
        }
    }

    /// Run until `cancel` fires.
    ///
    /// Every session end — connect failure, transport error, or orderly
    /// close — schedules one reconnect after the fixed configured delay.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            self.run_session(&cancel).await;
            self.shared.set_state(ConnectionState::Closed);
            self.discard_outbound();
            if cancel.is_cancelled() {
                info!("shutting down");
                return;
            }
            let _ = self.shared.reconnects.fetch_add(1, Ordering::Relaxed);
            debug!(
                delay_ms = self.config.reconnect_delay_ms,
                "scheduling reconnect"
            );
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("shutting down");
                    return;
                }
                () = tokio::time::sleep(Duration::from_millis(self.config.reconnect_delay_ms)) => {}
            }
        }
    }

    /// One connect-and-drain cycle.
    async fn run_session(&mut self, cancel: &CancellationToken) {
        self.shared.set_state(ConnectionState::Connecting);
        let endpoint = self.config.endpoint();
        debug!(%endpoint, "connecting");

        let connected = tokio::select! {
            result = connect_async(&endpoint) => result,
            () = cancel.cancelled() => return,
        };
        let (ws, _) = match connected {
            Ok(ok) => ok,
            Err(e) => {
                warn!(error = %e, "connect failed");
                return;
            }
        };

        self.shared.set_state(ConnectionState::Open);
        info!(%endpoint, "connected to controller");

        let (mut ws_tx, mut ws_rx) = ws.split();

        // Advisory greeting; the controller is not required to acknowledge it.
        if let Err(e) = ws_tx.send(Message::Text(handshake_frame().into())).await {
            warn!(error = %e, "handshake send failed");
            return;
        }

        let max_bytes = self.config.max_message_bytes;
        let mut poll = tokio::time::interval(Duration::from_millis(self.config.position_poll_ms));
        let dispatcher = &mut self.dispatcher;
        let outbound_rx = &mut self.outbound_rx;

        loop {
            tokio::select! {
                inbound = ws_rx.next() => {
                    match inbound {
                        Some(Ok(Message::Text(text))) => {
                            if text.len() > max_bytes {
                                warn!(bytes = text.len(), "ignoring oversized frame");
                                continue;
                            }
                            dispatcher.handle(text.as_str()).await;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            info!(?frame, "connection closed by controller");
                            return;
                        }
                        Some(Ok(other)) => {
                            trace!(kind = ?other, "ignoring non-text frame");
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "transport error");
                            return;
                        }
                        None => {
                            info!("connection closed");
                            return;
                        }
                    }
                }
                outbound = outbound_rx.recv() => {
                    if let Some(json) = outbound {
                        if let Err(e) = ws_tx.send(Message::Text(json.into())).await {
                            warn!(error = %e, "send failed");
                            return;
                        }
                    }
                }
                _ = poll.tick() => {
                    dispatcher.poll_position().await;
                }
                () = cancel.cancelled() => return,
            }
        }
    }

    /// Drop anything still queued for a session that no longer exists.
    fn discard_outbound(&mut self) {
        let mut dropped = 0_u64;
        while self.outbound_rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!(dropped, "discarded queued outbound frames");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
