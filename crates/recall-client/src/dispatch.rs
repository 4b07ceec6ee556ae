//! Command dispatch — decodes one inbound payload and applies at most one
//! playback effect.
//!
//! The playback surface is resolved fresh for every command; a surface that
//! has disappeared makes the command a silent no-op. Decode and surface
//! failures are terminal where they are detected: logged, discarded, no
//! effect on the connection.

use std::sync::Arc;

use recall_protocol::{Command, ControlAction, DecodeError, decode};
use recall_surface::{PlaybackSurface, SurfaceError, SurfaceProvider};
use tracing::{debug, warn};

/// One armed pause-and-clamp watch.
///
/// At most one watch is active per connection: each `updateVideoInterval`
/// replaces the previous watch rather than stacking on it, and the watch is
/// cleared once it fires.
#[derive(Clone, Copy, Debug, PartialEq)]
struct IntervalWatch {
    end: f64,
}

/// Decodes inbound payloads and routes them to playback effects.
pub struct CommandDispatcher<P> {
    provider: P,
    active_watch: Option<IntervalWatch>,
}

impl<P: SurfaceProvider> CommandDispatcher<P> {
    /// Create a dispatcher over a surface provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            active_watch: None,
        }
    }

    /// Handle one inbound text frame.
    ///
    /// Never panics and never propagates an error: an undecodable or
    /// unrecognized frame is logged and dropped.
    pub async fn handle(&mut self, raw: &str) {
        let command = match decode(raw) {
            Ok(command) => command,
            Err(DecodeError::UnknownKind(kind)) => {
                warn!(kind, "unhandled command kind");
                return;
            }
            Err(e) => {
                warn!(error = %e, "discarding inbound frame");
                return;
            }
        };
        debug!(kind = command.kind(), "applying command");
        self.apply(command).await;
    }

    /// Feed one playback-position tick to the active interval watch.
    ///
    /// When the position reaches or passes the watched end, playback is
    /// paused, the position is clamped to exactly the end, and the watch is
    /// cleared.
    pub async fn poll_position(&mut self) {
        let Some(watch) = self.active_watch else {
            return;
        };
        let Some(surface) = self.provider.resolve().await else {
            return;
        };
        match surface.position().await {
            Ok(position) if position >= watch.end => {
                log_err("pause", surface.pause().await);
                log_err("seek", surface.seek(watch.end).await);
                self.active_watch = None;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "position poll failed"),
        }
    }

    /// The end of the currently armed interval watch, if any.
    #[must_use]
    pub fn watch_end(&self) -> Option<f64> {
        self.active_watch.map(|watch| watch.end)
    }

    async fn apply(&mut self, command: Command) {
        match command {
            Command::SetVideoFullscreen => {
                if let Some(surface) = self.resolve().await {
                    log_err("requestFullscreen", surface.request_fullscreen().await);
                }
            }
            Command::UnsetVideoFullscreen => {
                // Surface-independent: attempted even when nothing is fullscreen.
                log_err("exitFullscreen", self.provider.exit_fullscreen().await);
            }
            Command::PlayVideo => {
                if let Some(surface) = self.resolve().await {
                    log_err("play", surface.play().await);
                }
            }
            Command::PauseVideo => {
                if let Some(surface) = self.resolve().await {
                    log_err("pause", surface.pause().await);
                }
            }
            Command::UpdateVideoInterval { start, end } => {
                if let Some(surface) = self.resolve().await {
                    log_err("seek", surface.seek(start).await);
                    log_err("play", surface.play().await);
                    self.active_watch = Some(IntervalWatch { end });
                }
            }
            Command::FastForward { delta } => {
                if let Some(surface) = self.resolve().await {
                    match surface.position().await {
                        Ok(position) => {
                            // No bounds clamping; a negative delta rewinds.
                            log_err("seek", surface.seek(position + delta).await);
                            log_err("play", surface.play().await);
                        }
                        Err(e) => warn!(error = %e, "cannot read playback position"),
                    }
                }
            }
            Command::VideoControl { action, time } => {
                if let Some(surface) = self.resolve().await {
                    match action {
                        ControlAction::Play => log_err("play", surface.play().await),
                        ControlAction::Pause => log_err("pause", surface.pause().await),
                        ControlAction::Seek => match time {
                            Some(seconds) => log_err("seek", surface.seek(seconds).await),
                            None => warn!("seek control without a time"),
                        },
                    }
                }
            }
        }
    }

    async fn resolve(&self) -> Option<Arc<dyn PlaybackSurface>> {
        let surface = self.provider.resolve().await;
        if surface.is_none() {
            debug!("no playback surface, dropping command");
        }
        surface
    }
}

fn log_err(op: &str, result: Result<(), SurfaceError>) {
    if let Err(e) = result {
        warn!(op, error = %e, "surface operation failed");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
