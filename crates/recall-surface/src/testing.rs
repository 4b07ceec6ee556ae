//! Test doubles for exercising dispatch logic without a browser.
//!
//! [`RecordingProvider`] simulates surface absence/presence and position
//! changes deterministically, and records every operation applied to it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::SurfaceError;
use crate::traits::{PlaybackSurface, SurfaceProvider};

/// One operation applied to a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCall {
    /// Playback resumed.
    Play,
    /// Playback suspended.
    Pause,
    /// Position moved to the given seconds.
    Seek(f64),
    /// Fullscreen requested.
    RequestFullscreen,
    /// Fullscreen exit attempted (provider-level).
    ExitFullscreen,
}

/// In-memory playback surface that records calls and tracks simulated state.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
    position: Mutex<f64>,
    playing: Mutex<bool>,
}

impl RecordingSurface {
    /// Every call recorded so far, in order.
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().clone()
    }

    /// Simulate external playback progress.
    pub fn set_position(&self, seconds: f64) {
        *self.position.lock() = seconds;
    }

    /// The simulated playback position.
    pub fn current_position(&self) -> f64 {
        *self.position.lock()
    }

    /// Whether the simulated surface is playing.
    pub fn is_playing(&self) -> bool {
        *self.playing.lock()
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl PlaybackSurface for RecordingSurface {
    async fn play(&self) -> Result<(), SurfaceError> {
        self.record(SurfaceCall::Play);
        *self.playing.lock() = true;
        Ok(())
    }

    async fn pause(&self) -> Result<(), SurfaceError> {
        self.record(SurfaceCall::Pause);
        *self.playing.lock() = false;
        Ok(())
    }

    async fn position(&self) -> Result<f64, SurfaceError> {
        Ok(*self.position.lock())
    }

    async fn seek(&self, seconds: f64) -> Result<(), SurfaceError> {
        self.record(SurfaceCall::Seek(seconds));
        *self.position.lock() = seconds;
        Ok(())
    }

    async fn request_fullscreen(&self) -> Result<(), SurfaceError> {
        self.record(SurfaceCall::RequestFullscreen);
        Ok(())
    }
}

/// Provider double whose surface presence can be toggled at any time.
#[derive(Clone, Debug)]
pub struct RecordingProvider {
    surface: Arc<RecordingSurface>,
    present: Arc<AtomicBool>,
}

impl RecordingProvider {
    /// A provider whose surface is present.
    #[must_use]
    pub fn new() -> Self {
        Self {
            surface: Arc::new(RecordingSurface::default()),
            present: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A provider whose surface is absent until [`set_present`] is called.
    ///
    /// [`set_present`]: RecordingProvider::set_present
    #[must_use]
    pub fn absent() -> Self {
        let provider = Self::new();
        provider.present.store(false, Ordering::Relaxed);
        provider
    }

    /// Handle to the shared surface for assertions.
    #[must_use]
    pub fn surface(&self) -> Arc<RecordingSurface> {
        Arc::clone(&self.surface)
    }

    /// Toggle surface presence (simulates document mutation).
    pub fn set_present(&self, present: bool) {
        self.present.store(present, Ordering::Relaxed);
    }
}

impl Default for RecordingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SurfaceProvider for RecordingProvider {
    async fn resolve(&self) -> Option<Arc<dyn PlaybackSurface>> {
        if self.present.load(Ordering::Relaxed) {
            Some(self.surface())
        } else {
            None
        }
    }

    async fn exit_fullscreen(&self) -> Result<(), SurfaceError> {
        // Recorded on the shared surface even though the real operation is
        // document-level, so tests read one ordered call log.
        self.surface.record(SurfaceCall::ExitFullscreen);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let surface = RecordingSurface::default();
        surface.play().await.unwrap();
        surface.seek(12.5).await.unwrap();
        surface.pause().await.unwrap();
        assert_eq!(
            surface.calls(),
            vec![
                SurfaceCall::Play,
                SurfaceCall::Seek(12.5),
                SurfaceCall::Pause
            ]
        );
    }

    #[tokio::test]
    async fn seek_updates_position() {
        let surface = RecordingSurface::default();
        surface.seek(30.0).await.unwrap();
        let position = surface.position().await.unwrap();
        assert!((position - 30.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn play_pause_track_state() {
        let surface = RecordingSurface::default();
        assert!(!surface.is_playing());
        surface.play().await.unwrap();
        assert!(surface.is_playing());
        surface.pause().await.unwrap();
        assert!(!surface.is_playing());
    }

    #[tokio::test]
    async fn absent_provider_resolves_none() {
        let provider = RecordingProvider::absent();
        assert!(provider.resolve().await.is_none());
        provider.set_present(true);
        assert!(provider.resolve().await.is_some());
    }

    #[tokio::test]
    async fn exit_fullscreen_recorded_without_surface() {
        let provider = RecordingProvider::absent();
        provider.exit_fullscreen().await.unwrap();
        assert_eq!(provider.surface().calls(), vec![SurfaceCall::ExitFullscreen]);
    }
}
