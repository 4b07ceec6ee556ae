//! Page-backed playback surface.
//!
//! The surface is the single `<video>` element of the attached page. Every
//! operation re-queries `document.querySelector('video')` inside the page,
//! so an element that appears late or is swapped out by document mutation is
//! picked up on the next command.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::cdp::PageSession;
use crate::error::SurfaceError;
use crate::traits::{PlaybackSurface, SurfaceProvider};

/// Resolves the page's `<video>` element as the playback surface.
pub struct PageSurfaceProvider {
    session: Arc<PageSession>,
}

impl PageSurfaceProvider {
    /// Wrap an attached page session.
    #[must_use]
    pub fn new(session: PageSession) -> Self {
        Self {
            session: Arc::new(session),
        }
    }
}

#[async_trait]
impl SurfaceProvider for PageSurfaceProvider {
    async fn resolve(&self) -> Option<Arc<dyn PlaybackSurface>> {
        match self
            .session
            .evaluate("document.querySelector('video') !== null")
            .await
        {
            Ok(value) if value.as_bool() == Some(true) => Some(Arc::new(PageSurface {
                session: Arc::clone(&self.session),
            })),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "surface lookup failed");
                None
            }
        }
    }

    async fn exit_fullscreen(&self) -> Result<(), SurfaceError> {
        // The conditional avoids the DOM rejection when nothing is
        // fullscreen, keeping the operation idempotent.
        let _ = self
            .session
            .evaluate(
                "document.fullscreenElement ? document.exitFullscreen() : Promise.resolve()",
            )
            .await?;
        Ok(())
    }
}

/// The `<video>` element of the attached page.
struct PageSurface {
    session: Arc<PageSession>,
}

impl PageSurface {
    async fn eval(&self, expression: &str) -> Result<Value, SurfaceError> {
        self.session.evaluate(expression).await
    }
}

#[async_trait]
impl PlaybackSurface for PageSurface {
    async fn play(&self) -> Result<(), SurfaceError> {
        let _ = self
            .eval(
                "(() => { const v = document.querySelector('video'); \
                 if (v) v.play().catch(() => {}); })()",
            )
            .await?;
        Ok(())
    }

    async fn pause(&self) -> Result<(), SurfaceError> {
        let _ = self
            .eval("(() => { const v = document.querySelector('video'); if (v) v.pause(); })()")
            .await?;
        Ok(())
    }

    async fn position(&self) -> Result<f64, SurfaceError> {
        let value = self
            .eval(
                "(() => { const v = document.querySelector('video'); \
                 return v ? v.currentTime : null; })()",
            )
            .await?;
        value.as_f64().ok_or(SurfaceError::Detached)
    }

    async fn seek(&self, seconds: f64) -> Result<(), SurfaceError> {
        let _ = self
            .eval(&format!(
                "(() => {{ const v = document.querySelector('video'); \
                 if (v) v.currentTime = {seconds}; }})()"
            ))
            .await?;
        Ok(())
    }

    async fn request_fullscreen(&self) -> Result<(), SurfaceError> {
        let _ = self
            .eval(
                "(() => { const v = document.querySelector('video'); \
                 return v ? v.requestFullscreen() : undefined; })()",
            )
            .await?;
        Ok(())
    }
}
