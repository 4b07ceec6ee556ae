//! Inbound command schema and decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One decoded inbound instruction from the controller.
///
/// Commands are stateless and one-shot: each is consumed immediately by the
/// dispatcher and never persisted.
///
/// Wire format:
/// ```json
/// { "type": "updateVideoInterval", "start": 10.0, "end": 20.0 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Request fullscreen presentation of the playback surface.
    SetVideoFullscreen,
    /// Exit fullscreen presentation. Surface-independent: attempted even
    /// when nothing is fullscreen.
    UnsetVideoFullscreen,
    /// Resume playback.
    PlayVideo,
    /// Suspend playback.
    PauseVideo,
    /// Seek to `start`, resume playback, and arm a one-shot watch that
    /// pauses and clamps the position to `end` once it is reached.
    UpdateVideoInterval {
        /// Interval start in seconds.
        start: f64,
        /// Interval end in seconds.
        end: f64,
    },
    /// Advance the current position by `delta` seconds and resume playback.
    /// `delta` is signed; negative values rewind. No bounds clamping.
    FastForward {
        /// Position change in seconds.
        delta: f64,
    },
    /// Generic transport-style control with an action discriminant.
    VideoControl {
        /// Which playback effect to apply.
        action: ControlAction,
        /// Target position in seconds; required for `seek`, ignored otherwise.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<f64>,
    },
}

/// Action discriminant for [`Command::VideoControl`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    /// Resume playback.
    Play,
    /// Suspend playback.
    Pause,
    /// Seek to an absolute position.
    Seek,
}

impl Command {
    /// Every kind string recognized on the wire.
    pub const KINDS: [&'static str; 7] = [
        "setVideoFullscreen",
        "unsetVideoFullscreen",
        "playVideo",
        "pauseVideo",
        "updateVideoInterval",
        "fastForward",
        "videoControl",
    ];

    /// The wire-level kind string for this command.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetVideoFullscreen => "setVideoFullscreen",
            Self::UnsetVideoFullscreen => "unsetVideoFullscreen",
            Self::PlayVideo => "playVideo",
            Self::PauseVideo => "pauseVideo",
            Self::UpdateVideoInterval { .. } => "updateVideoInterval",
            Self::FastForward { .. } => "fastForward",
            Self::VideoControl { .. } => "videoControl",
        }
    }

    /// Serialize for the outbound send path.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Why an inbound frame could not be decoded into a [`Command`].
///
/// All variants are terminal at the point of detection: the frame is logged
/// and discarded, and the connection is unaffected.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame is not valid JSON.
    #[error("malformed payload: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The frame is valid JSON but carries no string `type` field.
    #[error("payload has no command kind")]
    MissingKind,
    /// The kind is not one of [`Command::KINDS`].
    #[error("unknown command kind: {0}")]
    UnknownKind(String),
    /// The kind is known but its payload fields are missing or mistyped.
    #[error("invalid payload for {kind}: {source}")]
    InvalidPayload {
        /// The recognized kind whose payload was rejected.
        kind: String,
        /// The underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Decode one inbound text frame into a [`Command`].
///
/// The kind is inspected before full deserialization so that an unrecognized
/// kind and a bad payload for a known kind report as distinct errors.
pub fn decode(raw: &str) -> Result<Command, DecodeError> {
    let value: Value = serde_json::from_str(raw).map_err(DecodeError::Malformed)?;
    let Some(kind) = value.get("type").and_then(Value::as_str).map(str::to_owned) else {
        return Err(DecodeError::MissingKind);
    };
    serde_json::from_value(value).map_err(|source| {
        if Command::KINDS.contains(&kind.as_str()) {
            DecodeError::InvalidPayload { kind, source }
        } else {
            DecodeError::UnknownKind(kind)
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
