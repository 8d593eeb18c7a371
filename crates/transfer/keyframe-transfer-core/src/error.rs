//! Error types for keyframe capture, persistence and re-application.

use serde::{Deserialize, Serialize};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TransferError>;

/// Failure surfaced by a host call (curve query or write).
///
/// Apply catches these per call and records them in its report; capture
/// propagates them as [`TransferError::Host`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that abort a capture, save, load or apply as a whole.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TransferError {
    /// Capture was asked to walk zero nodes.
    #[error("Nothing selected: select at least one node to copy keyframes from")]
    EmptySelection,

    /// Range selector string is not one of the supported names.
    #[error("Invalid range selector '{selector}': expected animation_range, playback_range or selected_key_range")]
    InvalidRangeSelector { selector: String },

    /// Keyframe thinning step must be at least one frame.
    #[error("Invalid keyframe frequency {frequency}: must be >= 1")]
    InvalidFrequency { frequency: u32 },

    /// Every node in the selection was skipped.
    #[error("No keyable, unlocked attributes found on the selected nodes")]
    NoCapturableData,

    /// The store holds no document yet.
    #[error("No copied keyframes available to paste")]
    NoSnapshotAvailable,

    /// No explicit targets were given and the snapshot names no nodes.
    #[error("No target nodes to paste keyframes onto")]
    EmptyTargetSelection,

    /// Refused to persist a snapshot with zero nodes.
    #[error("Refusing to save an empty snapshot")]
    EmptySnapshot,

    /// Loaded document breaks a snapshot invariant.
    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// The host reported a read failure during capture.
    #[error("Host error: {reason}")]
    Host { reason: String },

    /// Capture stopped at a node boundary on request.
    #[error("Keyframe transfer cancelled")]
    Cancelled,

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    #[error("IO error: {reason}")]
    Io { reason: String },
}

impl TransferError {
    pub fn invalid_snapshot(reason: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            reason: reason.into(),
        }
    }

    /// Errors the caller can fix by changing the selection or options and retrying.
    #[inline]
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::EmptySelection
                | Self::InvalidRangeSelector { .. }
                | Self::InvalidFrequency { .. }
                | Self::NoCapturableData
                | Self::NoSnapshotAvailable
                | Self::EmptyTargetSelection
        )
    }

    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptySelection
            | Self::InvalidRangeSelector { .. }
            | Self::InvalidFrequency { .. }
            | Self::EmptyTargetSelection
            | Self::Cancelled => "input",
            Self::NoCapturableData
            | Self::NoSnapshotAvailable
            | Self::EmptySnapshot
            | Self::InvalidSnapshot { .. } => "snapshot",
            Self::Host { .. } => "host",
            Self::Serialization { .. } => "serialization",
            Self::Io { .. } => "io",
        }
    }
}

impl From<HostError> for TransferError {
    fn from(err: HostError) -> Self {
        Self::Host {
            reason: err.message,
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
