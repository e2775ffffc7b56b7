// SPDX-License-Identifier: MIT

//! Error taxonomy (`spec.md` §7), split by layer the way the teacher splits
//! `LifecycleError` (daemon-wide) from `ProtocolError` (wire-level).

use thiserror::Error;

/// Errors from the cross-process `SystemCoordinator` and in-process
/// `InProcessCoordinator`.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("timed out waiting for the inference lock after {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error in coordination directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed coordination document: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("coordinator mutex was poisoned")]
    LockPoisoned,
}

/// Per-request error kinds (`spec.md` §7 taxonomy). Every variant is
/// recovered locally by the worker: `finish_turn` is always called, the
/// cross-process ticket is always removed, the system lock is always
/// released.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Empty text, malformed JSON, bad endpoint. Reported to the client;
    /// not logged as an error.
    #[error("invalid input: {0}")]
    InputInvalid(String),

    /// Bad path, unreadable WAV, catalog miss after fallback.
    #[error("voice resolution failed: {0}")]
    VoiceResolutionFailed(String),

    /// Load failure or device OOM. The daemon stays up; the next request
    /// retries the load.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Cross-process lock not acquired within the deadline.
    #[error("coordination timeout: {0}")]
    CoordinationTimeout(#[from] CoordinatorError),

    /// Subprocess non-zero exit or missing binary. Logged only;
    /// `finish_turn` is still called.
    #[error("playback failed: {0}")]
    PlaybackFailed(String),

    /// Allocation projection refused admission. Never constructed as a
    /// terminal, client-visible error: the worker retreats into its
    /// backpressure wait loop instead of returning this to a caller. The
    /// variant exists so the taxonomy names the state and so tests can
    /// assert on it directly.
    #[error("resource backpressure: {0}")]
    ResourceBackpressure(String),

    /// Socket bind collision, unwritable coordination directory. The
    /// daemon exits with code 1.
    #[error("fatal daemon error: {0}")]
    Fatal(String),
}

impl WorkerError {
    /// Whether this error should be logged as a warning/error (vs. treated
    /// as routine client-facing validation feedback).
    pub fn should_log(&self) -> bool {
        !matches!(self, WorkerError::InputInvalid(_))
    }
}
