// SPDX-License-Identifier: MIT

//! The `TtsModel` trait boundary. The model's internals (architecture,
//! weights, inference backend) are entirely out of scope per `spec.md` §1 —
//! this is the seam a real implementation plugs into, mirroring how
//! `oj-adapters::session::SessionAdapter` keeps tmux specifics behind a
//! trait the daemon never inspects.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Where a voice comes from: an explicit reference clip, or a catalog name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSource {
    Path(PathBuf),
    Name(String),
}

/// Opaque, model-specific conditioning state produced by
/// [`TtsModel::state_for_voice`] and consumed by [`TtsModel::generate`].
/// Callers never inspect the contents; they only ever thread it back into
/// the same model instance that produced it.
#[derive(Clone)]
pub struct VoiceState(pub Arc<dyn Any + Send + Sync>);

impl VoiceState {
    pub fn new(inner: impl Any + Send + Sync) -> Self {
        Self(Arc::new(inner))
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to prepare voice state: {0}")]
    VoiceLoadFailed(String),

    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("model unavailable: {0}")]
    Unavailable(String),
}

/// A loaded text-to-speech model. Implementations own whatever backend
/// (weights, device handle, inference session) they need; this crate only
/// specifies the seam.
///
/// Deliberately synchronous: model inference is CPU/GPU-bound work, not
/// I/O-bound, so the caller dispatches it onto a blocking thread via
/// `tokio::task::spawn_blocking` rather than this trait pretending to be
/// async. This matters for trait-object ergonomics too — a plain `dyn
/// TtsModel` needs no `async-trait` boxing.
pub trait TtsModel: Send + Sync {
    /// Prepare (or look up cached) conditioning state for a voice. Called
    /// once per request, not once per chunk.
    fn state_for_voice(&self, voice: &VoiceSource) -> Result<VoiceState, ModelError>;

    /// Synthesize one chunk of text against a previously prepared voice
    /// state. Returns mono PCM samples in `[-1.0, 1.0]`.
    fn generate(&self, state: &VoiceState, text: &str) -> Result<Vec<f32>, ModelError>;

    /// The sample rate of audio returned by [`TtsModel::generate`].
    fn sample_rate(&self) -> u32;
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
