// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV decode/encode error: {0}")]
    Wav(#[from] hound::Error),

    #[error("no audio segments to assemble")]
    EmptyAssembly,

    #[error("playback binary not found: {0}")]
    PlaybackBinaryMissing(String),

    #[error("playback process exited with status {0}")]
    PlaybackFailed(String),

    #[error("playback timed out after {0:?}")]
    PlaybackTimedOut(std::time::Duration),
}
