// SPDX-License-Identifier: MIT

//! Platform playback subprocess (`spec.md` §4.4), a direct port of
//! `original_source/src/local_tts/service.py::play_audio`'s platform
//! branch (`afplay` on Darwin at 1.2x speed, `aplay` elsewhere), bounded by
//! a timeout in the shape of `oj-adapters::subprocess::run_with_timeout`.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

use crate::error::AudioError;

/// Upper bound on how long a playback subprocess is allowed to run before
/// it's killed and treated as failed.
pub const DEFAULT_PLAYBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of a playback attempt, for logging; a non-zero exit never
/// becomes a hard error on Linux (the original's `aplay` call uses
/// `check=False`), but does on macOS (`afplay` uses `check=True`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Played,
    NonZeroExitIgnored,
}

/// Play a WAV file through the platform's default playback binary, bounded
/// by `timeout`.
pub async fn play_wav_file(
    path: &Path,
    timeout: Duration,
) -> Result<PlaybackOutcome, AudioError> {
    if cfg!(target_os = "macos") {
        run_playback_command(
            "afplay",
            &["-r".as_ref(), "1.2".as_ref(), path.as_os_str()],
            timeout,
            true,
        )
        .await
    } else {
        run_playback_command("aplay", &[path.as_os_str()], timeout, false)
            .await
    }
}

/// Run a playback-shaped subprocess (`binary args...`), bounded by
/// `timeout`. `must_succeed` controls whether a non-zero exit is a hard
/// error (macOS `afplay`, invoked with `check=True` in the original) or
/// merely logged (Linux `aplay`, invoked with `check=False`).
async fn run_playback_command(
    binary: &str,
    args: &[&std::ffi::OsStr],
    timeout: Duration,
    must_succeed: bool,
) -> Result<PlaybackOutcome, AudioError> {
    let mut cmd = Command::new(binary);
    cmd.args(args);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AudioError::PlaybackBinaryMissing(binary.to_string()));
        }
        Ok(Err(e)) => return Err(AudioError::Io(e)),
        Err(_elapsed) => return Err(AudioError::PlaybackTimedOut(timeout)),
    };

    if output.status.success() {
        Ok(PlaybackOutcome::Played)
    } else if must_succeed {
        Err(AudioError::PlaybackFailed(
            output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
        ))
    } else {
        Ok(PlaybackOutcome::NonZeroExitIgnored)
    }
}

#[cfg(test)]
#[path = "playback_tests.rs"]
mod tests;
