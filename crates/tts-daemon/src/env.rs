// SPDX-License-Identifier: MIT

//! Centralized environment variable access for the daemon crate, one small
//! free function per variable — mirrors `oj-daemon::env`'s convention.

use std::path::PathBuf;
use std::time::Duration;

/// Coordination directory override: `LOCAL_TTS_STATE_DIR`, else the spec's
/// pinned default (`spec.md` §6).
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LOCAL_TTS_STATE_DIR") {
        return expand_tilde(&dir);
    }
    PathBuf::from("/tmp/local-tts-mcp")
}

/// Unix socket path override: `LOCAL_TTS_SOCKET_PATH`, else `<state_dir>/inference.sock`.
pub fn socket_path(state_dir: &std::path::Path) -> PathBuf {
    if let Ok(path) = std::env::var("LOCAL_TTS_SOCKET_PATH") {
        return expand_tilde(&path);
    }
    state_dir.join("inference.sock")
}

/// Daemon log file path, under the coordination directory.
pub fn log_path(state_dir: &std::path::Path) -> PathBuf {
    state_dir.join("service.log")
}

/// System lock acquisition timeout override, in milliseconds.
pub fn lock_timeout_ms() -> Option<Duration> {
    std::env::var("LOCAL_TTS_LOCK_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Memory threshold override, as a percentage (0-100).
pub fn memory_threshold_percent() -> Option<f32> {
    std::env::var("LOCAL_TTS_MEMORY_THRESHOLD_PERCENT")
        .ok()
        .and_then(|s| s.parse::<f32>().ok())
}

/// Idle-unload window override, in seconds.
pub fn idle_unload_secs() -> Option<u64> {
    std::env::var("LOCAL_TTS_IDLE_UNLOAD_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
}

/// Default voice clip path, passed straight through to `tts-worker`.
pub fn voice_path() -> Option<String> {
    std::env::var("LOCAL_TTS_VOICE_PATH").ok()
}

/// Hugging Face cache directories, passed straight through to the model
/// backend; this crate never reads their contents, only forwards them.
pub fn hf_hub_cache() -> Option<String> {
    std::env::var("HF_HUB_CACHE").ok()
}

pub fn hf_home() -> Option<String> {
    std::env::var("HF_HOME").ok()
}

/// Lhotse tools directory, passed straight through to the model backend.
pub fn lhotse_tools_dir() -> Option<String> {
    std::env::var("LHOTSE_TOOLS_DIR").ok()
}

pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
