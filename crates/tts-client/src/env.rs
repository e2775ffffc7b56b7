// SPDX-License-Identifier: MIT

//! Centralized environment variable access for the client crate, mirroring
//! `tts-daemon::env`'s one-function-per-variable convention — kept as its
//! own copy rather than a shared dependency, the same split the teacher
//! itself makes between `oj-daemon::env` and `oj`'s own `cli::env`.

use std::path::PathBuf;
use std::time::Duration;

pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LOCAL_TTS_STATE_DIR") {
        return expand_tilde(&dir);
    }
    PathBuf::from("/tmp/local-tts-mcp")
}

pub fn socket_path(state_dir: &std::path::Path) -> PathBuf {
    if let Ok(path) = std::env::var("LOCAL_TTS_SOCKET_PATH") {
        return expand_tilde(&path);
    }
    state_dir.join("inference.sock")
}

/// Override for the `ttsd` binary location, for dev builds and tests.
pub fn daemon_binary() -> Option<String> {
    std::env::var("LOCAL_TTS_DAEMON_BINARY").ok()
}

pub fn cargo_manifest_dir() -> Option<String> {
    std::env::var("CARGO_MANIFEST_DIR").ok()
}

/// Deadline for auto-start to wait for the socket to accept connections
/// (`spec.md` §4.6: "polls with a bounded deadline (default 10 s)").
pub fn start_deadline() -> Duration {
    parse_duration_ms("LOCAL_TTS_START_DEADLINE_MS").unwrap_or(Duration::from_secs(10))
}

/// Poll interval while waiting for the daemon to come up
/// (`original_source/src/local_tts/client.py`'s `time.sleep(0.5)`).
pub fn start_poll_interval() -> Duration {
    parse_duration_ms("LOCAL_TTS_START_POLL_MS").unwrap_or(Duration::from_millis(500))
}

/// Timeout for a single request/response round trip once connected.
pub fn request_timeout() -> Duration {
    parse_duration_ms("LOCAL_TTS_REQUEST_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn expand_tilde(path: &str) -> PathBuf {
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
