// SPDX-License-Identifier: MIT

//! Daemon process management: locating and launching the `ttsd` binary.
//!
//! Grounded on `oj`'s `cli::daemon_process::{find_ojd_binary,
//! start_daemon_background, probe_socket}` — the dev-build / sibling-binary
//! / `$PATH` fallback search order, and "probe by trying to connect" rather
//! than trusting the socket file's mere existence. There is no PID file or
//! `stop_daemon_sync` here: `spec.md` §4.1 supports multiple concurrent
//! daemon instances, so there is no single well-known process to signal —
//! `shutdown` always asks whichever daemon is listening on the resolved
//! socket path to stop itself via the `/shutdown` RPC.

use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::client::ClientError;
use crate::env;

/// Find the `ttsd` binary: explicit override, then a debug-build sibling
/// under `target/debug/`, then a sibling of the running executable, then
/// bare `ttsd` resolved via `$PATH`.
pub fn find_ttsd_binary() -> PathBuf {
    if let Some(path) = env::daemon_binary() {
        return PathBuf::from(path);
    }

    let current_exe = std::env::current_exe().ok();

    let is_debug_build = current_exe
        .as_ref()
        .and_then(|p| p.to_str())
        .map(|s| s.contains("target/debug"))
        .unwrap_or(false);

    if is_debug_build {
        if let Some(manifest_dir) = env::cargo_manifest_dir() {
            let dev_path = PathBuf::from(manifest_dir)
                .parent()
                .and_then(|p| p.parent())
                .map(|p| p.join("target/debug/ttsd"));
            if let Some(path) = dev_path {
                if path.exists() {
                    return path;
                }
            }
        }
    }

    if let Some(ref exe) = current_exe {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("ttsd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    PathBuf::from("ttsd")
}

/// Start the daemon in the background, detached from this process's
/// controlling terminal (`original_source/src/local_tts/client.py`'s
/// `start_new_session=True`) so a SIGHUP delivered when the CLI's terminal
/// closes doesn't take the daemon down with it. Made its own process group
/// leader via `process_group(0)` rather than a `pre_exec`-installed
/// `setsid()` call, since this workspace forbids `unsafe_code` and
/// `process_group` is the safe stable-std equivalent for this purpose.
pub fn start_daemon_background() -> Result<Child, ClientError> {
    let ttsd_path = find_ttsd_binary();

    Command::new(&ttsd_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0)
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// Probe whether a Unix socket is accepting connections.
pub fn probe_socket(socket_path: &Path) -> bool {
    std::os::unix::net::UnixStream::connect(socket_path).is_ok()
}

/// Whether a daemon is already up and accepting connections on this socket
/// (`original_source/src/local_tts/client.py::is_service_running`: check
/// the socket file exists, then attempt a connect).
pub fn is_service_running(socket_path: &Path) -> bool {
    socket_path.exists() && probe_socket(socket_path)
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
