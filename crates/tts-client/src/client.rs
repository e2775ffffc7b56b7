// SPDX-License-Identifier: MIT

//! `TtsClient`: connects to `ttsd` over its Unix socket, auto-starting the
//! daemon on demand.
//!
//! Grounded on `oj`'s `cli::client::DaemonClient` (`connect`/
//! `connect_or_start`/`connect_with_retry` split, `ClientError` taxonomy)
//! and `original_source/src/local_tts/client.py::TTSClient` for the literal
//! auto-start algorithm: check `is_service_running`, `start_service` if
//! not, then poll at a fixed interval up to a bounded deadline
//! (`spec.md` §4.6).

use std::path::PathBuf;
use std::time::Instant;

use thiserror::Error;
use tokio::net::UnixStream;

use tts_daemon::{
    read_response, write_empty_request, write_json_request, ErrorResponse, GenerateRequest,
    GenerateResponse, ProtocolError, ShutdownResponse, StatusResponse,
};

use crate::daemon_process::{is_service_running, probe_socket, start_daemon_background};
use crate::env;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running")]
    DaemonNotRunning,

    #[error("failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("timed out waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("malformed response from daemon: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A connection to a specific `ttsd` instance's socket.
pub struct TtsClient {
    socket_path: PathBuf,
}

impl TtsClient {
    /// Connect to an already-running daemon; fails if none is listening.
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = env::socket_path(&env::state_dir());
        if !is_service_running(&socket_path) {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self { socket_path })
    }

    /// Connect, auto-starting the daemon on demand. `ttsd` itself removes
    /// and rebinds a stale socket left by a crashed instance, so no cleanup
    /// is needed here beyond launching a fresh process.
    pub fn connect_or_start() -> Result<Self, ClientError> {
        let socket_path = env::socket_path(&env::state_dir());

        if is_service_running(&socket_path) {
            return Ok(Self { socket_path });
        }

        let child = start_daemon_background()?;
        Self::wait_for_socket(socket_path, child)
    }

    fn wait_for_socket(
        socket_path: PathBuf,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let deadline = env::start_deadline();
        let poll = env::start_poll_interval();
        let start = Instant::now();

        while start.elapsed() < deadline {
            if let Ok(Some(status)) = child.try_wait() {
                return Err(ClientError::DaemonStartFailed(format!(
                    "ttsd exited before the socket came up ({status})"
                )));
            }
            if probe_socket(&socket_path) {
                return Ok(Self { socket_path });
            }
            std::thread::sleep(poll);
        }

        Err(ClientError::DaemonStartTimeout)
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&GenerateRequest>,
    ) -> Result<T, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();
        let timeout = env::request_timeout();

        match body {
            Some(request) => write_json_request(&mut writer, path, request, timeout).await?,
            None => write_empty_request(&mut writer, path, timeout).await?,
        }

        let response = read_response(&mut reader, timeout).await?;
        if response.status_code >= 400 {
            let error: ErrorResponse = serde_json::from_slice(&response.body)?;
            return Err(ClientError::Rejected(error.error));
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Send a speech generation request
    /// (`original_source/src/local_tts/client.py::speak`).
    pub async fn speak(
        &self,
        text: impl Into<String>,
        voice_path: Option<String>,
        voice_name: Option<String>,
    ) -> Result<GenerateResponse, ClientError> {
        let request = GenerateRequest {
            text: text.into(),
            voice_path,
            voice_name,
        };
        self.request("/generate", Some(&request)).await
    }

    /// Get daemon status, swallowing connection failures into a
    /// stopped-looking status rather than propagating
    /// (`original_source/src/local_tts/client.py::get_status`).
    pub async fn status(&self) -> StatusResponse {
        self.request::<StatusResponse>("/status", None)
            .await
            .unwrap_or(StatusResponse {
                status: "stopped",
                model_loaded: false,
                ram_percent: 0.0,
                rss_mb: 0.0,
            })
    }

    /// Request daemon shutdown, best-effort — there's nothing useful to do
    /// if the daemon is already gone
    /// (`original_source/src/local_tts/client.py::shutdown`).
    pub async fn shutdown(&self) {
        let _ = self.request::<ShutdownResponse>("/shutdown", None).await;
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
