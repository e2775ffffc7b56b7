// SPDX-License-Identifier: MIT

//! `Listener`: accepts connections on the UDS and dispatches each to the
//! three fixed endpoints (`spec.md` §4.5).
//!
//! Shape grounded on `oj-daemon::listener::mod`'s `Listener`/`ListenCtx`:
//! one `tokio::net::UnixListener`, one spawned task per connection, a
//! shared `Arc<ListenCtx>`, `debug!` for routine polling traffic and
//! `info!` for mutating requests.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use tts_core::Request;
use tts_coordinator::ResourceMonitor;
use tts_worker::InferenceWorker;

use crate::protocol::{
    self, Endpoint, ErrorResponse, GenerateResponse, ProtocolError, ShutdownResponse,
    StatusResponse, DEFAULT_TIMEOUT,
};

/// Shared context every connection handler reads from.
pub struct ListenCtx {
    pub worker: Arc<InferenceWorker>,
    pub resource_monitor: Arc<ResourceMonitor>,
    pub shutdown: Arc<Notify>,
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

pub struct Listener {
    socket: UnixListener,
    ctx: Arc<ListenCtx>,
}

impl Listener {
    pub fn new(socket: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { socket, ctx }
    }

    /// Accept connections until the process exits. Each connection is
    /// handled on its own spawned task so a slow or misbehaving client
    /// can't stall the acceptor.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            match e {
                                ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
                                    debug!("client disconnected");
                                }
                                ConnectionError::Protocol(ProtocolError::Timeout) => {
                                    warn!("connection timed out");
                                }
                                _ => error!(error = %e, "connection error"),
                            }
                        }
                    });
                }
                Err(e) => error!(error = %e, "accept error"),
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, ctx: &ListenCtx) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    let raw = protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await?;

    let endpoint = match protocol::parse_endpoint(&raw) {
        Ok(endpoint) => endpoint,
        Err(ProtocolError::BadRequest(message)) => {
            debug!(%message, "rejecting malformed request");
            protocol::write_json_response(
                &mut writer,
                400,
                "Bad Request",
                &ErrorResponse { error: message },
                DEFAULT_TIMEOUT,
            )
            .await?;
            return Ok(());
        }
        Err(ProtocolError::Json(e)) => {
            protocol::write_json_response(
                &mut writer,
                400,
                "Bad Request",
                &ErrorResponse {
                    error: format!("malformed JSON: {e}"),
                },
                DEFAULT_TIMEOUT,
            )
            .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if matches!(endpoint, Endpoint::Status) {
        debug!("received status poll");
    } else {
        info!("received request");
    }

    match endpoint {
        Endpoint::Generate(body) => {
            let correlation_id = uuid::Uuid::new_v4().to_string();
            let mut request = Request::new(body.text);
            request.correlation_id = correlation_id.clone();
            if let Some(voice_path) = body.voice_path {
                request = request.with_voice_path(voice_path);
            }
            if let Some(voice_name) = body.voice_name {
                request = request.with_voice_name(voice_name);
            }
            match ctx.worker.submit(request).await {
                Ok(ticket) => {
                    info!(%correlation_id, ticket, "queued generate request");
                    protocol::write_json_response(
                        &mut writer,
                        200,
                        "OK",
                        &GenerateResponse::queued(ticket),
                        DEFAULT_TIMEOUT,
                    )
                    .await?;
                }
                Err(e) => {
                    let status = if e.should_log() { 500 } else { 400 };
                    let reason = if status == 500 {
                        "Internal Server Error"
                    } else {
                        "Bad Request"
                    };
                    if e.should_log() {
                        error!(%correlation_id, error = %e, "generate request failed");
                    } else {
                        debug!(%correlation_id, error = %e, "generate request rejected");
                    }
                    protocol::write_json_response(
                        &mut writer,
                        status,
                        reason,
                        &ErrorResponse {
                            error: e.to_string(),
                        },
                        DEFAULT_TIMEOUT,
                    )
                    .await?;
                }
            }
        }

        Endpoint::Status => {
            ctx.resource_monitor.refresh();
            let status = ctx.resource_monitor.status();
            let response = StatusResponse {
                status: "running",
                model_loaded: ctx.worker.is_model_loaded(),
                ram_percent: status.memory_percent,
                rss_mb: ctx.resource_monitor.process_rss_mb(),
            };
            protocol::write_json_response(&mut writer, 200, "OK", &response, DEFAULT_TIMEOUT)
                .await?;
        }

        Endpoint::Shutdown => {
            protocol::write_json_response(
                &mut writer,
                200,
                "OK",
                &ShutdownResponse::default(),
                DEFAULT_TIMEOUT,
            )
            .await?;
            ctx.shutdown.notify_one();
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
