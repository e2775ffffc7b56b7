// SPDX-License-Identifier: MIT

//! The literal HTTP/1.1-over-UDS wire format (`spec.md` §6): a request-line,
//! headers, and a `Content-Length`-delimited JSON body, for exactly the
//! three fixed endpoints the daemon exposes. No general HTTP library is
//! pulled in for a parser this narrow — `original_source/src/local_tts/service.py`
//! itself hand-rolls a `BaseHTTPRequestHandler` subclass for the same job.
//!
//! The read/write shape (line + header read, `Content-Length` body read,
//! every step wrapped in a timeout) is grounded on
//! `oj-daemon::protocol_wire`'s `read_message`/`write_message`, even though
//! the concrete framing differs (length-prefixed JSON there, HTTP/1.1 here).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

/// Default per-step I/O timeout for a connection.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Upper bound on a request body. Text is soft-limited to 1000 chars by
/// convention (`spec.md` §4.5), but the worker tolerates arbitrary lengths
/// via chunking, so the wire limit is generous rather than load-bearing.
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Upper bound on the request-line + header block, to bound a malicious or
/// broken client's ability to make the daemon buffer indefinitely.
const MAX_HEADER_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("body too large: {size} bytes (max {max})")]
    BodyTooLarge { size: usize, max: usize },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("timed out")]
    Timeout,

    #[error("malformed request: {0}")]
    BadRequest(String),
}

/// A parsed request line plus headers plus body, before endpoint dispatch.
#[derive(Debug)]
pub struct RawRequest {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

/// The three fixed endpoints, with their parsed bodies.
#[derive(Debug)]
pub enum Endpoint {
    Generate(GenerateRequest),
    Status,
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateRequest {
    pub text: String,
    #[serde(default)]
    pub voice_path: Option<String>,
    #[serde(default)]
    pub voice_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateResponse {
    pub status: &'static str,
    pub ticket: u64,
}

impl GenerateResponse {
    pub fn queued(ticket: u64) -> Self {
        Self {
            status: "queued",
            ticket,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub ram_percent: f32,
    pub rss_mb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShutdownResponse {
    pub status: &'static str,
}

impl Default for ShutdownResponse {
    fn default() -> Self {
        Self {
            status: "shutting_down",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Read a request line, headers, and `Content-Length` body, each step
/// wrapped in `timeout`.
pub async fn read_request<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut R,
    timeout: std::time::Duration,
) -> Result<RawRequest, ProtocolError> {
    tokio::time::timeout(timeout, read_request_inner(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

async fn read_request_inner<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<RawRequest, ProtocolError> {
    let mut buf = BufReader::new(reader);

    let mut request_line = String::new();
    let n = read_header_line(&mut buf, &mut request_line).await?;
    if n == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    let (method, path) = parse_request_line(&request_line)?;

    let mut content_length: usize = 0;
    let mut header_bytes = request_line.len();
    loop {
        let mut line = String::new();
        let n = read_header_line(&mut buf, &mut line).await?;
        if n == 0 || line.trim().is_empty() {
            break;
        }
        header_bytes += line.len();
        if header_bytes > MAX_HEADER_BYTES {
            return Err(ProtocolError::BadRequest("header block too large".into()));
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value
                    .trim()
                    .parse()
                    .map_err(|_| ProtocolError::BadRequest("invalid Content-Length".into()))?;
            }
        }
    }

    if content_length > MAX_BODY_SIZE {
        return Err(ProtocolError::BodyTooLarge {
            size: content_length,
            max: MAX_BODY_SIZE,
        });
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        buf.read_exact(&mut body).await?;
    }

    Ok(RawRequest { method, path, body })
}

async fn read_header_line<R: tokio::io::AsyncBufRead + Unpin>(
    reader: &mut R,
    line: &mut String,
) -> Result<usize, ProtocolError> {
    let n = reader.read_line(line).await?;
    Ok(n)
}

fn parse_request_line(line: &str) -> Result<(String, String), ProtocolError> {
    let mut parts = line.trim_end().split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| ProtocolError::BadRequest("missing method".into()))?
        .to_string();
    let path = parts
        .next()
        .ok_or_else(|| ProtocolError::BadRequest("missing path".into()))?
        .to_string();
    Ok((method, path))
}

/// Parse a [`RawRequest`] into a typed [`Endpoint`], validating the body
/// against `spec.md` §4.5 ("reject missing `text`, malformed JSON,
/// content-length <= 0").
pub fn parse_endpoint(raw: &RawRequest) -> Result<Endpoint, ProtocolError> {
    if !raw.method.eq_ignore_ascii_case("POST") {
        return Err(ProtocolError::BadRequest(format!(
            "unsupported method: {}",
            raw.method
        )));
    }

    match raw.path.as_str() {
        "/generate" => {
            if raw.body.is_empty() {
                return Err(ProtocolError::BadRequest("empty body".into()));
            }
            let request: GenerateRequest = serde_json::from_slice(&raw.body)?;
            if request.text.trim().is_empty() {
                return Err(ProtocolError::BadRequest("text must not be empty".into()));
            }
            Ok(Endpoint::Generate(request))
        }
        "/status" => Ok(Endpoint::Status),
        "/shutdown" => Ok(Endpoint::Shutdown),
        other => Err(ProtocolError::BadRequest(format!(
            "unknown endpoint: {other}"
        ))),
    }
}

/// Write a JSON response as a complete HTTP/1.1 message, wrapped in
/// `timeout`.
pub async fn write_json_response<W: tokio::io::AsyncWrite + Unpin, T: Serialize>(
    writer: &mut W,
    status_code: u16,
    reason: &str,
    body: &T,
    timeout: std::time::Duration,
) -> Result<(), ProtocolError> {
    let json = serde_json::to_vec(body)?;
    tokio::time::timeout(timeout, write_http_response(writer, status_code, reason, &json))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

async fn write_http_response<W: tokio::io::AsyncWrite + Unpin>(
    writer: &mut W,
    status_code: u16,
    reason: &str,
    json: &[u8],
) -> Result<(), ProtocolError> {
    let head = format!(
        "HTTP/1.1 {status_code} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        json.len()
    );
    writer.write_all(head.as_bytes()).await?;
    writer.write_all(json).await?;
    writer.flush().await?;
    Ok(())
}

/// A parsed HTTP/1.1 response: status code plus body (client side).
#[derive(Debug)]
pub struct RawResponse {
    pub status_code: u16,
    pub body: Vec<u8>,
}

/// Write a JSON request as a complete HTTP/1.1 message (client side),
/// wrapped in `timeout`. The mirror image of [`write_json_response`].
pub async fn write_json_request<W: tokio::io::AsyncWrite + Unpin, T: Serialize>(
    writer: &mut W,
    path: &str,
    body: &T,
    timeout: std::time::Duration,
) -> Result<(), ProtocolError> {
    let json = serde_json::to_vec(body)?;
    tokio::time::timeout(timeout, write_http_request(writer, path, &json))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

/// Write a request with an empty body (`/status`, `/shutdown`).
pub async fn write_empty_request<W: tokio::io::AsyncWrite + Unpin>(
    writer: &mut W,
    path: &str,
    timeout: std::time::Duration,
) -> Result<(), ProtocolError> {
    tokio::time::timeout(timeout, write_http_request(writer, path, &[]))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

async fn write_http_request<W: tokio::io::AsyncWrite + Unpin>(
    writer: &mut W,
    path: &str,
    json: &[u8],
) -> Result<(), ProtocolError> {
    let head = format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
        json.len()
    );
    writer.write_all(head.as_bytes()).await?;
    writer.write_all(json).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a status line, headers, and `Content-Length` body (client side),
/// wrapped in `timeout`.
pub async fn read_response<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut R,
    timeout: std::time::Duration,
) -> Result<RawResponse, ProtocolError> {
    tokio::time::timeout(timeout, read_response_inner(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

async fn read_response_inner<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<RawResponse, ProtocolError> {
    let mut buf = BufReader::new(reader);

    let mut status_line = String::new();
    let n = read_header_line(&mut buf, &mut status_line).await?;
    if n == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    let status_code = parse_status_line(&status_line)?;

    let mut content_length: usize = 0;
    loop {
        let mut line = String::new();
        let n = read_header_line(&mut buf, &mut line).await?;
        if n == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value
                    .trim()
                    .parse()
                    .map_err(|_| ProtocolError::BadRequest("invalid Content-Length".into()))?;
            }
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        buf.read_exact(&mut body).await?;
    }

    Ok(RawResponse { status_code, body })
}

fn parse_status_line(line: &str) -> Result<u16, ProtocolError> {
    let mut parts = line.trim_end().split_whitespace();
    let _version = parts
        .next()
        .ok_or_else(|| ProtocolError::BadRequest("missing HTTP version".into()))?;
    let code = parts
        .next()
        .ok_or_else(|| ProtocolError::BadRequest("missing status code".into()))?;
    code.parse()
        .map_err(|_| ProtocolError::BadRequest("invalid status code".into()))
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
