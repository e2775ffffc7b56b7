// SPDX-License-Identifier: MIT

//! tts-daemon library
//!
//! This module exposes the IPC protocol types for use by `tts-client`.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod protocol;

pub use protocol::{
    read_response, write_empty_request, write_json_request, Endpoint, ErrorResponse,
    GenerateRequest, GenerateResponse, ProtocolError, RawRequest, RawResponse, ShutdownResponse,
    StatusResponse, DEFAULT_TIMEOUT, MAX_BODY_SIZE,
};
