// SPDX-License-Identifier: MIT

//! The immutable request record a client submits (`spec.md` §3).

use serde::{Deserialize, Serialize};

/// An explicit voice source requested by the client: either a path to a
/// reference audio clip, or a catalog voice name. At most one should be
/// set; if both are `None` the worker falls back to the canonical default
/// voice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    /// Text to speak. Never empty — validated at the RPC boundary.
    pub text: String,
    /// Absolute path to a reference audio clip to clone the voice from.
    pub voice_path: Option<String>,
    /// A catalog voice name.
    pub voice_name: Option<String>,
    /// Correlation id set by the server at enqueue time (not by the
    /// client); used only for log correlation.
    #[serde(default)]
    pub correlation_id: String,
}

impl Request {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_path: None,
            voice_name: None,
            correlation_id: String::new(),
        }
    }

    pub fn with_voice_path(mut self, path: impl Into<String>) -> Self {
        self.voice_path = Some(path.into());
        self
    }

    pub fn with_voice_name(mut self, name: impl Into<String>) -> Self {
        self.voice_name = Some(name.into());
        self
    }
}
