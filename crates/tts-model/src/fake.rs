// SPDX-License-Identifier: MIT

//! Fake model for testing, following the shape of
//! `oj-adapters::session::FakeSessionAdapter`: a call log plus
//! deterministic, configurable responses instead of a real backend.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{ModelError, TtsModel, VoiceSource, VoiceState};

/// One recorded interaction with a [`FakeTtsModel`].
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    StateForVoice(VoiceSourceRecord),
    Generate { text: String },
}

/// A [`VoiceSource`] stripped to data that's convenient to assert on in
/// tests (plain `PathBuf`/`String` instead of the enum, which this module
/// re-derives `PartialEq` for anyway — kept separate so call logs stay
/// `Clone + PartialEq` without constraining `VoiceSource` itself).
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceSourceRecord {
    Path(String),
    Name(String),
}

impl From<&VoiceSource> for VoiceSourceRecord {
    fn from(source: &VoiceSource) -> Self {
        match source {
            VoiceSource::Path(p) => VoiceSourceRecord::Path(p.display().to_string()),
            VoiceSource::Name(n) => VoiceSourceRecord::Name(n.clone()),
        }
    }
}

struct FakeState {
    calls: Vec<FakeCall>,
    fail_state_for: Option<String>,
    fail_generate: bool,
}

/// A model double that never touches a real backend: `state_for_voice`
/// always succeeds (unless configured to fail for a given name/path),
/// `generate` returns one sample per character at a configurable rate so
/// tests can assert on output length without real audio.
#[derive(Clone)]
pub struct FakeTtsModel {
    inner: Arc<Mutex<FakeState>>,
    sample_rate: u32,
    samples_per_char: usize,
}

impl FakeTtsModel {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                fail_state_for: None,
                fail_generate: false,
            })),
            sample_rate: 22_050,
            samples_per_char: 64,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Make `state_for_voice` fail whenever the requested name or path
    /// display-string equals `needle`.
    pub fn fail_state_for(&self, needle: impl Into<String>) {
        self.inner.lock().fail_state_for = Some(needle.into());
    }

    pub fn fail_generate(&self, fail: bool) {
        self.inner.lock().fail_generate = fail;
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.inner.lock().calls.clone()
    }
}

impl Default for FakeTtsModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TtsModel for FakeTtsModel {
    fn state_for_voice(&self, voice: &VoiceSource) -> Result<VoiceState, ModelError> {
        let record = VoiceSourceRecord::from(voice);
        let mut inner = self.inner.lock();
        inner.calls.push(FakeCall::StateForVoice(record.clone()));

        let needle = match &record {
            VoiceSourceRecord::Path(p) => p.clone(),
            VoiceSourceRecord::Name(n) => n.clone(),
        };
        if inner.fail_state_for.as_deref() == Some(needle.as_str()) {
            return Err(ModelError::VoiceLoadFailed(needle));
        }

        Ok(VoiceState::new(record))
    }

    fn generate(&self, state: &VoiceState, text: &str) -> Result<Vec<f32>, ModelError> {
        {
            let mut inner = self.inner.lock();
            inner.calls.push(FakeCall::Generate {
                text: text.to_string(),
            });
            if inner.fail_generate {
                return Err(ModelError::GenerationFailed("fake model configured to fail".into()));
            }
        }

        let _ = state
            .0
            .downcast_ref::<VoiceSourceRecord>()
            .expect("FakeTtsModel only ever produces VoiceSourceRecord states");

        let n = (text.chars().count() * self.samples_per_char).max(1);
        Ok((0..n)
            .map(|i| ((i as f32 / n as f32) * std::f32::consts::TAU).sin() * 0.1)
            .collect())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
