// SPDX-License-Identifier: MIT

//! tts-model: the opaque TTS model boundary (`spec.md` §1's "the model
//! itself is an external collaborator") plus the built-in voice catalog,
//! which is fully specified and therefore fully implemented here.

mod catalog;
mod model;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use catalog::{resolve_catalog_voice, DEFAULT_VOICE, VOICE_CATALOG};
pub use model::{ModelError, TtsModel, VoiceSource, VoiceState};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeCall, FakeTtsModel, VoiceSourceRecord};
