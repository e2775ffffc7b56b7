// SPDX-License-Identifier: MIT

//! tts-worker: the single-consumer generation pipeline that turns a queued
//! `Request` into spoken audio (`spec.md` §4.4).

mod worker;

pub use worker::{
    unavailable_model_loader, InferenceWorker, ModelLoader, WorkerConfig, WorkerDeps,
    BACKPRESSURE_RETRY_INTERVAL, DEFAULT_IDLE_UNLOAD_AFTER, DEFAULT_LOCK_TIMEOUT,
    DEFAULT_PLAYBACK_TIMEOUT, DEFAULT_QUEUE_CAPACITY,
};
pub use tts_coordinator::in_process::Ticket;
