// SPDX-License-Identifier: MIT

//! `InferenceWorker`: the single-consumer pipeline that turns a queued
//! `Request` into spoken audio.
//!
//! Grounded on `original_source/src/local_tts/service.py::worker_loop`'s
//! exact step order (admission check, lazy model load, voice setup, chunked
//! generation, assembly, persistence, playback) and on `oj-daemon::main`'s
//! event-loop shape: a timed receive so the loop can periodically run
//! maintenance (there, WAL compaction; here, the idle-unload check) even
//! while the queue is empty.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use tts_audio::{assemble, chunk_text, play_wav_file, trim_voice_clip, write_wav};
use tts_core::{Clock, Request, WorkerError};
use tts_coordinator::in_process::Ticket;
use tts_coordinator::{InProcessCoordinator, ResourceMonitor, SystemCoordinator};
use tts_model::{resolve_catalog_voice, TtsModel, VoiceSource};

/// Default bound on requests admitted ahead of the worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// How often the worker re-checks for work and, if the queue stays empty,
/// whether the loaded model has gone idle.
pub const DEQUEUE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How long a loaded model may sit unused before it's dropped.
pub const DEFAULT_IDLE_UNLOAD_AFTER: Duration = Duration::from_secs(60);

/// How long to wait before re-checking admission after a backpressure
/// deferral.
pub const BACKPRESSURE_RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// Default ceiling on how long a single request waits for the system lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(120);

/// Default ceiling on the playback subprocess.
pub const DEFAULT_PLAYBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Loads (or reloads) the shared model handle. Dispatched through
/// `spawn_blocking`, so it may do real, synchronous, possibly slow work.
pub type ModelLoader = Arc<dyn Fn() -> Result<Arc<dyn TtsModel>, WorkerError> + Send + Sync>;

/// A [`ModelLoader`] that always fails with [`WorkerError::ModelUnavailable`].
///
/// The TTS model backend itself is an external collaborator out of scope
/// for this core (`spec.md` §1); this is the seam `ttsd` wires a real
/// `TtsModel` implementation into. Until one is plugged in, every request
/// surfaces a request-level `ModelUnavailable` error and the daemon stays
/// up, exactly as `spec.md` §7 specifies for that error kind.
pub fn unavailable_model_loader() -> ModelLoader {
    Arc::new(|| {
        Err(WorkerError::ModelUnavailable(
            "no TTS model backend configured".into(),
        ))
    })
}

/// External collaborators the worker needs but doesn't own the lifecycle
/// of: the cross-process lock, the resource sampler, and a way to obtain a
/// model handle.
pub struct WorkerDeps {
    pub coordinator: Arc<SystemCoordinator>,
    pub resource_monitor: Arc<ResourceMonitor>,
    pub model_loader: ModelLoader,
    pub clock: Arc<dyn Clock>,
    /// Scratch directory for trimmed voice clips and generated WAVs before
    /// playback.
    pub scratch_dir: PathBuf,
}

/// Tunable timing knobs, all defaulted to the values `spec.md` §4 names.
#[derive(Clone)]
pub struct WorkerConfig {
    pub queue_capacity: usize,
    pub idle_unload_after: Duration,
    pub backpressure_retry: Duration,
    pub lock_timeout: Duration,
    pub playback_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            idle_unload_after: DEFAULT_IDLE_UNLOAD_AFTER,
            backpressure_retry: BACKPRESSURE_RETRY_INTERVAL,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            playback_timeout: DEFAULT_PLAYBACK_TIMEOUT,
        }
    }
}

struct QueuedRequest {
    request: Request,
    ticket: Ticket,
}

struct ModelState {
    model: Option<Arc<dyn TtsModel>>,
    last_activity_nanos: i64,
}

struct Inner {
    deps: WorkerDeps,
    config: WorkerConfig,
    in_process: Arc<InProcessCoordinator>,
    state: Mutex<ModelState>,
    model_loaded: Arc<AtomicBool>,
}

/// Handle to a running worker loop. Cloning isn't needed — `submit` takes
/// `&self` and is safe to call from any number of RPC-handling tasks.
pub struct InferenceWorker {
    sender: mpsc::Sender<QueuedRequest>,
    in_process: Arc<InProcessCoordinator>,
    model_loaded: Arc<AtomicBool>,
}

impl InferenceWorker {
    /// Spawn the worker loop as a background task and return a handle to
    /// submit requests to it, plus the task's `JoinHandle` for shutdown.
    pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let in_process = Arc::new(InProcessCoordinator::new());
        let model_loaded = Arc::new(AtomicBool::new(false));
        let inner = Arc::new(Inner {
            deps,
            config,
            in_process: in_process.clone(),
            state: Mutex::new(ModelState {
                model: None,
                last_activity_nanos: 0,
            }),
            model_loaded: model_loaded.clone(),
        });

        let handle = tokio::spawn(inner.run(receiver));
        (
            Self {
                sender,
                in_process,
                model_loaded,
            },
            handle,
        )
    }

    /// Whether the model is currently loaded, for the `/status` RPC.
    pub fn is_model_loaded(&self) -> bool {
        self.model_loaded.load(Ordering::Relaxed)
    }

    /// Validate and enqueue a request, returning its playback-ordering
    /// ticket immediately — before generation has even started. This is
    /// what lets `/generate` return `{"status": "queued", "ticket": ...}`
    /// without waiting on the pipeline.
    pub async fn submit(&self, request: Request) -> Result<Ticket, WorkerError> {
        if request.text.trim().is_empty() {
            return Err(WorkerError::InputInvalid("text must not be empty".into()));
        }

        let ticket = self.in_process.issue();
        self.sender
            .send(QueuedRequest { request, ticket })
            .await
            .map_err(|_| WorkerError::Fatal("worker loop has stopped accepting requests".into()))?;
        Ok(ticket)
    }
}

impl Inner {
    async fn run(self: Arc<Self>, mut receiver: mpsc::Receiver<QueuedRequest>) {
        info!("TTS inference worker loop started");
        loop {
            match tokio::time::timeout(DEQUEUE_POLL_INTERVAL, receiver.recv()).await {
                Ok(Some(item)) => self.process_request(item).await,
                Ok(None) => {
                    info!("request channel closed, worker loop exiting");
                    break;
                }
                Err(_elapsed) => self.maybe_unload_idle_model(),
            }
        }
    }

    /// The ten-step pipeline (`spec.md` §4.4): admission, system lock,
    /// lazy model load, voice resolution, chunking, generation, assembly,
    /// persistence, ordered playback. Every exit path calls `finish_turn`
    /// exactly once; the system-lock guard, held in a local binding,
    /// releases on every exit path via `Drop`.
    async fn process_request(&self, item: QueuedRequest) {
        let QueuedRequest { request, ticket } = item;

        self.state.lock().last_activity_nanos = self.deps.clock.now_nanos();

        let estimated_mb = 500.0 + 0.05 * request.text.chars().count() as f64;
        while !self.deps.resource_monitor.can_allocate(estimated_mb) {
            warn!(estimated_mb, ticket, "deferring generation, low memory");
            tokio::time::sleep(self.config.backpressure_retry).await;
        }

        let guard = match self
            .deps
            .coordinator
            .with_inference_lock(self.config.lock_timeout)
            .await
        {
            Ok(guard) => guard,
            Err(e) => {
                warn!(error = %e, ticket, "coordination timeout, abandoning request");
                self.in_process.finish_turn(ticket);
                return;
            }
        };

        let model = match self.ensure_model_loaded().await {
            Ok(model) => model,
            Err(e) => {
                warn!(error = %e, ticket, "model unavailable");
                self.in_process.finish_turn(ticket);
                return;
            }
        };

        let scratch_dir = self.deps.scratch_dir.clone();
        let voice_path = request.voice_path.clone();
        let voice_name = request.voice_name.clone();
        let text = request.text.clone();

        let generated = tokio::task::spawn_blocking(move || {
            generate_utterance(model.as_ref(), &text, voice_path.as_deref(), voice_name.as_deref(), &scratch_dir)
        })
        .await;

        let (samples, sample_rate) = match generated {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                if e.should_log() {
                    warn!(error = %e, ticket, "generation failed");
                }
                self.in_process.finish_turn(ticket);
                return;
            }
            Err(_join_err) => {
                warn!(ticket, "generation task panicked");
                self.in_process.finish_turn(ticket);
                return;
            }
        };

        let wav_path = self
            .deps
            .scratch_dir
            .join(format!("tts-{}-{ticket}.wav", std::process::id()));
        if let Err(e) = write_wav(&wav_path, &samples, sample_rate) {
            warn!(error = %e, ticket, "failed to persist generated audio");
            self.in_process.finish_turn(ticket);
            return;
        }

        let in_process = self.in_process.clone();
        if tokio::task::spawn_blocking(move || in_process.wait_turn(ticket))
            .await
            .is_err()
        {
            warn!(ticket, "playback-order wait task panicked");
        }

        let outcome = play_wav_file(&wav_path, self.config.playback_timeout).await;
        let _ = std::fs::remove_file(&wav_path);
        self.in_process.finish_turn(ticket);

        match outcome {
            Ok(outcome) => info!(?outcome, ticket, "utterance played"),
            Err(e) => warn!(error = %e, ticket, "playback failed"),
        }

        // `guard` releases the system lock here, after playback — Strategy A.
    }

    /// Return the cached model handle, loading it via `spawn_blocking` on
    /// first use.
    async fn ensure_model_loaded(&self) -> Result<Arc<dyn TtsModel>, WorkerError> {
        if let Some(model) = self.state.lock().model.clone() {
            return Ok(model);
        }

        let loader = self.deps.model_loader.clone();
        let loaded = tokio::task::spawn_blocking(move || (*loader)())
            .await
            .map_err(|_| WorkerError::ModelUnavailable("model load task panicked".into()))?;
        let model = loaded?;

        info!("loaded TTS model");
        self.state.lock().model = Some(model.clone());
        self.model_loaded.store(true, Ordering::Relaxed);
        Ok(model)
    }

    /// Drop the cached model if it's been idle longer than configured.
    /// Called whenever a dequeue times out with no work pending.
    fn maybe_unload_idle_model(&self) {
        let mut state = self.state.lock();
        if state.model.is_none() {
            return;
        }
        let now = self.deps.clock.now_nanos();
        let idle = Duration::from_nanos((now - state.last_activity_nanos).max(0) as u64);
        if idle > self.config.idle_unload_after {
            state.model = None;
            self.model_loaded.store(false, Ordering::Relaxed);
            info!(?idle, "unloaded TTS model due to inactivity");
        }
    }
}

/// Resolve the voice, chunk the text, and generate+assemble one utterance.
/// A free function (not a method) so it can be moved wholesale into a
/// `spawn_blocking` closure without borrowing `Inner`.
fn generate_utterance(
    model: &dyn TtsModel,
    text: &str,
    voice_path: Option<&str>,
    voice_name: Option<&str>,
    scratch_dir: &Path,
) -> Result<(Vec<f32>, u32), WorkerError> {
    let mut trimmed_scratch_path = None;
    let voice_source = if let Some(path) = voice_path {
        let path = PathBuf::from(path);
        let trimmed = trim_voice_clip(&path, scratch_dir)
            .map_err(|e| WorkerError::VoiceResolutionFailed(e.to_string()))?;
        if trimmed != path {
            trimmed_scratch_path = Some(trimmed.clone());
        }
        VoiceSource::Path(trimmed)
    } else {
        VoiceSource::Name(resolve_catalog_voice(voice_name))
    };

    let state = model.state_for_voice(&voice_source);

    // The trimmed clip is a scratch copy distinct from the caller's
    // voice_path; remove it once state_for_voice has consumed it, on
    // both the success and failure paths.
    if let Some(trimmed) = &trimmed_scratch_path {
        let _ = std::fs::remove_file(trimmed);
    }

    let state = state.map_err(|e| WorkerError::VoiceResolutionFailed(e.to_string()))?;

    let mut segments = Vec::new();
    for chunk in chunk_text(text) {
        if chunk.trim().is_empty() {
            continue;
        }
        match model.generate(&state, &chunk) {
            Ok(segment) if !segment.is_empty() => segments.push(segment),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "chunk generation failed, skipping"),
        }
    }

    let assembled = assemble(segments).map_err(|e| WorkerError::ModelUnavailable(e.to_string()))?;
    Ok((assembled, model.sample_rate()))
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
