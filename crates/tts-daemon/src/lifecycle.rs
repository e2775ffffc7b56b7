// SPDX-License-Identifier: MIT

//! Daemon lifecycle: configuration, startup, and orderly shutdown
//! (`spec.md` §6, §7's `Fatal` taxonomy entry).
//!
//! Shape grounded on `oj-daemon::lifecycle`'s `Config`/`startup`/`DaemonState::shutdown`
//! split, with one deliberate divergence: `spec.md` §4.1 supports several
//! daemon instances coordinating through [`SystemCoordinator`]'s FIFO ticket
//! queue rather than mutual exclusion at the daemon level, so this lifecycle
//! does not take an `fs2` single-instance lock the way the teacher's does —
//! only the socket bind itself can collide, and that is reported as
//! [`LifecycleError::BindFailed`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use tts_core::{Clock, SystemClock};
use tts_coordinator::{ResourceMonitor, SystemCoordinator};
use tts_worker::{InferenceWorker, ModelLoader, WorkerConfig, WorkerDeps};

use crate::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub log_path: PathBuf,
    pub memory_threshold_percent: f32,
    pub lock_timeout: Option<Duration>,
    pub idle_unload_after: Option<Duration>,
    /// Pass-throughs for the external model backend plugged in at the
    /// `ModelLoader` seam; this crate never reads their contents.
    pub voice_path: Option<String>,
    pub hf_hub_cache: Option<String>,
    pub hf_home: Option<String>,
    pub lhotse_tools_dir: Option<String>,
}

impl Config {
    /// Load configuration from `LOCAL_TTS_*` environment overrides, falling
    /// back to the spec's pinned defaults (`spec.md` §6).
    pub fn load() -> Self {
        let state_dir = env::state_dir();
        let socket_path = env::socket_path(&state_dir);
        let log_path = env::log_path(&state_dir);
        let memory_threshold_percent = env::memory_threshold_percent()
            .unwrap_or(tts_coordinator::resource_monitor::DEFAULT_MEMORY_THRESHOLD_PERCENT);
        let lock_timeout = env::lock_timeout_ms();
        let idle_unload_after = env::idle_unload_secs().map(Duration::from_secs);

        Self {
            socket_path,
            log_path,
            memory_threshold_percent,
            lock_timeout,
            idle_unload_after,
            voice_path: env::voice_path(),
            hf_hub_cache: env::hf_hub_cache(),
            hf_home: env::hf_home(),
            lhotse_tools_dir: env::lhotse_tools_dir(),
            state_dir,
        }
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to create coordination directory {0}: {1}")]
    DirCreation(PathBuf, #[source] std::io::Error),
    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, #[source] std::io::Error),
    #[error("failed to initialize system coordinator: {0}")]
    Coordinator(#[source] std::io::Error),
}

/// Everything a running daemon needs to tear down in `shutdown`. The
/// listener is returned separately (see [`StartupResult`]) so `main` can
/// move it into a spawned task without partially moving this struct.
pub struct DaemonLifecycle {
    pub config: Config,
    pub worker: Arc<InferenceWorker>,
    pub resource_monitor: Arc<ResourceMonitor>,
    pub coordinator: Arc<SystemCoordinator>,
}

pub struct StartupResult {
    pub lifecycle: DaemonLifecycle,
    pub listener: UnixListener,
}

/// Start the daemon: create the coordination directory, register with the
/// cross-process coordinator, spawn the inference worker, and bind the
/// socket last — only after every other fallible step has succeeded.
pub fn startup(config: Config, model_loader: ModelLoader) -> Result<StartupResult, LifecycleError> {
    match startup_inner(&config, model_loader) {
        Ok(result) => Ok(result),
        Err(e) => {
            cleanup_on_failure(&config);
            Err(e)
        }
    }
}

fn startup_inner(
    config: &Config,
    model_loader: ModelLoader,
) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)
        .map_err(|e| LifecycleError::DirCreation(config.state_dir.clone(), e))?;

    forward_model_env(config);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let coordinator = Arc::new(
        SystemCoordinator::new(&config.state_dir, clock.clone())
            .map_err(LifecycleError::Coordinator)?,
    );
    let resource_monitor = Arc::new(ResourceMonitor::new(config.memory_threshold_percent));
    resource_monitor
        .clone()
        .spawn_sampler(tts_coordinator::resource_monitor::DEFAULT_SAMPLE_INTERVAL);

    let mut worker_config = WorkerConfig::default();
    if let Some(lock_timeout) = config.lock_timeout {
        worker_config.lock_timeout = lock_timeout;
    }
    if let Some(idle_unload_after) = config.idle_unload_after {
        worker_config.idle_unload_after = idle_unload_after;
    }

    let (worker, _worker_task) = InferenceWorker::spawn(
        WorkerDeps {
            coordinator: coordinator.clone(),
            resource_monitor: resource_monitor.clone(),
            model_loader,
            clock,
            scratch_dir: config.state_dir.clone(),
        },
        worker_config,
    );

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)
            .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(socket = %config.socket_path.display(), "daemon started");

    Ok(StartupResult {
        lifecycle: DaemonLifecycle {
            config: config.clone(),
            worker: Arc::new(worker),
            resource_monitor,
            coordinator,
        },
        listener,
    })
}

impl DaemonLifecycle {
    /// Orderly shutdown: deregister from the cross-process registry and
    /// remove the socket file. The worker task and its queue are dropped
    /// along with the `Arc<InferenceWorker>` handle.
    pub fn shutdown(&self) {
        info!("shutting down daemon");
        self.coordinator.deregister();
        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!(error = %e, "failed to remove socket file");
            }
        }
        info!("daemon shutdown complete");
    }
}

/// Re-forward the model-backend pass-through variables into the process
/// environment, normalizing `LOCAL_TTS_VOICE_PATH`'s `~` expansion, so the
/// external model loader plugged in at the `ModelLoader` seam sees a
/// resolved value regardless of how the caller originally set it.
fn forward_model_env(config: &Config) {
    if let Some(path) = &config.voice_path {
        std::env::set_var("LOCAL_TTS_VOICE_PATH", env::expand_tilde(path));
    }
    if let Some(cache) = &config.hf_hub_cache {
        std::env::set_var("HF_HUB_CACHE", cache);
    }
    if let Some(home) = &config.hf_home {
        std::env::set_var("HF_HOME", home);
    }
    if let Some(dir) = &config.lhotse_tools_dir {
        std::env::set_var("LHOTSE_TOOLS_DIR", dir);
    }
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
