// SPDX-License-Identifier: MIT

//! Cross-process FIFO ticket queue + exclusive lock over the shared TTS
//! model and audio device (`spec.md` §4.1).
//!
//! Rendezvous happens entirely on the local filesystem: a queue directory of
//! ticket files gives FIFO ordering, and an `fs2`-advisory-locked file gives
//! hard mutual exclusion that survives a crashed holder (the OS drops the
//! lock when the holding process dies — see `spec.md` §9's warning against
//! lockfiles whose cleanup depends on the process).

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::{info, warn};

use tts_core::ticket::{registry_file_name, ticket_file_name, TicketInfo};
use tts_core::{Clock, CoordinatorError, LockHolder, RegistryEntry};

use crate::pid_alive;

/// Default polling interval while waiting for our ticket to sort first
/// (`spec.md` §4.1, §9 — intentional, bounds stale-ticket detection latency
/// without a per-platform filesystem watcher).
pub const QUEUE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Upper bound on queue latency before a ticket is reaped regardless of its
/// owner's liveness.
pub const STALE_TICKET_AGE: Duration = Duration::from_secs(5 * 60);

/// Cross-process coordinator: one FIFO ticket queue plus one exclusive lock
/// file, both rooted at a shared coordination directory
/// (`/tmp/local-tts-mcp/` by default — see `spec.md` §6).
pub struct SystemCoordinator {
    queue_dir: PathBuf,
    registry_dir: PathBuf,
    lock_path: PathBuf,
    pid: u32,
    instance_id: String,
    instance_nanos: i64,
    parent_tool: String,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    stale_ticket_age: Duration,
}

/// RAII scope returned by [`SystemCoordinator::with_inference_lock`]. The
/// holder's exclusive rights to the model and audio device last exactly as
/// long as this guard is alive; dropping it releases the OS lock and
/// deletes the coordinator's ticket, on every exit path including panics.
pub struct SystemLockGuard {
    file: Option<File>,
    ticket_path: PathBuf,
    waited: Duration,
}

impl SystemLockGuard {
    /// How long this acquisition waited in the FIFO queue before the lock
    /// was granted.
    pub fn wait_time(&self) -> Duration {
        self.waited
    }
}

impl Drop for SystemLockGuard {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = FileExt::unlock(&file) {
                warn!(error = %e, "failed to unlock inference lock file");
            }
        }
        if let Err(e) = std::fs::remove_file(&self.ticket_path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(error = %e, path = %self.ticket_path.display(), "failed to remove ticket");
            }
        }
        info!("released inference lock");
    }
}

impl SystemCoordinator {
    /// Create a coordinator rooted at `coordination_dir`, creating
    /// `queue/` and `registry/` subdirectories if needed, and register this
    /// process in the shared registry.
    pub fn new(coordination_dir: impl AsRef<Path>, clock: Arc<dyn Clock>) -> io::Result<Self> {
        let root = coordination_dir.as_ref().to_path_buf();
        let queue_dir = root.join("queue");
        let registry_dir = root.join("registry");
        let lock_path = root.join("inference.lock");

        std::fs::create_dir_all(&queue_dir)?;
        std::fs::create_dir_all(&registry_dir)?;

        let pid = std::process::id();
        let instance_nanos = clock.now_nanos();
        let instance_id = format!("{pid}-{instance_nanos}");
        let parent_tool = tts_core::detect_parent_tool();

        let coordinator = Self {
            queue_dir,
            registry_dir,
            lock_path,
            pid,
            instance_id,
            instance_nanos,
            parent_tool,
            clock,
            poll_interval: QUEUE_POLL_INTERVAL,
            stale_ticket_age: STALE_TICKET_AGE,
        };
        coordinator.register()?;

        info!(
            instance_id = %coordinator.instance_id,
            parent_tool = %coordinator.parent_tool,
            "registered TTS daemon instance"
        );

        Ok(coordinator)
    }

    #[cfg(test)]
    pub(crate) fn with_intervals(
        coordination_dir: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
        stale_ticket_age: Duration,
    ) -> io::Result<Self> {
        let mut c = Self::new(coordination_dir, clock)?;
        c.poll_interval = poll_interval;
        c.stale_ticket_age = stale_ticket_age;
        Ok(c)
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Write this instance's registry entry.
    fn register(&self) -> io::Result<()> {
        let entry = RegistryEntry {
            pid: self.pid,
            instance_id: self.instance_id.clone(),
            parent_tool: self.parent_tool.clone(),
            start_time_nanos: self.instance_nanos,
        };
        let path = self
            .registry_dir
            .join(registry_file_name(self.pid, self.instance_nanos));
        let bytes = serde_json::to_vec_pretty(&entry).map_err(io::Error::other)?;
        std::fs::write(path, bytes)
    }

    /// Remove this instance's registry entry. Called on orderly shutdown.
    pub fn deregister(&self) {
        let path = self
            .registry_dir
            .join(registry_file_name(self.pid, self.instance_nanos));
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(error = %e, "failed to remove registry entry");
            }
        }
    }

    /// Acquire exclusive, system-wide rights to load/use the TTS model and
    /// audio device, enter the scope, and release on every exit path
    /// (success, error, or the guard simply being dropped).
    ///
    /// Fails with [`CoordinatorError::Timeout`] if the scope cannot be
    /// entered within `timeout`; the ticket is still removed in that case.
    pub async fn with_inference_lock(
        &self,
        timeout: Duration,
    ) -> Result<SystemLockGuard, CoordinatorError> {
        let ticket_nanos = self.clock.now_nanos();
        let ticket_name = ticket_file_name(ticket_nanos, self.pid);
        let ticket_path = self.queue_dir.join(&ticket_name);
        self.write_ticket(&ticket_path, ticket_nanos)?;

        let start = Instant::now();
        if let Err(e) = self.wait_for_turn(&ticket_name, start, timeout).await {
            let _ = std::fs::remove_file(&ticket_path);
            return Err(e);
        }

        let remaining = timeout.saturating_sub(start.elapsed()).max(Duration::from_millis(1));
        let lock_path = self.lock_path.clone();
        let acquire = tokio::task::spawn_blocking(move || -> io::Result<File> {
            let file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&lock_path)?;
            FileExt::lock_exclusive(&file)?;
            Ok(file)
        });

        let file = match tokio::time::timeout(remaining, acquire).await {
            Ok(Ok(Ok(file))) => file,
            Ok(Ok(Err(e))) => {
                let _ = std::fs::remove_file(&ticket_path);
                return Err(CoordinatorError::Io(e));
            }
            Ok(Err(_join_err)) => {
                let _ = std::fs::remove_file(&ticket_path);
                return Err(CoordinatorError::Io(io::Error::other(
                    "lock acquisition task panicked",
                )));
            }
            Err(_elapsed) => {
                let _ = std::fs::remove_file(&ticket_path);
                return Err(CoordinatorError::Timeout(timeout));
            }
        };

        if let Err(e) = self.write_holder(&file) {
            warn!(error = %e, "failed to write lock holder descriptor");
        }

        let waited = start.elapsed();
        info!(?waited, "acquired inference lock");

        Ok(SystemLockGuard {
            file: Some(file),
            ticket_path,
            waited,
        })
    }

    async fn wait_for_turn(
        &self,
        ticket_name: &str,
        start: Instant,
        timeout: Duration,
    ) -> Result<(), CoordinatorError> {
        let mut logged_positions: HashSet<usize> = HashSet::new();
        loop {
            self.reap_stale_tickets();
            let tickets = self.sorted_ticket_names();
            if tickets.first().map(String::as_str) == Some(ticket_name) || tickets.is_empty() {
                return Ok(());
            }

            if start.elapsed() > timeout {
                return Err(CoordinatorError::Timeout(timeout));
            }

            let position = tickets.iter().position(|t| t == ticket_name).map(|p| p + 1);
            if let Some(position) = position {
                if logged_positions.insert(position) {
                    info!(
                        position,
                        total = tickets.len(),
                        elapsed = ?start.elapsed(),
                        "waiting for inference lock"
                    );
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn write_ticket(&self, path: &Path, enqueue_time_nanos: i64) -> Result<(), CoordinatorError> {
        let info = TicketInfo {
            pid: self.pid,
            instance_id: self.instance_id.clone(),
            parent_tool: self.parent_tool.clone(),
            enqueue_time_nanos,
        };
        std::fs::write(path, serde_json::to_vec_pretty(&info)?)?;
        Ok(())
    }

    fn write_holder(&self, file: &File) -> io::Result<()> {
        use std::io::{Seek, SeekFrom, Write};

        let holder = LockHolder {
            pid: self.pid,
            instance_id: self.instance_id.clone(),
            parent_tool: self.parent_tool.clone(),
            acquired_at_nanos: self.clock.now_nanos(),
        };
        let bytes = serde_json::to_vec_pretty(&holder).map_err(io::Error::other)?;
        let mut file = file;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&bytes)?;
        file.flush()
    }

    /// Remove any ticket belonging to a dead pid, or older than
    /// `stale_ticket_age`. Idempotent; races with other reapers are benign
    /// (unlink of an already-removed file fails with `NotFound`, ignored).
    fn reap_stale_tickets(&self) {
        let Ok(entries) = std::fs::read_dir(&self.queue_dir) else {
            return;
        };
        let now = self.clock.now_nanos();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("ticket") {
                continue;
            }
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            let Ok(info) = serde_json::from_slice::<TicketInfo>(&bytes) else {
                let _ = std::fs::remove_file(&path);
                continue;
            };

            let age = Duration::from_nanos((now - info.enqueue_time_nanos).max(0) as u64);
            let dead = !pid_alive(info.pid);
            let stale = age > self.stale_ticket_age;

            if dead || stale {
                let _ = std::fs::remove_file(&path);
                info!(
                    pid = info.pid,
                    parent_tool = %info.parent_tool,
                    reason = if dead { "dead pid" } else { "stale age" },
                    "reaped ticket"
                );
            }
        }
    }

    fn reap_stale_registry(&self) {
        let Ok(entries) = std::fs::read_dir(&self.registry_dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            let Ok(info) = serde_json::from_slice::<RegistryEntry>(&bytes) else {
                let _ = std::fs::remove_file(&path);
                continue;
            };
            if !pid_alive(info.pid) {
                let _ = std::fs::remove_file(&path);
                info!(pid = info.pid, "reaped dead registry entry");
            }
        }
    }

    fn sorted_ticket_names(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.queue_dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.ends_with(".ticket"))
            .collect();
        names.sort();
        names
    }

    /// Snapshot of all live daemon instances, dead-pid entries reaped first.
    pub fn active_instances(&self) -> Vec<RegistryEntry> {
        self.reap_stale_registry();
        let Ok(entries) = std::fs::read_dir(&self.registry_dir) else {
            return Vec::new();
        };
        let mut instances: Vec<RegistryEntry> = entries
            .flatten()
            .filter_map(|e| std::fs::read(e.path()).ok())
            .filter_map(|bytes| serde_json::from_slice(&bytes).ok())
            .collect();
        instances.sort_by_key(|i: &RegistryEntry| i.start_time_nanos);
        instances
    }

    /// Snapshot of all in-flight tickets, in FIFO order.
    pub fn queue_status(&self) -> Vec<TicketInfo> {
        self.reap_stale_tickets();
        self.sorted_ticket_names()
            .into_iter()
            .filter_map(|name| std::fs::read(self.queue_dir.join(name)).ok())
            .filter_map(|bytes| serde_json::from_slice(&bytes).ok())
            .collect()
    }

    /// Best-effort read of whoever currently holds the lock. Does not take
    /// the advisory lock itself, so this can race with a concurrent holder
    /// write; acceptable since it is observational only.
    pub fn current_holder(&self) -> Option<LockHolder> {
        let bytes = std::fs::read(&self.lock_path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

#[cfg(test)]
#[path = "system_coordinator_tests.rs"]
mod tests;
