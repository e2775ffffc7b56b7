// SPDX-License-Identifier: MIT

//! Resource-aware admission control (`spec.md` §4.2): a periodically
//! refreshed snapshot of system memory/CPU, used to apply backpressure to
//! new generation requests rather than starting work the machine can't
//! afford.
//!
//! Grounded on `original_source/src/local_tts/resource_manager.py`'s
//! `ResourceManager`: same threshold-crossing definition of "critical", same
//! allocation-feasibility arithmetic. The Python original polls on a
//! dedicated background thread guarded by a lock; here a `parking_lot::Mutex`
//! over a cached `sysinfo::System` plays the same role, refreshed either
//! inline (`refresh`) or by a spawned `tokio` sampling task.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sysinfo::System;
use tokio::task::JoinHandle;
use tracing::warn;

use tts_core::SystemStatus;

/// Default percentage of total memory in use above which the daemon
/// considers itself under memory pressure.
pub const DEFAULT_MEMORY_THRESHOLD_PERCENT: f32 = 85.0;

/// Default interval for the background sampler.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

/// Samples system memory and CPU usage and answers admission-control
/// questions against a configurable threshold.
pub struct ResourceMonitor {
    system: Mutex<System>,
    status: Mutex<SystemStatus>,
    threshold_percent: f32,
}

impl ResourceMonitor {
    /// Build a monitor and take an initial synchronous sample so
    /// `status()` is meaningful before any background sampler runs.
    pub fn new(threshold_percent: f32) -> Self {
        let mut system = System::new_all();
        let status = Self::sample(&mut system, threshold_percent);
        Self {
            system: Mutex::new(system),
            status: Mutex::new(status),
            threshold_percent,
        }
    }

    fn sample(system: &mut System, threshold_percent: f32) -> SystemStatus {
        system.refresh_memory();
        system.refresh_cpu_usage();

        let total_kb = system.total_memory();
        let available_kb = system.available_memory();
        let memory_percent = if total_kb > 0 {
            100.0 * (1.0 - available_kb as f64 / total_kb as f64)
        } else {
            0.0
        } as f32;

        SystemStatus::new(
            memory_percent,
            available_kb as f64 / 1024.0,
            total_kb as f64 / 1024.0,
            system.global_cpu_usage(),
            threshold_percent,
        )
    }

    /// Re-sample and cache the result. Safe to call from any thread;
    /// cheap enough to call inline before an admission decision.
    pub fn refresh(&self) {
        let mut system = self.system.lock();
        let status = Self::sample(&mut system, self.threshold_percent);
        drop(system);

        if status.critical {
            warn!(%status, "system resources under pressure");
        }
        *self.status.lock() = status;
    }

    /// The most recently sampled snapshot.
    pub fn status(&self) -> SystemStatus {
        *self.status.lock()
    }

    /// Whether a new generation request should be admitted right now.
    pub fn is_safe_to_run(&self) -> bool {
        !self.status().critical
    }

    /// Whether allocating an additional `estimated_mb` of memory would push
    /// usage past the threshold.
    pub fn can_allocate(&self, estimated_mb: f64) -> bool {
        let status = self.status();
        if status.memory_total_mb <= 0.0 {
            return true;
        }
        let current_used_mb = status.memory_total_mb * (status.memory_percent as f64 / 100.0);
        let new_percent = (current_used_mb + estimated_mb) / status.memory_total_mb * 100.0;
        if new_percent as f32 > self.threshold_percent {
            warn!(
                estimated_mb,
                new_percent,
                threshold = self.threshold_percent,
                "allocation rejected, would exceed memory threshold"
            );
            return false;
        }
        true
    }

    /// Resident set size of the current process, in megabytes. Used only by
    /// the `/status` RPC; mirrors `resource_manager.py`'s
    /// `get_process_memory_info`'s `rss_mb`.
    pub fn process_rss_mb(&self) -> f64 {
        let pid = sysinfo::Pid::from_u32(std::process::id());
        let mut system = self.system.lock();
        system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[pid]), true);
        system
            .process(pid)
            .map(|p| p.memory() as f64 / (1024.0 * 1024.0))
            .unwrap_or(0.0)
    }

    /// Spawn a background task that refreshes the cached snapshot on a
    /// fixed interval, for the lifetime of the daemon.
    pub fn spawn_sampler(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.refresh();
            }
        })
    }
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_THRESHOLD_PERCENT)
    }
}

#[cfg(test)]
#[path = "resource_monitor_tests.rs"]
mod tests;
