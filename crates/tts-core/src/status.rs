// SPDX-License-Identifier: MIT

//! Sampled system resource snapshot (`spec.md` §3, §4.2).

use serde::{Deserialize, Serialize};

/// A point-in-time snapshot produced by the `ResourceMonitor` sampler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SystemStatus {
    pub memory_percent: f32,
    pub memory_available_mb: f64,
    pub memory_total_mb: f64,
    pub cpu_percent: f32,
    /// Derived: `memory_percent > threshold` at sample time.
    pub critical: bool,
}

impl SystemStatus {
    pub fn new(
        memory_percent: f32,
        memory_available_mb: f64,
        memory_total_mb: f64,
        cpu_percent: f32,
        threshold_percent: f32,
    ) -> Self {
        Self {
            memory_percent,
            memory_available_mb,
            memory_total_mb,
            cpu_percent,
            critical: memory_percent > threshold_percent,
        }
    }
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self {
            memory_percent: 0.0,
            memory_available_mb: 0.0,
            memory_total_mb: 0.0,
            cpu_percent: 0.0,
            critical: false,
        }
    }
}

impl std::fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RAM: {:.1}% ({:.0}MB free), CPU: {:.1}%",
            self.memory_percent, self.memory_available_mb, self.cpu_percent
        )
    }
}
