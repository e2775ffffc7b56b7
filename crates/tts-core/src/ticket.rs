// SPDX-License-Identifier: MIT

//! Cross-process coordination descriptors (`spec.md` §3): the JSON bodies
//! written into ticket files, registry entries, and the lock file.

use serde::{Deserialize, Serialize};

/// Body of a cross-process ticket file
/// (`queue/<20-digit ns timestamp>-<pid>.ticket`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketInfo {
    pub pid: u32,
    pub instance_id: String,
    pub parent_tool: String,
    /// Nanoseconds since the Unix epoch, the same value encoded in the
    /// ticket's filename.
    pub enqueue_time_nanos: i64,
}

/// Body of a `registry/<pid>-<ns>.json` file: one per live daemon instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryEntry {
    pub pid: u32,
    pub instance_id: String,
    pub parent_tool: String,
    pub start_time_nanos: i64,
}

/// Body written into the lock file while the exclusive lock is held.
/// Observational only — correctness depends on the underlying OS advisory
/// lock, never on this document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LockHolder {
    pub pid: u32,
    pub instance_id: String,
    pub parent_tool: String,
    pub acquired_at_nanos: i64,
}

/// Build the canonical ticket filename: `<20-digit ns timestamp>-<pid>.ticket`.
/// Lexicographic sort of these names is a total FIFO order: nanosecond
/// timestamps zero-padded to 20 digits sort identically to numeric order,
/// and the `-<pid>` suffix breaks ties between tickets created in the same
/// nanosecond (which only one in-flight acquisition per pid can produce).
pub fn ticket_file_name(enqueue_time_nanos: i64, pid: u32) -> String {
    format!("{:020}-{}.ticket", enqueue_time_nanos.max(0), pid)
}

/// Build the canonical registry filename: `<pid>-<ns>.json`.
pub fn registry_file_name(pid: u32, instance_nanos: i64) -> String {
    format!("{pid}-{instance_nanos}.json")
}

#[cfg(test)]
#[path = "ticket_tests.rs"]
mod tests;
