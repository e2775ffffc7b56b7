// SPDX-License-Identifier: MIT

//! Best-effort identification of the ancestor process that launched this
//! daemon — observability only, never load-bearing for correctness.
//!
//! The original Python implementation (`system_lock.py::_detect_parent_tool`)
//! shells out to `ps` once per ancestor. We instead walk the process table
//! already loaded by [`sysinfo`] (also used by `ResourceMonitor`), which
//! avoids a subprocess per lookup and is the idiomatic way to inspect
//! process ancestry from Rust.

use sysinfo::{Pid, System};

const MAX_ANCESTOR_DEPTH: usize = 8;

/// Known parent-process command names mapped to a human-readable tool
/// label, taken from `original_source/src/local_tts/system_lock.py`.
const TOOL_TABLE: &[(&str, &str)] = &[
    ("code-insi", "VS Code Insiders / GitHub Copilot"),
    ("code", "VS Code / GitHub Copilot"),
    ("cursor", "Cursor"),
    ("claude", "Claude Desktop"),
    ("windsurf", "Windsurf"),
    ("zed", "Zed"),
    ("warp", "Warp Terminal"),
    ("terminal", "Terminal (manual)"),
    ("iterm", "iTerm2 (manual)"),
    ("kitty", "Kitty (manual)"),
    ("alacritty", "Alacritty (manual)"),
];

/// Walk up the process tree from the current process, returning the first
/// recognized tool label, or `"unknown"` if none matched within
/// [`MAX_ANCESTOR_DEPTH`] levels or the process table can't be read.
pub fn detect_parent_tool() -> String {
    let mut system = System::new();
    system.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

    let Some(mut current) = std::process::id()
        .try_into()
        .ok()
        .and_then(|pid: u32| system.process(Pid::from_u32(pid)))
        .and_then(|p| p.parent())
    else {
        return "unknown".to_string();
    };

    let mut visited = std::collections::HashSet::new();
    for _ in 0..MAX_ANCESTOR_DEPTH {
        if !visited.insert(current) {
            break;
        }
        let Some(process) = system.process(current) else {
            break;
        };
        let name = process.name().to_string_lossy().to_lowercase();
        for (needle, label) in TOOL_TABLE {
            if name.contains(needle) {
                return (*label).to_string();
            }
        }
        match process.parent() {
            Some(parent) if parent != current => current = parent,
            _ => break,
        }
    }

    "unknown".to_string()
}

#[cfg(test)]
#[path = "parent_tool_tests.rs"]
mod tests;
