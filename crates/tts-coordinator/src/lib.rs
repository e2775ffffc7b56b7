// SPDX-License-Identifier: MIT

//! tts-coordinator: cross-process fair mutual exclusion over the shared TTS
//! model/audio device (`SystemCoordinator`), resource-aware admission
//! (`ResourceMonitor`), and in-process playback ordering
//! (`InProcessCoordinator`).

pub mod in_process;
pub mod resource_monitor;
pub mod system_coordinator;

pub use in_process::InProcessCoordinator;
pub use resource_monitor::ResourceMonitor;
pub use system_coordinator::{SystemCoordinator, SystemLockGuard};

/// Whether a process with the given pid is still alive. Used to reap
/// tickets and registry entries left behind by a crashed instance.
pub(crate) fn pid_alive(pid: u32) -> bool {
    let mut system = sysinfo::System::new();
    system.refresh_processes(
        sysinfo::ProcessesToUpdate::Some(&[sysinfo::Pid::from_u32(pid)]),
        true,
    );
    system.process(sysinfo::Pid::from_u32(pid)).is_some()
}
