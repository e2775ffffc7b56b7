// SPDX-License-Identifier: MIT

//! The `ttsd` binary: local text-to-speech coordination daemon (`spec.md` §2).
//!
//! Architecture mirrors `oj-daemon::main`: a spawned listener task handling
//! socket I/O, a main task awaiting shutdown signals, and an orderly
//! teardown on exit. There is no WAL/event loop here — this daemon has no
//! durable state of its own beyond the cross-process coordination directory
//! `tts-coordinator` already manages.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod lifecycle;
mod listener;
mod protocol;

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

use lifecycle::{Config, LifecycleError, StartupResult};
use listener::{ListenCtx, Listener};

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("ttsd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("ttsd {}", env!("CARGO_PKG_VERSION"));
                println!("Local TTS coordination daemon");
                println!();
                println!("USAGE:");
                println!("    ttsd");
                println!();
                println!("The daemon is typically started on demand by the `tts` client and");
                println!("should not be invoked directly. It listens on a Unix socket for");
                println!("/generate, /status, and /shutdown requests.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: ttsd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load();

    rotate_log_if_needed(&config.log_path);
    write_startup_marker(&config);

    let log_guard = setup_logging(&config)?;
    info!("starting local TTS daemon");

    let StartupResult { lifecycle, listener } =
        match lifecycle::startup(config.clone(), tts_worker::unavailable_model_loader()) {
            Ok(r) => r,
            Err(e) => {
                write_startup_error(&config, &e);
                error!(error = %e, "failed to start daemon");
                drop(log_guard);
                return Err(e.into());
            }
        };

    let shutdown_notify = Arc::new(Notify::new());
    let ctx = Arc::new(ListenCtx {
        worker: Arc::clone(&lifecycle.worker),
        resource_monitor: Arc::clone(&lifecycle.resource_monitor),
        shutdown: Arc::clone(&shutdown_notify),
    });

    let socket_path = lifecycle.config.socket_path.clone();
    let server = Listener::new(listener, ctx);
    tokio::spawn(server.run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(socket = %socket_path.display(), "daemon ready");
    println!("READY");

    tokio::select! {
        _ = shutdown_notify.notified() => {
            info!("shutdown requested via /shutdown");
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("received SIGINT, shutting down");
        }
    }

    lifecycle.shutdown();
    info!("daemon stopped");
    Ok(())
}

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`]. Shifts
/// `service.log` -> `.1` -> `.2` -> `.3`, deleting the oldest. Best-effort:
/// rotation failures are silently ignored so the daemon still starts.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

const STARTUP_MARKER_PREFIX: &str = "--- ttsd: starting (pid: ";

fn write_startup_marker(config: &Config) {
    use std::io::Write;
    if let Some(parent) = config.log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    {
        let _ = writeln!(file, "{}{}) ---\n", STARTUP_MARKER_PREFIX, std::process::id());
    }
}

fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR failed to start daemon: {error}");
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let parent = config
        .log_path
        .parent()
        .ok_or_else(|| std::io::Error::other("log path has no parent directory"))?;
    let file_name = config
        .log_path
        .file_name()
        .ok_or_else(|| std::io::Error::other("log path has no file name"))?;
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
