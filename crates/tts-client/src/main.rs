// SPDX-License-Identifier: MIT

//! `tts`: thin CLI front-end for the local TTS daemon.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod daemon_process;
mod env;

use clap::{Parser, Subcommand};

use client::{ClientError, TtsClient};

#[derive(Parser)]
#[command(name = "tts", version, about = "Local TTS coordination client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue text for speech generation, starting the daemon if needed
    Speak {
        /// Text to speak
        text: String,
        /// Path to a reference voice clip
        #[arg(long)]
        voice_path: Option<String>,
        /// Catalog voice name
        #[arg(long)]
        voice_name: Option<String>,
    },
    /// Report whether the daemon is running and its resource usage
    Status,
    /// Ask a running daemon to shut down
    Shutdown,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Speak {
            text,
            voice_path,
            voice_name,
        } => run_speak(text, voice_path, voice_name).await,
        Commands::Status => run_status().await,
        Commands::Shutdown => run_shutdown().await,
    };

    std::process::exit(exit_code);
}

async fn run_speak(text: String, voice_path: Option<String>, voice_name: Option<String>) -> i32 {
    let client = match TtsClient::connect_or_start() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    match client.speak(text, voice_path, voice_name).await {
        Ok(response) => {
            println!("queued (ticket {})", response.ticket);
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

/// Query commands connect only — a stopped daemon is reported as stopped,
/// not auto-started just to be asked whether it's running.
async fn run_status() -> i32 {
    match TtsClient::connect() {
        Ok(client) => {
            let status = client.status().await;
            println!(
                "status: {}, model_loaded: {}, ram: {:.1}%, rss: {:.1} MB",
                status.status, status.model_loaded, status.ram_percent, status.rss_mb
            );
            0
        }
        Err(ClientError::DaemonNotRunning) => {
            println!("status: stopped");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

async fn run_shutdown() -> i32 {
    match TtsClient::connect() {
        Ok(client) => {
            client.shutdown().await;
            println!("shutdown requested");
            0
        }
        Err(ClientError::DaemonNotRunning) => {
            println!("daemon not running");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
