//! Daemon module for proseclock
//!
//! Keeps a scheduler running in the background and answers IPC requests about it.

pub mod client;
pub mod ipc;
pub mod server;
pub mod service;

use anyhow::Result;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::Settings;

/// How long a background start waits for the socket to appear
const READY_TIMEOUT: Duration = Duration::from_secs(2);

/// PID recorded in `pid_file`, if that process is still alive
pub fn live_pid(pid_file: &Path) -> Option<u32> {
    let pid = std::fs::read_to_string(pid_file).ok()?.trim().parse::<u32>().ok()?;
    Path::new(&format!("/proc/{}", pid)).exists().then_some(pid)
}

/// Start the daemon as a background process and wait until it answers
pub fn start_daemon(settings: &Settings) -> Result<()> {
    let pid_path = settings.pid_path();
    let socket_path = settings.socket_path();

    if let Some(pid) = live_pid(&pid_path) {
        anyhow::bail!("Daemon is already running (PID: {})", pid);
    }
    for leftover in [&pid_path, &socket_path] {
        if leftover.exists() {
            debug!("Removing stale {}", leftover.display());
            std::fs::remove_file(leftover)?;
        }
    }

    let child = Command::new(std::env::current_exe()?)
        .args(["daemon", "start", "--foreground"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    wait_until_ready(child, &pid_path, &socket_path)
}

fn wait_until_ready(mut child: Child, pid_path: &Path, socket_path: &Path) -> Result<()> {
    let deadline = Instant::now() + READY_TIMEOUT;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait()? {
            anyhow::bail!(
                "Daemon failed to start (exit: {}). Run `proseclock daemon start --foreground` for details.",
                status
            );
        }

        if pid_path.exists() && socket_path.exists() {
            return Ok(());
        }

        std::thread::sleep(Duration::from_millis(50));
    }

    anyhow::bail!("Daemon start timed out. Run `proseclock daemon start --foreground` for details.")
}

/// Run the daemon in the foreground
pub async fn run_foreground(settings: &Settings) -> Result<()> {
    service::run(settings).await
}
