//! IPC client for communicating with the daemon

use anyhow::{Context, Result};
use std::path::Path;
use tokio::net::UnixStream;

use crate::config::Settings;
use crate::daemon::ipc::{decode, read_frame, write_frame, DaemonRequest, DaemonResponse};

/// One connection to a running daemon
pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    /// Connect to the daemon configured in `settings`
    pub async fn connect(settings: &Settings) -> Result<Self> {
        Self::connect_to(&settings.socket_path()).await.with_context(|| {
            "Is the daemon running? Try: proseclock daemon start".to_string()
        })
    }

    pub async fn connect_to(socket_path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(socket_path)
            .await
            .with_context(|| format!("Failed to connect to daemon at {:?}", socket_path))?;

        Ok(Self { stream })
    }

    /// Send a request and wait for its response
    pub async fn send(&mut self, request: DaemonRequest) -> Result<DaemonResponse> {
        write_frame(&mut self.stream, &request).await?;

        let body = read_frame(&mut self.stream)
            .await?
            .context("Daemon closed the connection")?;

        decode(&body).context("Failed to parse response from daemon")
    }
}
