//! Unix socket listener for the daemon

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::daemon::ipc::{decode, read_frame, write_frame, DaemonRequest, DaemonResponse};

/// Answers requests arriving on any connection
pub trait RequestHandler: Send + Sync + 'static {
    fn handle(&self, request: DaemonRequest) -> DaemonResponse;
}

/// Bound socket; removed again when the server is dropped
pub struct IpcServer {
    socket_path: PathBuf,
    listener: UnixListener,
    stop: Arc<Notify>,
}

impl IpcServer {
    /// Bind the socket, replacing a leftover file no daemon answers on
    pub fn bind(socket_path: impl Into<PathBuf>) -> Result<Self> {
        let socket_path = socket_path.into();

        if socket_path.exists() {
            if std::os::unix::net::UnixStream::connect(&socket_path).is_ok() {
                anyhow::bail!("Another daemon is listening on {}", socket_path.display());
            }
            debug!("Removing stale socket {}", socket_path.display());
            std::fs::remove_file(&socket_path)?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind {}", socket_path.display()))?;
        info!("IPC server listening on {:?}", socket_path);

        Ok(Self {
            socket_path,
            listener,
            stop: Arc::new(Notify::new()),
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Accept connections until a client asks for shutdown
    pub async fn serve<H: RequestHandler>(self, handler: Arc<H>) {
        loop {
            tokio::select! {
                _ = self.stop.notified() => {
                    info!("Shutdown requested over IPC");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, _addr)) => {
                        let handler = Arc::clone(&handler);
                        let stop = Arc::clone(&self.stop);
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, handler, stop).await {
                                warn!("Connection error: {}", e);
                            }
                        });
                    }
                    Err(e) => error!("Accept error: {}", e),
                },
            }
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}

/// Answer frames on one connection until the client hangs up
async fn serve_connection<H: RequestHandler>(
    mut stream: UnixStream,
    handler: Arc<H>,
    stop: Arc<Notify>,
) -> crate::Result<()> {
    debug!("New client connection");

    while let Some(body) = read_frame(&mut stream).await? {
        let request = match decode::<DaemonRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                warn!("Bad request: {}", e);
                let response = DaemonResponse::Error {
                    message: format!("Invalid request: {}", e),
                };
                write_frame(&mut stream, &response).await?;
                continue;
            }
        };

        debug!("Received request: {:?}", request);
        let shutdown = request == DaemonRequest::Shutdown;
        let response = handler.handle(request);
        write_frame(&mut stream, &response).await?;

        // answer first, so the client sees the acknowledgment
        if shutdown {
            stop.notify_one();
            break;
        }
    }

    debug!("Client disconnected");
    Ok(())
}
