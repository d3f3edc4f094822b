//! Wire format between the CLI and the daemon
//!
//! Every message is one frame: a little-endian u32 byte count followed by
//! that many bytes of JSON. A connection carries any number of frames.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::scheduler::RenderRequest;
use crate::{ProseClockError, Result};

/// Largest frame body either side will accept
pub const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// Request sent from the CLI to the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaemonRequest {
    /// Ping to check if daemon is alive
    Ping,

    /// What is currently on display
    GetDisplay,

    /// Show the origin of the quote on display
    Reveal,

    /// Shutdown the daemon
    Shutdown,
}

/// Response sent from the daemon to the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaemonResponse {
    Pong,

    /// Current display, `None` until the first quote was found
    Display(Option<RenderRequest>),

    /// Acknowledgment (for shutdown, etc.)
    Ok,

    Error { message: String },
}

/// Encode one message as a complete frame
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(message).map_err(|e| ProseClockError::Ipc(e.to_string()))?;
    if json.len() > MAX_MESSAGE_LEN {
        return Err(ProseClockError::Ipc(format!(
            "message of {} bytes exceeds the {} byte limit",
            json.len(),
            MAX_MESSAGE_LEN
        )));
    }

    let mut frame = Vec::with_capacity(4 + json.len());
    frame.extend_from_slice(&(json.len() as u32).to_le_bytes());
    frame.extend(json);
    Ok(frame)
}

/// Decode a frame body
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ProseClockError::Ipc(e.to_string()))
}

pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    writer.write_all(&encode(message)?).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame body.
///
/// Returns `None` when the peer closed the connection between frames. A
/// connection that ends inside a frame is an error.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_LEN {
        return Err(ProseClockError::Ipc(format!(
            "frame of {} bytes exceeds the {} byte limit",
            len, MAX_MESSAGE_LEN
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}
