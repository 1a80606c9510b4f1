// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message framing for the control-socket protocol (§6.4, [`crate::protocol`]).
//!
//! Wire format: a 4-byte big-endian length prefix followed by a JSON
//! payload. One call, one length-prefixed message; a `StreamJobOutput`
//! request gets several response messages in a row, terminated by
//! `Response::JobOutputDone`, all on the same framing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Messages above this size are refused rather than trusted to allocate.
const MAX_MESSAGE_BYTES: u32 = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u32, limit: u32 },
    #[error("connection closed before a full message was received")]
    Closed,
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error on control socket: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn write_message<W: AsyncWrite + Unpin, T: Serialize>(
    writer: &mut W,
    value: &T,
) -> Result<(), WireError> {
    let payload = serde_json::to_vec(value)?;
    let len = u32::try_from(payload.len()).map_err(|_| WireError::TooLarge {
        size: u32::MAX,
        limit: MAX_MESSAGE_BYTES,
    })?;
    if len > MAX_MESSAGE_BYTES {
        return Err(WireError::TooLarge { size: len, limit: MAX_MESSAGE_BYTES });
    }
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_message<R: AsyncRead + Unpin, T: DeserializeOwned>(
    reader: &mut R,
) -> Result<T, WireError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Err(WireError::Closed),
        Err(err) => return Err(WireError::Io(err)),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_BYTES {
        return Err(WireError::TooLarge { size: len, limit: MAX_MESSAGE_BYTES });
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(serde_json::from_slice(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Request, Response};

    #[tokio::test]
    async fn round_trips_a_request_through_an_in_memory_duplex() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let req = Request::Trigger {
            agent: "scout".into(),
            schedule: None,
            prompt: Some("hi".into()),
            bypass_concurrency_limit: false,
        };
        write_message(&mut a, &req).await.unwrap();
        let decoded: Request = read_message(&mut b).await.unwrap();
        assert_eq!(decoded, req);
    }

    #[tokio::test]
    async fn round_trips_a_response() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let resp = Response::Pong;
        write_message(&mut a, &resp).await.unwrap();
        let decoded: Response = read_message(&mut b).await.unwrap();
        assert_eq!(decoded, resp);
    }

    #[tokio::test]
    async fn closed_connection_before_length_prefix_is_reported() {
        let (a, mut b) = tokio::io::duplex(4096);
        drop(a);
        let err = read_message::<_, Request>(&mut b).await.unwrap_err();
        assert!(matches!(err, WireError::Closed));
    }
}
