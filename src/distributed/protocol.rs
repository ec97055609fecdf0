//! Wire protocol between coordinator and workers
//!
//! Messages are MessagePack-encoded (rmp-serde) and framed with a 4-byte
//! little-endian length prefix:
//!
//! ```text
//! [4 bytes: message length (little-endian u32)][N bytes: MessagePack message]
//! ```
//!
//! # Message Flow
//!
//! ```text
//! Coordinator                     Worker
//!     |                              |
//!     |-------- ASSIGN ------------->|
//!     |                              |  (scan runs)
//!     |<------- RESULT --------------|
//! ```
//!
//! A worker that cannot complete its scan sends ERROR instead of RESULT.
//! Every worker transmits exactly one reply per assignment.

use crate::scanner::SubrangeResult;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Protocol version
///
/// Increment on breaking changes; coordinator and workers must match.
pub const PROTOCOL_VERSION: u32 = 1;

/// Upper bound on a framed message body; anything larger is a corrupt frame.
const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Protocol message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    /// Subrange assignment (Coordinator -> Worker)
    Assign(AssignMessage),

    /// Scan result (Worker -> Coordinator)
    ///
    /// Tagged with the sending rank so arrival order never matters.
    Result(ResultMessage),

    /// Error report (Worker -> Coordinator)
    ///
    /// The coordinator aborts the whole run on receipt.
    Error(ErrorMessage),
}

/// Subrange assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignMessage {
    /// Protocol version (must match)
    pub protocol_version: u32,

    /// 1-based rank of the receiving worker
    pub rank: usize,

    /// Total number of scanning workers (excludes the coordinator)
    pub num_workers: usize,

    /// Exclusive upper bound of the whole search range
    pub ceiling: u64,

    /// Integers between progress status lines
    pub report_interval: u64,
}

/// Scan result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMessage {
    /// Node identifier (hostname)
    pub node_id: String,

    /// Rank the result belongs to
    pub rank: usize,

    /// The completed subrange scan
    pub result: SubrangeResult,

    /// Scan duration (nanoseconds)
    pub duration_ns: u64,
}

/// Error report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Node identifier (hostname)
    pub node_id: String,

    /// Rank the worker was assigned, if any
    pub rank: Option<usize>,

    /// Error description
    pub error: String,
}

/// Serialize a message with its length-prefix framing.
pub fn serialize_message(msg: &Message) -> Result<Vec<u8>> {
    let msg_bytes = rmp_serde::to_vec(msg).context("Failed to serialize message")?;

    let msg_len = msg_bytes.len() as u32;
    let mut framed = Vec::with_capacity(4 + msg_bytes.len());
    framed.extend_from_slice(&msg_len.to_le_bytes());
    framed.extend_from_slice(&msg_bytes);

    Ok(framed)
}

/// Deserialize a framed message.
///
/// Returns (message, bytes consumed) where bytes consumed includes the
/// length prefix.
pub fn deserialize_message(buf: &[u8]) -> Result<(Message, usize)> {
    if buf.len() < 4 {
        anyhow::bail!(
            "Buffer too small for message length (need 4 bytes, got {})",
            buf.len()
        );
    }

    let msg_len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    if msg_len > MAX_MESSAGE_SIZE {
        anyhow::bail!("Message too large: {} bytes (max {})", msg_len, MAX_MESSAGE_SIZE);
    }
    if buf.len() < 4 + msg_len {
        anyhow::bail!(
            "Incomplete message (need {} bytes, got {})",
            4 + msg_len,
            buf.len()
        );
    }

    let msg = rmp_serde::from_slice(&buf[4..4 + msg_len])
        .context("Failed to deserialize message")?;

    Ok((msg, 4 + msg_len))
}

/// Read one complete message from a TCP stream.
pub async fn read_message(stream: &mut tokio::net::TcpStream) -> Result<Message> {
    use tokio::io::AsyncReadExt;

    let mut len_buf = [0u8; 4];
    stream
        .read_exact(&mut len_buf)
        .await
        .context("Failed to read message length")?;

    let msg_len = u32::from_le_bytes(len_buf) as usize;
    if msg_len > MAX_MESSAGE_SIZE {
        anyhow::bail!("Message too large: {} bytes (max {})", msg_len, MAX_MESSAGE_SIZE);
    }

    let mut msg_buf = vec![0u8; msg_len];
    stream
        .read_exact(&mut msg_buf)
        .await
        .context("Failed to read message body")?;

    let msg = rmp_serde::from_slice(&msg_buf).context("Failed to deserialize message")?;

    Ok(msg)
}

/// Write one message to a TCP stream and flush it.
pub async fn write_message(stream: &mut tokio::net::TcpStream, msg: &Message) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    let framed = serialize_message(msg)?;

    stream
        .write_all(&framed)
        .await
        .context("Failed to write message")?;
    stream.flush().await.context("Failed to flush stream")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::PrimeGap;

    #[test]
    fn test_serialize_deserialize_assign() {
        let msg = Message::Assign(AssignMessage {
            protocol_version: PROTOCOL_VERSION,
            rank: 3,
            num_workers: 8,
            ceiling: 1_000_000_000_000,
            report_interval: 10_000_000,
        });

        let bytes = serialize_message(&msg).unwrap();
        let (deserialized, consumed) = deserialize_message(&bytes).unwrap();

        assert_eq!(consumed, bytes.len());
        match deserialized {
            Message::Assign(assign) => {
                assert_eq!(assign.protocol_version, PROTOCOL_VERSION);
                assert_eq!(assign.rank, 3);
                assert_eq!(assign.num_workers, 8);
                assert_eq!(assign.ceiling, 1_000_000_000_000);
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_serialize_deserialize_result() {
        let msg = Message::Result(ResultMessage {
            node_id: "node-a".to_string(),
            rank: 1,
            result: SubrangeResult {
                rank: 1,
                range_start: 0,
                range_end: 30,
                first_prime: Some(2),
                last_prime: Some(29),
                largest_gap: Some(PrimeGap::new(23, 29)),
            },
            duration_ns: 12_345,
        });

        let bytes = serialize_message(&msg).unwrap();
        let (deserialized, consumed) = deserialize_message(&bytes).unwrap();

        assert_eq!(consumed, bytes.len());
        match deserialized {
            Message::Result(res) => {
                assert_eq!(res.rank, 1);
                assert_eq!(res.result.largest_gap, Some(PrimeGap::new(23, 29)));
                assert_eq!(res.result.last_prime, Some(29));
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_serialize_deserialize_error() {
        let msg = Message::Error(ErrorMessage {
            node_id: "node-b".to_string(),
            rank: Some(2),
            error: "scan failed".to_string(),
        });

        let bytes = serialize_message(&msg).unwrap();
        let (deserialized, _) = deserialize_message(&bytes).unwrap();

        match deserialized {
            Message::Error(err) => {
                assert_eq!(err.rank, Some(2));
                assert_eq!(err.error, "scan failed");
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_message_framing() {
        let msg = Message::Error(ErrorMessage {
            node_id: String::new(),
            rank: None,
            error: String::new(),
        });
        let bytes = serialize_message(&msg).unwrap();

        assert!(bytes.len() >= 4);
        let msg_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        assert_eq!(bytes.len(), 4 + msg_len);
    }

    #[test]
    fn test_oversized_length_prefix_is_rejected() {
        // A corrupt prefix must fail the cap check, not drive an allocation
        let mut buf = Vec::new();
        buf.extend_from_slice(&u32::MAX.to_le_bytes());
        buf.extend_from_slice(&[0u8; 16]);

        let err = deserialize_message(&buf).unwrap_err();
        assert!(err.to_string().contains("too large"), "{:#}", err);
    }

    #[test]
    fn test_truncated_buffer_is_rejected() {
        let msg = Message::Assign(AssignMessage {
            protocol_version: PROTOCOL_VERSION,
            rank: 1,
            num_workers: 1,
            ceiling: 100,
            report_interval: 10,
        });
        let bytes = serialize_message(&msg).unwrap();

        assert!(deserialize_message(&bytes[..2]).is_err());
        assert!(deserialize_message(&bytes[..bytes.len() - 1]).is_err());
    }
}
