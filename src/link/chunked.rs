//! Inbound reassembly of chunked messages.
//!
//! Each raw buffer handed to the reassembler is exactly what one
//! notification delivered. With no message in progress a buffer is read
//! as an initial frame, on any channel; while a message is in progress it
//! is read as a continuation frame of that message's channel, so a frame
//! on another channel fails with `ChannelMismatch`.
//!
//! ```text
//! Buffer 1: [chan | cmd | len=N]  chunk 1          → accumulator opened
//! Buffer 2: [chan | seq=0]        chunk 2
//! Buffer K: [chan | seq=K-2]      chunk K          → N bytes reached, emit
//! ```
//!
//! Any error discards the partial message; the caller re-issues the
//! request.

use crate::error::{LinkError, Result};

use super::codec::{self, ChannelId, LogicalMessage, MAX_SEQUENCE};

/// Partial message state.
#[derive(Debug)]
struct Accumulator {
    channel: ChannelId,
    command: u8,
    declared_len: usize,
    buffer: Vec<u8>,
    next_seq: u8,
    last_activity_us: u64,
}

impl Accumulator {
    fn incomplete(&self) -> LinkError {
        LinkError::IncompleteMessage {
            declared: self.declared_len,
            received: self.buffer.len(),
        }
    }
}

/// Reassembly state for one channel.
#[derive(Debug, Default)]
pub struct ChunkReassembler {
    active: Option<Accumulator>,
}

impl ChunkReassembler {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Feed one raw notification buffer.
    ///
    /// Returns `Ok(Some(message))` when a message completes and `Ok(None)`
    /// when more frames are expected. On error the accumulator is gone.
    pub fn feed(&mut self, raw: &[u8], now_us: u64) -> Result<Option<LogicalMessage>> {
        let Some(mut acc) = self.active.take() else {
            return self.open(raw, now_us);
        };

        let frame = codec::decode_continuation(raw)?;

        if frame.channel != acc.channel {
            return Err(LinkError::ChannelMismatch {
                expected: acc.channel,
                got: frame.channel,
            });
        }
        if acc.next_seq > MAX_SEQUENCE || frame.sequence != acc.next_seq {
            return Err(LinkError::OutOfOrderFrame {
                expected: acc.next_seq,
                got: frame.sequence,
            });
        }

        let received = acc.buffer.len() + frame.chunk.len();
        if received > acc.declared_len {
            return Err(LinkError::OverlongMessage {
                declared: acc.declared_len,
                received,
            });
        }

        acc.buffer.extend_from_slice(frame.chunk);

        if received == acc.declared_len {
            return Ok(Some(LogicalMessage {
                command: acc.command,
                payload: acc.buffer,
            }));
        }

        acc.next_seq += 1;
        acc.last_activity_us = now_us;
        self.active = Some(acc);
        Ok(None)
    }

    fn open(&mut self, raw: &[u8], now_us: u64) -> Result<Option<LogicalMessage>> {
        let frame = codec::decode_initial(raw)?;

        // Fixed-size reports pad past the declared length.
        if frame.declared_len <= frame.chunk.len() {
            return Ok(Some(LogicalMessage {
                command: frame.command,
                payload: frame.chunk[..frame.declared_len].to_vec(),
            }));
        }

        let mut buffer = Vec::with_capacity(frame.declared_len);
        buffer.extend_from_slice(frame.chunk);
        self.active = Some(Accumulator {
            channel: frame.channel,
            command: frame.command,
            declared_len: frame.declared_len,
            buffer,
            next_seq: 0,
            last_activity_us: now_us,
        });
        Ok(None)
    }

    /// Discard a partial message that has seen no frame for `timeout_us`.
    pub fn expire(&mut self, now_us: u64, timeout_us: u64) -> Result<()> {
        match &self.active {
            Some(acc) if now_us.saturating_sub(acc.last_activity_us) >= timeout_us => {
                let err = acc.incomplete();
                self.active = None;
                Err(err)
            }
            _ => Ok(()),
        }
    }

    /// Drop any partial message (e.g. on disconnect).
    ///
    /// Returns `IncompleteMessage` if one was in progress.
    pub fn discard(&mut self) -> Option<LinkError> {
        self.active.take().map(|acc| acc.incomplete())
    }

    /// Whether reassembly is in progress.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Channel of the message in progress.
    pub fn channel(&self) -> Option<ChannelId> {
        self.active.as_ref().map(|acc| acc.channel)
    }

    /// Bytes accumulated so far for the message in progress.
    pub fn received_len(&self) -> usize {
        self.active.as_ref().map_or(0, |acc| acc.buffer.len())
    }
}

/// Reassemble a complete frame sequence in one call.
///
/// Fails if the frames do not form exactly one message.
pub fn reassemble<F: AsRef<[u8]>>(frames: &[F]) -> Result<LogicalMessage> {
    let mut reassembler = ChunkReassembler::new();

    for (i, frame) in frames.iter().enumerate() {
        if let Some(msg) = reassembler.feed(frame.as_ref(), 0)? {
            if i + 1 != frames.len() {
                return Err(LinkError::OverlongMessage {
                    declared: msg.payload.len(),
                    received: msg.payload.len() + 1,
                });
            }
            return Ok(msg);
        }
    }

    Err(reassembler
        .discard()
        .unwrap_or(LinkError::IncompleteMessage {
            declared: 0,
            received: 0,
        }))
}

// ── Tests ────────────────────────────────────────────────────
