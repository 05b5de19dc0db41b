//! MTU-bounded frame codec.
//!
//! Wire format (all integers big-endian):
//! ```text
//! Initial frame:
//! ┌──────────────┬─────────┬──────────────┬──────────────────────┐
//! │ Channel (4B) │ Cmd (1B)│ Length (2B)  │ payload chunk        │
//! │              │         │ total, u16   │ (mtu - 7 bytes max)  │
//! └──────────────┴─────────┴──────────────┴──────────────────────┘
//!
//! Continuation frame:
//! ┌──────────────┬─────────┬─────────────────────────────────────┐
//! │ Channel (4B) │ Seq (1B)│ payload chunk (mtu - 5 bytes max)   │
//! │              │ 0..=127 │                                     │
//! └──────────────┴─────────┴─────────────────────────────────────┘
//! ```
//!
//! The length field carries the total logical payload length, not the
//! chunk length. Continuation sequence numbers start at 0 and never wrap:
//! a message that would need a 129th continuation frame is rejected.
//!
//! Everything here is pure: no I/O, no state beyond the channel id.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};

/// Initial frame header: channel(4) + command(1) + length(2).
pub const INITIAL_HEADER_LEN: usize = 7;

/// Continuation frame header: channel(4) + sequence(1).
pub const CONTINUATION_HEADER_LEN: usize = 5;

/// Smallest MTU that still leaves one payload byte in an initial frame.
pub const MIN_MTU: usize = INITIAL_HEADER_LEN + 1;

/// Largest logical payload (16-bit length field).
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Highest continuation sequence number (7-bit space).
pub const MAX_SEQUENCE: u8 = 127;

/// Upper bound on frames per logical message: one initial + 128 continuations.
pub const MAX_FRAMES_PER_MESSAGE: usize = MAX_SEQUENCE as usize + 2;

// ── Command byte flags ───────────────────────────────────────

/// Start-of-message flag.
pub const CMD_START: u8 = 0x80;
/// Secondary / report flag.
pub const CMD_REPORT: u8 = 0x40;
/// Info subcommand.
pub const CMD_SUB_INFO: u8 = 0x01;

// ── Types ────────────────────────────────────────────────────

/// 4-byte tag identifying a logical channel on the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub [u8; 4]);

impl ChannelId {
    /// Broadcast / default channel.
    pub const BROADCAST: Self = Self([0xEE; 4]);

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    fn from_frame(frame: &[u8]) -> Self {
        Self([frame[0], frame[1], frame[2], frame[3]])
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::BROADCAST
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// One encoded frame, at most `mtu` bytes.
pub type Frame = Vec<u8>;

/// Application-level unit before chunking / after reassembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalMessage {
    pub command: u8,
    pub payload: Vec<u8>,
}

impl LogicalMessage {
    pub fn new(command: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            command,
            payload: payload.into(),
        }
    }
}

/// Decoded view of an initial frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialFrame<'a> {
    pub channel: ChannelId,
    pub command: u8,
    pub declared_len: usize,
    pub chunk: &'a [u8],
}

/// Decoded view of a continuation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuationFrame<'a> {
    pub channel: ChannelId,
    pub sequence: u8,
    pub chunk: &'a [u8],
}

// ── Sizing ───────────────────────────────────────────────────

/// Payload bytes carried by an initial frame at `mtu`.
pub fn initial_capacity(mtu: usize) -> usize {
    mtu.saturating_sub(INITIAL_HEADER_LEN)
}

/// Payload bytes carried by a continuation frame at `mtu`.
pub fn continuation_capacity(mtu: usize) -> usize {
    mtu.saturating_sub(CONTINUATION_HEADER_LEN)
}

/// Number of frames needed to carry `payload_len` bytes at `mtu`.
pub fn frame_count(payload_len: usize, mtu: usize) -> Result<usize> {
    if mtu < MIN_MTU {
        return Err(LinkError::MtuTooSmall { mtu });
    }
    if payload_len > MAX_PAYLOAD_LEN {
        return Err(LinkError::PayloadTooLarge { len: payload_len });
    }

    let first = initial_capacity(mtu);
    if payload_len <= first {
        return Ok(1);
    }

    let continuations = (payload_len - first).div_ceil(continuation_capacity(mtu));
    if continuations > MAX_FRAMES_PER_MESSAGE - 1 {
        return Err(LinkError::PayloadTooLarge { len: payload_len });
    }
    Ok(1 + continuations)
}

// ── Codec ────────────────────────────────────────────────────

/// Encodes logical messages into frames for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    channel: ChannelId,
}

impl FrameCodec {
    pub const fn new(channel: ChannelId) -> Self {
        Self { channel }
    }

    pub const fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Split `command` + `payload` into frames no longer than `mtu`.
    pub fn encode(&self, command: u8, payload: &[u8], mtu: usize) -> Result<Vec<Frame>> {
        let count = frame_count(payload.len(), mtu)?;

        let mut frames = Vec::with_capacity(count);
        let (first, rest) = payload.split_at(payload.len().min(mtu - INITIAL_HEADER_LEN));

        let mut initial = Vec::with_capacity(INITIAL_HEADER_LEN + first.len());
        initial.extend_from_slice(self.channel.as_bytes());
        initial.push(command);
        initial.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        initial.extend_from_slice(first);
        frames.push(initial);

        for (seq, chunk) in rest.chunks(mtu - CONTINUATION_HEADER_LEN).enumerate() {
            let mut frame = Vec::with_capacity(CONTINUATION_HEADER_LEN + chunk.len());
            frame.extend_from_slice(self.channel.as_bytes());
            frame.push(seq as u8);
            frame.extend_from_slice(chunk);
            frames.push(frame);
        }

        debug_assert_eq!(frames.len(), count);
        Ok(frames)
    }

    /// Encode a [`LogicalMessage`].
    pub fn encode_message(&self, msg: &LogicalMessage, mtu: usize) -> Result<Vec<Frame>> {
        self.encode(msg.command, &msg.payload, mtu)
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(ChannelId::BROADCAST)
    }
}

/// Parse the header of an initial frame.
pub fn decode_initial(frame: &[u8]) -> Result<InitialFrame<'_>> {
    if frame.len() < INITIAL_HEADER_LEN {
        return Err(LinkError::FrameTooShort {
            len: frame.len(),
            min: INITIAL_HEADER_LEN,
        });
    }

    Ok(InitialFrame {
        channel: ChannelId::from_frame(frame),
        command: frame[4],
        declared_len: u16::from_be_bytes([frame[5], frame[6]]) as usize,
        chunk: &frame[INITIAL_HEADER_LEN..],
    })
}

/// Parse the header of a continuation frame.
pub fn decode_continuation(frame: &[u8]) -> Result<ContinuationFrame<'_>> {
    if frame.len() < CONTINUATION_HEADER_LEN {
        return Err(LinkError::FrameTooShort {
            len: frame.len(),
            min: CONTINUATION_HEADER_LEN,
        });
    }

    Ok(ContinuationFrame {
        channel: ChannelId::from_frame(frame),
        sequence: frame[4],
        chunk: &frame[CONTINUATION_HEADER_LEN..],
    })
}

// ── Tests ────────────────────────────────────────────────────
