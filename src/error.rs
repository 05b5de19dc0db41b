//! Unified error type for the link core.
//!
//! Every framing, transfer and reassembly failure funnels into
//! [`LinkError`]. All variants are `Copy` and scoped to a single message or
//! transfer session; none of them is fatal to the process.

use core::fmt;

use crate::link::codec::ChannelId;

// ---------------------------------------------------------------------------
// Link error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The MTU leaves no room for payload after the frame header.
    MtuTooSmall { mtu: usize },
    /// Payload exceeds the 16-bit length field or the 128-frame sequence space.
    PayloadTooLarge { len: usize },
    /// A frame is shorter than its header.
    FrameTooShort { len: usize, min: usize },
    /// A continuation frame arrived on a different channel than the message in progress.
    ChannelMismatch { expected: ChannelId, got: ChannelId },
    /// A continuation frame carried an unexpected sequence number.
    OutOfOrderFrame { expected: u8, got: u8 },
    /// Accumulated payload would exceed the declared length.
    OverlongMessage { declared: usize, received: usize },
    /// A partial message was abandoned (disconnect or timeout).
    IncompleteMessage { declared: usize, received: usize },
    /// The transport reported a failed write for a frame.
    WriteFailed { frame_index: usize },
    /// A transfer is still pending.
    SessionBusy,
    /// The writer or reader characteristic is not bound.
    NotBound,
    /// The transport reports no connection.
    NotConnected,
    /// The link went down while a transfer was pending.
    Disconnected,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MtuTooSmall { mtu } => write!(f, "MTU {mtu} too small (minimum 8)"),
            Self::PayloadTooLarge { len } => write!(f, "payload of {len} bytes too large"),
            Self::FrameTooShort { len, min } => {
                write!(f, "frame too short: {len} bytes, need {min}")
            }
            Self::ChannelMismatch { expected, got } => {
                write!(f, "channel mismatch: expected {expected}, got {got}")
            }
            Self::OutOfOrderFrame { expected, got } => {
                write!(f, "out-of-order frame: expected seq {expected}, got {got}")
            }
            Self::OverlongMessage { declared, received } => {
                write!(f, "overlong message: declared {declared}, received {received}")
            }
            Self::IncompleteMessage { declared, received } => write!(
                f,
                "incomplete message: declared {declared}, received {received}"
            ),
            Self::WriteFailed { frame_index } => write!(f, "write failed for frame {frame_index}"),
            Self::SessionBusy => write!(f, "transfer session busy"),
            Self::NotBound => write!(f, "characteristic not bound"),
            Self::NotConnected => write!(f, "link not connected"),
            Self::Disconnected => write!(f, "link disconnected"),
        }
    }
}

impl std::error::Error for LinkError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, LinkError>;
