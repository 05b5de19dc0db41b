//! Transport-agnostic message link.
//!
//! Chunked framing over an MTU-bounded write channel.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Link Stack                            │
//! │                                                              │
//! │  LogicalMessage ──▶ ┌────────┐ ──▶ ┌─────────────┐ ──▶ Port  │
//! │                     │ Codec  │     │   Session   │  (submit) │
//! │                     │ (split)│     │ (ack track) │◀── acks   │
//! │                     └────────┘     └─────────────┘           │
//! │                                                              │
//! │  LogicalMessage ◀── ┌──────────────────┐ ◀── notifications   │
//! │                     │ ChunkReassembler │                     │
//! │                     └──────────────────┘                     │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod channels;
pub mod chunked;
pub mod codec;
pub mod session;
pub mod transport;
