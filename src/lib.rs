//! hwlink — MTU-bounded message framing for BLE hardware links.
//!
//! Splits logical command messages into GATT-sized frames, tracks their
//! delivery as a transfer session, and reassembles frames arriving from the
//! device back into messages.
//!
//! ```text
//!   app::commands ──▶ link::codec ──▶ link::session ──▶ LinkPort
//!                                                          │
//!   EventSink ◀── app::service ◀── link::chunked ◀── TransportEvent
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod link;

pub use app::events::LinkEvent;
pub use app::service::LinkService;
pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use link::codec::{ChannelId, FrameCodec, LogicalMessage};
