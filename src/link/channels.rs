//! Transport → core event channel.
//!
//! Uses an `embassy-sync` bounded MPMC channel so transport callbacks,
//! which run on the BLE stack's own dispatch context, never touch the
//! transfer or reassembly state directly. They push typed events; the task
//! owning [`LinkService`](crate::app::service::LinkService) drains them.
//!
//! ```text
//! ┌──────────────┐  TransportEvent  ┌──────────────┐
//! │ BLE callback │─────────────────▶│ LinkService  │
//! │ (any thread) │                  │ (owner task) │
//! └──────────────┘                  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use super::transport::FrameTag;

/// One notification payload, copied out of the transport's buffer. Sized by
/// the sender's MTU, so it lives on the heap.
pub type Notification = Vec<u8>;

/// Outcome of one frame write as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Delivered,
    Failed,
}

/// Everything the transport can tell the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Delivery confirmation for a submitted frame.
    FrameAcked { tag: FrameTag, status: WriteStatus },
    /// The peripheral notified a value change on the reader characteristic.
    NotificationReceived(Notification),
    /// The link went down.
    Disconnected,
}

/// Channel depth. Sized for a full 129-frame burst of confirmations
/// plus a few notifications without the consumer running.
pub const EVENT_DEPTH: usize = 160;

/// Transport event channel. Large; keep it in a `static` or behind an `Arc`.
pub type LinkEvents = Channel<CriticalSectionRawMutex, TransportEvent, EVENT_DEPTH>;

/// Create an empty event channel.
pub const fn new_link_events() -> LinkEvents {
    Channel::new()
}

/// Push an event from transport context. Drops it (and warns) if full.
pub fn push_event(events: &LinkEvents, event: TransportEvent) -> bool {
    match events.try_send(event) {
        Ok(()) => true,
        Err(_) => {
            warn!("LINK: event channel full, dropping transport event");
            false
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
