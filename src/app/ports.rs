//! Port traits — the boundary between link logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LinkService
//! ```
//!
//! The transport itself is [`LinkPort`](crate::link::transport::LinkPort);
//! the ports here cover where events go and where time comes from.

use super::events::LinkEvent;

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: link → application / logging)
// ───────────────────────────────────────────────────────────────

/// The link emits structured [`LinkEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &LinkEvent);
}

/// Collects events in memory. Handy for callers that poll.
impl EventSink for Vec<LinkEvent> {
    fn emit(&mut self, event: &LinkEvent) {
        self.push(event.clone());
    }
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: monotonic clock)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source for transfer timing and reassembly timeouts.
pub trait TimePort {
    /// Microseconds since an arbitrary fixed origin.
    fn now_us(&self) -> u64;
}
