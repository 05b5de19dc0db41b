//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one line per [`LinkEvent`] through
//! the `log` facade. Whatever logger the host installs decides where the
//! lines end up.

use log::{info, warn};

use crate::app::events::LinkEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`LinkEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LinkEvent) {
        match event {
            LinkEvent::MessageReceived(msg) => {
                info!(
                    "RECV  | cmd=0x{:02X} | len={}",
                    msg.command,
                    msg.payload.len()
                );
            }
            LinkEvent::TransferCompleted(r) => {
                info!(
                    "SENT  | transfer={} | bytes={} wire={} | frames={} | {} ms | {}",
                    r.id,
                    r.total_bytes,
                    r.wire_bytes,
                    r.frames,
                    r.elapsed.as_millis(),
                    r.throughput,
                );
            }
            LinkEvent::TransferFailed { id, error } => {
                warn!("SENT  | transfer={} failed: {}", id, error);
            }
            LinkEvent::ReassemblyFailed(err) => {
                warn!("RECV  | message discarded: {}", err);
            }
            LinkEvent::LinkDown => {
                info!("LINK  | down");
            }
        }
    }
}
