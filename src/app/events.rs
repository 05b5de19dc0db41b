//! Outbound link events.
//!
//! The [`LinkService`](super::service::LinkService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them: log to console, update a UI, feed a
//! request/response matcher.

use crate::error::LinkError;
use crate::link::codec::LogicalMessage;
use crate::link::session::TransferReport;
use crate::link::transport::TransferId;

/// Structured events emitted by the link core.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// A complete inbound message was reassembled.
    MessageReceived(LogicalMessage),

    /// Every frame of a transfer was acknowledged.
    TransferCompleted(TransferReport),

    /// A transfer was aborted by a write failure or disconnect.
    TransferFailed { id: TransferId, error: LinkError },

    /// An inbound message was discarded.
    ReassemblyFailed(LinkError),

    /// The transport reported a disconnect.
    LinkDown,
}
