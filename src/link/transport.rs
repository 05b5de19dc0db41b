//! Transport abstraction — the write side of a GATT-style link.
//!
//! The core never talks to a BLE stack directly. It asks the port for the
//! current MTU and hands it frames; every frame carries a [`FrameTag`] that
//! the transport echoes back in its delivery confirmation
//! ([`TransportEvent::FrameAcked`](super::channels::TransportEvent)).
//!
//! Concrete implementations:
//! - [`GattLink`](crate::adapters::ble_transport::GattLink) over an external GATT client
//! - test doubles in `tests/integration`

use core::fmt;

use crate::error::LinkError;

/// Identifies one outbound transfer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(pub u32);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tag attached to a submitted frame and echoed in its confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameTag {
    pub transfer: TransferId,
    pub index: u16,
}

/// Frame-oriented write channel with asynchronous delivery confirmation.
pub trait LinkPort {
    /// Error type for synchronous submission failures.
    type Error: fmt::Debug;

    /// Maximum bytes accepted in one write right now.
    fn current_mtu(&self) -> usize;

    /// Queue one frame for transmission.
    ///
    /// `Ok` only means the frame was accepted; delivery is confirmed later
    /// by a `FrameAcked` event carrying the same `tag`.
    fn submit_frame(&mut self, tag: FrameTag, frame: &[u8]) -> Result<(), Self::Error>;

    /// Whether a peripheral is connected.
    fn is_connected(&self) -> bool;

    /// Whether a transfer can start right now.
    fn check_ready(&self) -> Result<(), LinkError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(LinkError::NotConnected)
        }
    }
}

/// A port with nothing attached. Never connected, rejects every write.
pub struct NullPort;

impl LinkPort for NullPort {
    type Error = ();

    fn current_mtu(&self) -> usize {
        0
    }

    fn submit_frame(&mut self, _tag: FrameTag, _frame: &[u8]) -> Result<(), ()> {
        Err(())
    }

    fn is_connected(&self) -> bool {
        false
    }
}
