//! BLE GATT link — frames over a write/notify characteristic pair.
//!
//! Wraps an external GATT client (the platform BLE stack) and exposes it as
//! a [`LinkPort`]. Discovery and connection stay with the platform; this
//! adapter only holds the resolved characteristic handles and turns
//! platform callbacks into [`TransportEvent`]s.
//!
//! ## Characteristic bindings
//!
//! Both bindings start unbound and are cleared on disconnect. Writing with
//! no writer bound, or receiving a value change on anything other than the
//! bound reader, is reported as `NotBound` instead of being assumed.
//!
//! | Characteristic | UUID     | Use                      |
//! |----------------|----------|--------------------------|
//! | Writer         | `0x0001` | Write with response      |
//! | Reader         | `0x0002` | Notify (device replies)  |

use core::fmt;

use log::{info, warn};

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::link::channels::{LinkEvents, TransportEvent, WriteStatus, push_event};
use crate::link::transport::{FrameTag, LinkPort};

// ── Error type ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GattError {
    NotConnected,
    NotBound,
    MtuExceeded,
    QueueFull,
    Io,
}

impl fmt::Display for GattError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "GATT: no peripheral connected"),
            Self::NotBound => write!(f, "GATT: characteristic not bound"),
            Self::MtuExceeded => write!(f, "GATT: value exceeds MTU"),
            Self::QueueFull => write!(f, "GATT: event queue full"),
            Self::Io => write!(f, "GATT: I/O error"),
        }
    }
}

// ── Platform client ──────────────────────────────────────────

/// The platform BLE stack, as seen by this adapter.
pub trait GattClient {
    /// Opaque characteristic handle.
    type Handle: Copy + PartialEq + fmt::Debug;

    /// Current maximum write length for the connected peripheral.
    fn max_write_len(&self) -> usize;

    /// Start a write-with-response. The platform later reports completion
    /// through [`GattLink::on_write_complete`] with the same `tag`.
    fn write(&mut self, characteristic: Self::Handle, tag: FrameTag, data: &[u8])
    -> Result<(), GattError>;

    fn is_connected(&self) -> bool;
}

// ── GATT link ────────────────────────────────────────────────

/// GATT transport with explicit characteristic bindings.
pub struct GattLink<G: GattClient> {
    client: G,
    writer_uuid: u16,
    reader_uuid: u16,
    writer: Option<G::Handle>,
    reader: Option<G::Handle>,
}

impl<G: GattClient> GattLink<G> {
    pub fn new(client: G, config: &LinkConfig) -> Self {
        Self {
            client,
            writer_uuid: config.writer_uuid,
            reader_uuid: config.reader_uuid,
            writer: None,
            reader: None,
        }
    }

    /// Record a characteristic found during discovery. Unknown UUIDs are ignored.
    pub fn on_characteristic_discovered(&mut self, uuid: u16, handle: G::Handle) {
        if uuid == self.writer_uuid {
            info!("GATT: writer bound ({:?})", handle);
            self.writer = Some(handle);
        } else if uuid == self.reader_uuid {
            info!("GATT: reader bound ({:?})", handle);
            self.reader = Some(handle);
        }
    }

    /// Platform callback: a characteristic value changed.
    pub fn on_value_changed(
        &self,
        handle: G::Handle,
        data: &[u8],
        events: &LinkEvents,
    ) -> Result<(), GattError> {
        if self.reader != Some(handle) {
            warn!("GATT: value change on unbound characteristic {:?}", handle);
            return Err(GattError::NotBound);
        }
        if push_event(events, TransportEvent::NotificationReceived(data.to_vec())) {
            Ok(())
        } else {
            Err(GattError::QueueFull)
        }
    }

    /// Platform callback: a write-with-response finished.
    pub fn on_write_complete(&self, tag: FrameTag, ok: bool, events: &LinkEvents) {
        let status = if ok {
            WriteStatus::Delivered
        } else {
            warn!("GATT: write failed for {} frame {}", tag.transfer, tag.index);
            WriteStatus::Failed
        };
        push_event(events, TransportEvent::FrameAcked { tag, status });
    }

    /// Platform callback: the peripheral disconnected.
    pub fn on_disconnected(&mut self, events: &LinkEvents) {
        info!("GATT: peripheral disconnected, bindings cleared");
        self.writer = None;
        self.reader = None;
        push_event(events, TransportEvent::Disconnected);
    }

    pub fn is_bound(&self) -> bool {
        self.writer.is_some() && self.reader.is_some()
    }

    pub fn client(&self) -> &G {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut G {
        &mut self.client
    }
}

impl<G: GattClient> LinkPort for GattLink<G> {
    type Error = GattError;

    fn current_mtu(&self) -> usize {
        self.client.max_write_len()
    }

    fn submit_frame(&mut self, tag: FrameTag, frame: &[u8]) -> Result<(), GattError> {
        if !self.client.is_connected() {
            return Err(GattError::NotConnected);
        }
        let writer = self.writer.ok_or(GattError::NotBound)?;
        if frame.len() > self.client.max_write_len() {
            return Err(GattError::MtuExceeded);
        }
        self.client.write(writer, tag, frame)
    }

    fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    fn check_ready(&self) -> Result<(), LinkError> {
        if !self.client.is_connected() {
            return Err(LinkError::NotConnected);
        }
        if self.writer.is_none() || self.reader.is_none() {
            return Err(LinkError::NotBound);
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────
