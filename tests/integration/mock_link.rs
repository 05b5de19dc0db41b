//! Mock GATT client and clock for integration tests.
//!
//! Records every write so tests can assert on the exact frames that went
//! out, and lets tests decide when (and whether) each write completes.

use core::cell::Cell;
use std::rc::Rc;

use hwlink::adapters::ble_transport::{GattClient, GattError};
use hwlink::app::ports::TimePort;
use hwlink::link::transport::FrameTag;

pub const WRITER: u16 = 0x21;
pub const READER: u16 = 0x22;

// ── Write record ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct WriteCall {
    pub handle: u16,
    pub tag: FrameTag,
    pub data: Vec<u8>,
}

// ── MockGatt ──────────────────────────────────────────────────

pub struct MockGatt {
    pub connected: bool,
    pub mtu: usize,
    pub writes: Vec<WriteCall>,
    /// Fail the write at this position (0-based, counted over all writes).
    pub fail_at: Option<usize>,
}

#[allow(dead_code)]
impl MockGatt {
    pub fn new(mtu: usize) -> Self {
        Self {
            connected: true,
            mtu,
            writes: Vec::new(),
            fail_at: None,
        }
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.writes.iter().map(|w| w.data.clone()).collect()
    }

    pub fn tags(&self) -> Vec<FrameTag> {
        self.writes.iter().map(|w| w.tag).collect()
    }
}

impl GattClient for MockGatt {
    type Handle = u16;

    fn max_write_len(&self) -> usize {
        self.mtu
    }

    fn write(&mut self, handle: u16, tag: FrameTag, data: &[u8]) -> Result<(), GattError> {
        if self.fail_at == Some(self.writes.len()) {
            return Err(GattError::Io);
        }
        self.writes.push(WriteCall {
            handle,
            tag,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

#[allow(dead_code)]
impl ManualClock {
    pub fn advance_ms(&self, ms: u64) {
        self.0.set(self.0.get() + ms * 1_000);
    }

    pub fn set_us(&self, us: u64) {
        self.0.set(us);
    }
}

impl TimePort for ManualClock {
    fn now_us(&self) -> u64 {
        self.0.get()
    }
}
