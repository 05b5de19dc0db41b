//! Outbound transfer session — submission and acknowledgment tracking.
//!
//! Flow: start → N × FrameAcked → Completed (or Failed)
//!
//! By default every frame is handed to the transport back-to-back and the
//! transport serializes or pipelines them. With an in-flight window the
//! remainder waits in a FIFO and one frame is released per successful
//! confirmation.
//!
//! Confirmations may arrive in any order. Completion depends only on the
//! set of acknowledged frame indices, so it fires exactly once.

use core::fmt;
use core::time::Duration;

use heapless::Deque;
use log::{debug, info, warn};

use crate::error::{LinkError, Result};

use super::channels::WriteStatus;
use super::codec::{Frame, MAX_FRAMES_PER_MESSAGE};
use super::transport::{FrameTag, LinkPort, TransferId};

// ── Throughput ────────────────────────────────────────────────

/// Achieved throughput of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Throughput {
    /// Kilobytes per second (bytes per millisecond).
    KbPerSec(f64),
    /// Elapsed time rounded to zero milliseconds.
    Indeterminate,
}

impl Throughput {
    pub fn measure(total_bytes: usize, elapsed: Duration) -> Self {
        let ms = elapsed.as_millis();
        if ms == 0 {
            return Self::Indeterminate;
        }
        Self::KbPerSec(total_bytes as f64 / ms as f64)
    }

    pub fn kb_per_sec(&self) -> Option<f64> {
        match self {
            Self::KbPerSec(v) => Some(*v),
            Self::Indeterminate => None,
        }
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KbPerSec(v) => write!(f, "{v:.3} kB/s"),
            Self::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// Summary of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferReport {
    pub id: TransferId,
    /// Logical payload bytes.
    pub total_bytes: usize,
    /// Bytes written including frame headers.
    pub wire_bytes: usize,
    pub frames: usize,
    pub elapsed: Duration,
    pub throughput: Throughput,
}

// ── State machine ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Completed,
    Failed(LinkError),
}

/// Terminal transition produced by a confirmation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionUpdate {
    Completed(TransferReport),
    Failed(LinkError),
}

/// Bookkeeping for one logical message's frames.
pub struct TransferSession {
    id: TransferId,
    frames: Vec<Frame>,
    /// Frame indices awaiting submission, in order.
    queue: Deque<u16, MAX_FRAMES_PER_MESSAGE>,
    sent: Vec<bool>,
    acked: Vec<bool>,
    submitted: usize,
    acked_count: usize,
    window: Option<usize>,
    total_bytes: usize,
    started_us: u64,
    state: SessionState,
}

impl TransferSession {
    /// Record the start time and submit frames to `port`.
    ///
    /// With `window = None` every frame is submitted before returning.
    /// A synchronous submission failure aborts the session and surfaces
    /// as `WriteFailed`.
    pub fn start<P: LinkPort>(
        id: TransferId,
        frames: Vec<Frame>,
        total_bytes: usize,
        window: Option<usize>,
        port: &mut P,
        now_us: u64,
    ) -> Result<Self> {
        if frames.is_empty() || frames.len() > MAX_FRAMES_PER_MESSAGE {
            return Err(LinkError::PayloadTooLarge { len: total_bytes });
        }

        let mut queue = Deque::new();
        for i in 0..frames.len() {
            // Bounded by the length check above.
            let _ = queue.push_back(i as u16);
        }

        let mut session = Self {
            id,
            sent: vec![false; frames.len()],
            acked: vec![false; frames.len()],
            frames,
            queue,
            submitted: 0,
            acked_count: 0,
            window: window.map(|w| w.max(1)),
            total_bytes,
            started_us: now_us,
            state: SessionState::Pending,
        };

        session.pump(port)?;
        debug!(
            "LINK: transfer {} started ({} frames, {} submitted)",
            id,
            session.frames.len(),
            session.submitted
        );
        Ok(session)
    }

    /// Submit queued frames until the window is full or the queue is empty.
    fn pump<P: LinkPort>(&mut self, port: &mut P) -> Result<()> {
        while self.window.is_none_or(|w| self.in_flight() < w) {
            let Some(index) = self.queue.pop_front() else {
                break;
            };
            let tag = FrameTag {
                transfer: self.id,
                index,
            };
            let frame_index = index as usize;
            if let Err(e) = port.submit_frame(tag, &self.frames[frame_index]) {
                warn!(
                    "LINK: transfer {} frame {} submit failed: {:?}",
                    self.id, index, e
                );
                let err = LinkError::WriteFailed { frame_index };
                self.state = SessionState::Failed(err);
                return Err(err);
            }
            self.sent[frame_index] = true;
            self.submitted += 1;
        }
        Ok(())
    }

    /// Apply one delivery confirmation.
    ///
    /// Returns `Some` on the transition to Completed or Failed. After a
    /// failure, remaining confirmations are still counted but never
    /// complete the session.
    pub fn on_ack<P: LinkPort>(
        &mut self,
        index: u16,
        status: WriteStatus,
        port: &mut P,
        now_us: u64,
    ) -> Option<SessionUpdate> {
        let i = index as usize;
        match self.acked.get(i) {
            None => {
                warn!("LINK: transfer {} ack for unknown frame {}", self.id, index);
                return None;
            }
            Some(_) if !self.sent[i] => {
                warn!("LINK: transfer {} ack for unsent frame {}", self.id, index);
                return None;
            }
            Some(true) => {
                debug!("LINK: transfer {} duplicate ack for frame {}", self.id, index);
                return None;
            }
            Some(false) => {}
        }

        self.acked[i] = true;
        self.acked_count += 1;

        if self.state != SessionState::Pending {
            return None;
        }

        if status == WriteStatus::Failed {
            let err = LinkError::WriteFailed { frame_index: i };
            self.state = SessionState::Failed(err);
            return Some(SessionUpdate::Failed(err));
        }

        if let Err(err) = self.pump(port) {
            return Some(SessionUpdate::Failed(err));
        }

        if self.acked_count == self.submitted && self.queue.is_empty() {
            self.state = SessionState::Completed;
            let report = self.report(now_us);
            info!(
                "LINK: transfer {} complete, {} bytes in {} ms ({})",
                self.id,
                report.total_bytes,
                report.elapsed.as_millis(),
                report.throughput
            );
            return Some(SessionUpdate::Completed(report));
        }

        None
    }

    /// Fail a pending session (e.g. on disconnect). Returns whether it was pending.
    pub fn abort(&mut self, reason: LinkError) -> bool {
        if self.state == SessionState::Pending {
            self.state = SessionState::Failed(reason);
            true
        } else {
            false
        }
    }

    fn report(&self, now_us: u64) -> TransferReport {
        let elapsed = Duration::from_micros(now_us.saturating_sub(self.started_us));
        TransferReport {
            id: self.id,
            total_bytes: self.total_bytes,
            wire_bytes: self.frames.iter().map(Vec::len).sum(),
            frames: self.frames.len(),
            elapsed,
            throughput: Throughput::measure(self.total_bytes, elapsed),
        }
    }

    fn in_flight(&self) -> usize {
        self.submitted - self.acked_count
    }

    pub fn id(&self) -> TransferId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == SessionState::Pending
    }

    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn acked(&self) -> usize {
        self.acked_count
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Every submitted frame has been confirmed.
    pub fn is_drained(&self) -> bool {
        self.acked_count == self.submitted
    }
}

// ── Tests ────────────────────────────────────────────────────
