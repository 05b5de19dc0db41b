//! Link service — the orchestrating core.
//!
//! [`LinkService`] owns the codec, the transfer session slot and the
//! reassembler. The transport's write side is injected at call sites as a
//! [`LinkPort`]; its callbacks arrive as [`TransportEvent`]s through the
//! [`LinkEvents`] channel; results leave through an [`EventSink`].
//!
//! ```text
//!  LinkEvents ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │       LinkService         │
//!    LinkPort ◀── │ Codec · Session · Reasm   │
//!                 └──────────────────────────┘
//! ```
//!
//! One transfer and one inbound message are in progress at a time.

use log::{debug, info, warn};

use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use crate::link::channels::{LinkEvents, TransportEvent, WriteStatus};
use crate::link::chunked::ChunkReassembler;
use crate::link::codec::{Frame, FrameCodec, LogicalMessage};
use crate::link::session::{SessionUpdate, TransferSession};
use crate::link::transport::{FrameTag, LinkPort, TransferId};

use super::commands::{self, INFO_REPORT_LEN};
use super::events::LinkEvent;
use super::ports::{EventSink, TimePort};

// ───────────────────────────────────────────────────────────────
// LinkService
// ───────────────────────────────────────────────────────────────

pub struct LinkService<C: TimePort> {
    config: LinkConfig,
    codec: FrameCodec,
    session: Option<TransferSession>,
    reassembler: ChunkReassembler,
    clock: C,
    next_id: u32,
}

impl<C: TimePort> LinkService<C> {
    pub fn new(config: LinkConfig, clock: C) -> Self {
        Self {
            codec: FrameCodec::new(config.channel_id),
            config,
            session: None,
            reassembler: ChunkReassembler::new(),
            clock,
            next_id: 1,
        }
    }

    // ── Outbound ──────────────────────────────────────────────

    /// Encode `msg` against the port's current MTU and start a transfer.
    pub fn send<P: LinkPort>(&mut self, msg: &LogicalMessage, port: &mut P) -> Result<TransferId> {
        self.ensure_ready(port)?;
        let frames = self.codec.encode_message(msg, port.current_mtu())?;
        self.start_transfer(frames, msg.payload.len(), port)
    }

    /// Send UTF-8 text with the plain send command.
    pub fn send_text<P: LinkPort>(&mut self, text: &str, port: &mut P) -> Result<TransferId> {
        self.send(&commands::build_send(text), port)
    }

    /// Write the fixed 64-byte info report as a single frame.
    pub fn send_info<P: LinkPort>(&mut self, port: &mut P) -> Result<TransferId> {
        self.ensure_ready(port)?;
        let mtu = port.current_mtu();
        if mtu < INFO_REPORT_LEN {
            return Err(LinkError::MtuTooSmall { mtu });
        }
        let report = commands::build_info(self.codec.channel());
        self.start_transfer(vec![report.to_vec()], 1, port)
    }

    /// Send the synthetic speed-test payload; throughput arrives with
    /// [`LinkEvent::TransferCompleted`].
    pub fn start_speed_test<P: LinkPort>(&mut self, port: &mut P) -> Result<TransferId> {
        let msg = commands::build_speed_test(self.config.speed_test_size);
        self.send(&msg, port)
    }

    /// Write one raw, unframed buffer filling the current MTU. Completion
    /// confirms the peripheral accepts writes of that length.
    pub fn send_probe<P: LinkPort>(&mut self, port: &mut P) -> Result<TransferId> {
        self.ensure_ready(port)?;
        let mtu = port.current_mtu();
        if mtu == 0 {
            return Err(LinkError::MtuTooSmall { mtu });
        }
        let probe = commands::build_probe(mtu);
        self.start_transfer(vec![probe], mtu, port)
    }

    fn ensure_ready<P: LinkPort>(&self, port: &P) -> Result<()> {
        port.check_ready()?;
        if self.transfer_pending() {
            return Err(LinkError::SessionBusy);
        }
        Ok(())
    }

    fn start_transfer<P: LinkPort>(
        &mut self,
        frames: Vec<Frame>,
        total_bytes: usize,
        port: &mut P,
    ) -> Result<TransferId> {
        let id = TransferId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let window = self.config.max_in_flight.map(usize::from);
        let now = self.clock.now_us();
        self.session = None;
        let session = TransferSession::start(id, frames, total_bytes, window, port, now)?;
        self.session = Some(session);
        Ok(id)
    }

    // ── Inbound events ────────────────────────────────────────

    /// Apply one transport event.
    pub fn handle_event<P: LinkPort>(
        &mut self,
        event: TransportEvent,
        port: &mut P,
        sink: &mut impl EventSink,
    ) {
        match event {
            TransportEvent::FrameAcked { tag, status } => self.on_frame_acked(tag, status, port, sink),
            TransportEvent::NotificationReceived(buf) => self.on_notification(&buf, sink),
            TransportEvent::Disconnected => self.on_disconnected(sink),
        }
    }

    /// Drain every queued event without waiting. Returns how many were handled.
    pub fn poll<P: LinkPort>(
        &mut self,
        events: &LinkEvents,
        port: &mut P,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut handled = 0;
        while let Ok(event) = events.try_receive() {
            self.handle_event(event, port, sink);
            handled += 1;
        }
        handled
    }

    /// Wait for the next transport event and apply it.
    pub async fn process_next<P: LinkPort>(
        &mut self,
        events: &LinkEvents,
        port: &mut P,
        sink: &mut impl EventSink,
    ) {
        let event = events.receive().await;
        self.handle_event(event, port, sink);
    }

    /// Drop a partial inbound message that has gone quiet for longer than
    /// the configured reassembly timeout.
    pub fn poll_timeouts(&mut self, sink: &mut impl EventSink) {
        let now = self.clock.now_us();
        if let Err(e) = self
            .reassembler
            .expire(now, self.config.reassembly_timeout_us())
        {
            warn!("LINK: reassembly timed out: {}", e);
            sink.emit(&LinkEvent::ReassemblyFailed(e));
        }
    }

    fn on_frame_acked<P: LinkPort>(
        &mut self,
        tag: FrameTag,
        status: WriteStatus,
        port: &mut P,
        sink: &mut impl EventSink,
    ) {
        let Some(session) = self.session.as_mut().filter(|s| s.id() == tag.transfer) else {
            debug!("LINK: stale ack for transfer {} frame {}", tag.transfer, tag.index);
            return;
        };

        match session.on_ack(tag.index, status, port, self.clock.now_us()) {
            Some(SessionUpdate::Completed(report)) => {
                sink.emit(&LinkEvent::TransferCompleted(report));
            }
            Some(SessionUpdate::Failed(error)) => {
                warn!("LINK: transfer {} failed: {}", session.id(), error);
                sink.emit(&LinkEvent::TransferFailed {
                    id: session.id(),
                    error,
                });
            }
            None => {}
        }

        if !session.is_pending() && session.is_drained() {
            self.session = None;
        }
    }

    fn on_notification(&mut self, buf: &[u8], sink: &mut impl EventSink) {
        // A stale partial must not swallow the start of a new message.
        self.poll_timeouts(sink);

        match self.reassembler.feed(buf, self.clock.now_us()) {
            Ok(Some(msg)) => {
                debug!(
                    "LINK: received cmd=0x{:02x} ({} bytes)",
                    msg.command,
                    msg.payload.len()
                );
                sink.emit(&LinkEvent::MessageReceived(msg));
            }
            Ok(None) => {}
            Err(e) => {
                warn!("LINK: inbound frame rejected: {}", e);
                sink.emit(&LinkEvent::ReassemblyFailed(e));
            }
        }
    }

    fn on_disconnected(&mut self, sink: &mut impl EventSink) {
        info!("LINK: transport disconnected");

        if let Some(mut session) = self.session.take() {
            if session.abort(LinkError::Disconnected) {
                sink.emit(&LinkEvent::TransferFailed {
                    id: session.id(),
                    error: LinkError::Disconnected,
                });
            }
        }
        if let Some(e) = self.reassembler.discard() {
            sink.emit(&LinkEvent::ReassemblyFailed(e));
        }
        sink.emit(&LinkEvent::LinkDown);
    }

    // ── Introspection ─────────────────────────────────────────

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn transfer_pending(&self) -> bool {
        self.session.as_ref().is_some_and(TransferSession::is_pending)
    }

    pub fn session(&self) -> Option<&TransferSession> {
        self.session.as_ref()
    }

    pub fn reassembly_active(&self) -> bool {
        self.reassembler.is_active()
    }
}

// ── Tests ────────────────────────────────────────────────────
