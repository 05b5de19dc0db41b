//! End-to-end flows through `LinkService` and `GattLink` over the mock
//! GATT client: discovery, windowed writes, device replies, disconnects.

use hwlink::adapters::ble_transport::GattLink;
use hwlink::app::events::LinkEvent;
use hwlink::app::service::LinkService;
use hwlink::config::LinkConfig;
use hwlink::error::LinkError;
use hwlink::link::channels::{LinkEvents, new_link_events};
use hwlink::link::chunked::reassemble;
use hwlink::link::codec::{ChannelId, FrameCodec, LogicalMessage};

use crate::mock_link::{MockGatt, ManualClock, READER, WRITER};

struct Rig {
    svc: LinkService<ManualClock>,
    link: GattLink<MockGatt>,
    events: Box<LinkEvents>,
    sink: Vec<LinkEvent>,
    clock: ManualClock,
}

impl Rig {
    fn new(config: LinkConfig, mtu: usize) -> Self {
        let clock = ManualClock::default();
        let mut link = GattLink::new(MockGatt::new(mtu), &config);
        link.on_characteristic_discovered(config.writer_uuid, WRITER);
        link.on_characteristic_discovered(config.reader_uuid, READER);
        Self {
            svc: LinkService::new(config, clock.clone()),
            link,
            events: Box::new(new_link_events()),
            sink: Vec::new(),
            clock,
        }
    }

    /// Complete every write issued so far that has not been completed yet.
    fn complete_writes(&mut self, from: usize) -> usize {
        let tags = self.link.client().tags();
        for tag in &tags[from..] {
            self.link.on_write_complete(*tag, true, &self.events);
        }
        tags.len()
    }

    fn pump(&mut self) -> usize {
        self.svc.poll(&self.events, &mut self.link, &mut self.sink)
    }
}

#[test]
fn text_transfer_completes_after_all_writes_confirmed() {
    let mut rig = Rig::new(LinkConfig::default(), 20);

    let id = rig.svc.send_text("hello from the host side", &mut rig.link).unwrap();
    let frames = rig.link.client().frames();
    assert_eq!(frames.len(), 2);
    assert!(rig.link.client().writes.iter().all(|w| w.handle == WRITER));

    let msg = reassemble(&frames).unwrap();
    assert_eq!(msg.payload, b"hello from the host side");

    rig.clock.advance_ms(10);
    rig.complete_writes(0);
    assert_eq!(rig.pump(), 2);

    assert_eq!(rig.sink.len(), 1);
    let LinkEvent::TransferCompleted(report) = &rig.sink[0] else {
        panic!("unexpected {:?}", rig.sink[0]);
    };
    assert_eq!(report.id, id);
    assert_eq!(report.frames, 2);
    assert_eq!(report.total_bytes, 24);
    assert_eq!(report.wire_bytes, 24 + 7 + 5);
    assert!(!rig.svc.transfer_pending());
}

#[test]
fn credit_window_paces_writes() {
    let config = LinkConfig {
        max_in_flight: Some(2),
        ..LinkConfig::default()
    };
    let mut rig = Rig::new(config, 12);

    // 5 + 7 + 7 + 7 + 4 bytes over five frames.
    rig.svc.send(&LogicalMessage::new(0x80, vec![1u8; 30]), &mut rig.link).unwrap();
    assert_eq!(rig.link.client().writes.len(), 2);

    let mut done = 0;
    while rig.svc.transfer_pending() {
        done = rig.complete_writes(done);
        rig.pump();
        assert!(rig.link.client().writes.len() - done <= 2);
    }

    assert_eq!(rig.link.client().writes.len(), 5);
    assert!(matches!(rig.sink.as_slice(), [LinkEvent::TransferCompleted(_)]));
}

#[test]
fn device_reply_is_reassembled() {
    let mut rig = Rig::new(LinkConfig::default(), 20);
    let device = FrameCodec::new(ChannelId([1, 2, 3, 4]));
    let reply: Vec<u8> = (0..50).collect();

    for frame in device.encode(0xC1, &reply, 20).unwrap() {
        rig.link.on_value_changed(READER, &frame, &rig.events).unwrap();
    }
    rig.pump();

    assert_eq!(
        rig.sink,
        vec![LinkEvent::MessageReceived(LogicalMessage::new(0xC1, reply))]
    );
    assert!(!rig.svc.reassembly_active());
}

#[test]
fn interleaved_channel_drops_partial_reply() {
    let mut rig = Rig::new(LinkConfig::default(), 20);
    let a = FrameCodec::new(ChannelId([0xAA; 4]))
        .encode(0x80, &[7u8; 40], 20)
        .unwrap();
    let b = FrameCodec::new(ChannelId([0xBB; 4]))
        .encode(0x80, &[9u8; 40], 20)
        .unwrap();

    rig.link.on_value_changed(READER, &a[0], &rig.events).unwrap();
    rig.link.on_value_changed(READER, &b[1], &rig.events).unwrap();
    rig.pump();

    assert_eq!(
        rig.sink,
        vec![LinkEvent::ReassemblyFailed(LinkError::ChannelMismatch {
            expected: ChannelId([0xAA; 4]),
            got: ChannelId([0xBB; 4]),
        })]
    );
    assert!(!rig.svc.reassembly_active());
}

#[test]
fn submit_failure_surfaces_and_frees_the_session() {
    let mut rig = Rig::new(LinkConfig::default(), 10);
    rig.link.client_mut().fail_at = Some(1);

    assert_eq!(
        rig.svc.send_text("needs several frames", &mut rig.link),
        Err(LinkError::WriteFailed { frame_index: 1 })
    );
    assert!(!rig.svc.transfer_pending());

    rig.link.client_mut().fail_at = None;
    rig.svc.send_text("ok", &mut rig.link).unwrap();
}

#[test]
fn disconnect_mid_transfer() {
    let mut rig = Rig::new(LinkConfig::default(), 20);
    let id = rig.svc.send_text("a message that spans frames", &mut rig.link).unwrap();

    rig.link.client_mut().connected = false;
    rig.link.on_disconnected(&rig.events);
    rig.pump();

    assert_eq!(
        rig.sink,
        vec![
            LinkEvent::TransferFailed {
                id,
                error: LinkError::Disconnected
            },
            LinkEvent::LinkDown,
        ]
    );
    assert_eq!(
        rig.svc.send_text("again", &mut rig.link),
        Err(LinkError::NotConnected)
    );

    // Reconnected but not yet rediscovered.
    rig.link.client_mut().connected = true;
    assert_eq!(
        rig.svc.send_text("again", &mut rig.link),
        Err(LinkError::NotBound)
    );
}

#[test]
fn late_write_confirmation_after_disconnect_is_ignored() {
    let mut rig = Rig::new(LinkConfig::default(), 20);
    rig.svc.send_text("pending", &mut rig.link).unwrap();
    let tag = rig.link.client().tags()[0];

    rig.link.on_disconnected(&rig.events);
    rig.link.on_write_complete(tag, true, &rig.events);
    rig.pump();

    assert_eq!(rig.sink.len(), 2);
    assert!(matches!(rig.sink[1], LinkEvent::LinkDown));
}
