//! `LinkService` command flows: info report, speed test, config-driven
//! behaviour and reassembly timeouts.

use hwlink::adapters::ble_transport::GattLink;
use hwlink::app::commands::{CMD_INFO, INFO_REPORT_LEN, build_speed_test_payload};
use hwlink::app::events::LinkEvent;
use hwlink::app::service::LinkService;
use hwlink::config::LinkConfig;
use hwlink::error::LinkError;
use hwlink::link::channels::{LinkEvents, new_link_events};
use hwlink::link::chunked::reassemble;
use hwlink::link::codec::ChannelId;
use hwlink::link::session::Throughput;

use crate::mock_link::{MockGatt, ManualClock, READER, WRITER};

fn bound_link(config: &LinkConfig, mtu: usize) -> GattLink<MockGatt> {
    let mut link = GattLink::new(MockGatt::new(mtu), config);
    link.on_characteristic_discovered(config.writer_uuid, WRITER);
    link.on_characteristic_discovered(config.reader_uuid, READER);
    link
}

fn confirm_all(link: &GattLink<MockGatt>, events: &LinkEvents) {
    for tag in link.client().tags() {
        link.on_write_complete(tag, true, events);
    }
}

#[test]
fn info_report_is_one_padded_frame() {
    let config = LinkConfig::default();
    let mut link = bound_link(&config, 185);
    let events = Box::new(new_link_events());
    let mut sink: Vec<LinkEvent> = Vec::new();
    let mut svc = LinkService::new(config, ManualClock::default());

    svc.send_info(&mut link).unwrap();
    let frames = link.client().frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].len(), INFO_REPORT_LEN);
    assert_eq!(
        &frames[0][..8],
        &[0xEE, 0xEE, 0xEE, 0xEE, CMD_INFO, 0x00, 0x01, b'i']
    );
    assert!(frames[0][8..].iter().all(|&b| b == 0));

    confirm_all(&link, &events);
    svc.poll(&events, &mut link, &mut sink);
    let [LinkEvent::TransferCompleted(report)] = sink.as_slice() else {
        panic!("unexpected {:?}", sink);
    };
    assert_eq!(report.total_bytes, 1);
    assert_eq!(report.throughput, Throughput::Indeterminate);
}

#[test]
fn speed_test_uses_configured_size_and_channel() {
    let config = LinkConfig::from_json(
        r#"{ "channel_id": [1, 2, 3, 4], "speed_test_size": 1000 }"#,
    )
    .unwrap();
    let mut link = bound_link(&config, 247);
    let events = Box::new(new_link_events());
    let mut sink: Vec<LinkEvent> = Vec::new();
    let clock = ManualClock::default();
    let mut svc = LinkService::new(config, clock.clone());

    svc.start_speed_test(&mut link).unwrap();
    let frames = link.client().frames();
    assert!(frames.iter().all(|f| f[..4] == [1, 2, 3, 4]));
    assert_eq!(reassemble(&frames).unwrap().payload, build_speed_test_payload(1000));

    clock.advance_ms(250);
    confirm_all(&link, &events);
    svc.poll(&events, &mut link, &mut sink);

    let [LinkEvent::TransferCompleted(report)] = sink.as_slice() else {
        panic!("unexpected {:?}", sink);
    };
    assert_eq!(report.throughput.kb_per_sec(), Some(4.0));
    assert_eq!(report.throughput.to_string(), "4.000 kB/s");
}

#[test]
fn too_small_mtu_is_rejected_before_any_write() {
    let config = LinkConfig::default();
    let mut link = bound_link(&config, 7);
    let mut svc = LinkService::new(config, ManualClock::default());

    assert_eq!(
        svc.send_text("x", &mut link),
        Err(LinkError::MtuTooSmall { mtu: 7 })
    );
    assert!(link.client().writes.is_empty());
    assert!(!svc.transfer_pending());
}

#[test]
fn quiet_partial_expires_on_poll() {
    let config = LinkConfig::from_json(r#"{ "reassembly_timeout_ms": 100 }"#).unwrap();
    let mut link = bound_link(&config, 20);
    let events = Box::new(new_link_events());
    let mut sink: Vec<LinkEvent> = Vec::new();
    let clock = ManualClock::default();
    let mut svc = LinkService::new(config, clock.clone());

    let first = [0xEE, 0xEE, 0xEE, 0xEE, 0x80, 0x00, 0x10, 1, 2];
    link.on_value_changed(READER, &first, &events).unwrap();
    svc.poll(&events, &mut link, &mut sink);
    assert!(svc.reassembly_active());

    clock.advance_ms(99);
    svc.poll_timeouts(&mut sink);
    assert!(sink.is_empty());

    clock.advance_ms(1);
    svc.poll_timeouts(&mut sink);
    assert_eq!(
        sink,
        vec![LinkEvent::ReassemblyFailed(LinkError::IncompleteMessage {
            declared: 16,
            received: 2
        })]
    );
    assert!(!svc.reassembly_active());
}

#[test]
fn config_channel_round_trips_through_json() {
    let config = LinkConfig {
        channel_id: ChannelId([9, 8, 7, 6]),
        max_in_flight: Some(4),
        ..LinkConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(LinkConfig::from_json(&json).unwrap(), config);
}
