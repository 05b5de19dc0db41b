//! Application command constructors.
//!
//! Stateless builders for the messages the application sends to the
//! device. Logical messages go through [`FrameCodec`]; the info report is
//! a fixed-size HID-style report written as one raw frame.
//!
//! [`FrameCodec`]: crate::link::codec::FrameCodec

use crate::error::{LinkError, Result};
use crate::link::codec::{
    CMD_REPORT, CMD_START, CMD_SUB_INFO, ChannelId, INITIAL_HEADER_LEN, LogicalMessage,
    initial_capacity,
};

/// Total size of the fixed info report.
pub const INFO_REPORT_LEN: usize = 64;

/// Command byte of the info report: start-of-message, report flag, info.
pub const CMD_INFO: u8 = CMD_START | CMD_REPORT | CMD_SUB_INFO;

/// Fixed 64-byte info report.
pub type InfoReport = heapless::Vec<u8, INFO_REPORT_LEN>;

/// Pattern repeated by the speed-test payload.
const SPEED_TEST_PATTERN: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generic text send. Any length the codec accepts.
pub fn build_send(text: &str) -> LogicalMessage {
    LogicalMessage::new(CMD_START, text.as_bytes())
}

/// Text send that must fit one initial frame at `mtu`.
pub fn build_send_single(text: &str, mtu: usize) -> Result<LogicalMessage> {
    if text.len() > initial_capacity(mtu) {
        return Err(LinkError::PayloadTooLarge { len: text.len() });
    }
    Ok(build_send(text))
}

/// Fixed-size info query report for `channel`.
///
/// ```text
/// [chan ×4][0xC1][0x00 0x01]['i'][0x00 × 56]
/// ```
pub fn build_info(channel: ChannelId) -> InfoReport {
    let mut report = InfoReport::new();
    // Capacity is exactly INFO_REPORT_LEN; none of these can overflow.
    let _ = report.extend_from_slice(channel.as_bytes());
    let _ = report.push(CMD_INFO);
    let _ = report.extend_from_slice(&1u16.to_be_bytes());
    let _ = report.push(b'i');
    debug_assert_eq!(report.len(), INITIAL_HEADER_LEN + 1);
    let _ = report.resize(INFO_REPORT_LEN, 0);
    report
}

/// Deterministic synthetic payload for throughput measurement.
pub fn build_speed_test_payload(size: usize) -> Vec<u8> {
    SPEED_TEST_PATTERN.iter().copied().cycle().take(size).collect()
}

/// Speed-test message wrapping [`build_speed_test_payload`].
pub fn build_speed_test(size: usize) -> LogicalMessage {
    LogicalMessage::new(CMD_START, build_speed_test_payload(size))
}

/// Raw buffer of exactly `mtu` bytes of `0x01`, for probing the maximum
/// write length. Not a framed message.
pub fn build_probe(mtu: usize) -> Vec<u8> {
    vec![0x01; mtu]
}
