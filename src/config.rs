//! Link configuration parameters
//!
//! All tunable parameters for the message link.
//! Values can be overridden from a JSON file via [`LinkConfig::load`].

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::link::codec::{ChannelId, MAX_FRAMES_PER_MESSAGE, MAX_PAYLOAD_LEN};

/// Default size of the synthetic speed-test payload.
pub const DEFAULT_SPEED_TEST_SIZE: usize = 4096;

/// Core link configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    // --- Framing ---
    /// Channel id stamped on every outbound frame
    pub channel_id: ChannelId,

    // --- Reassembly ---
    /// Partial inbound message is dropped after this long without a frame (milliseconds)
    pub reassembly_timeout_ms: u32,

    // --- Flow control ---
    /// Maximum unacknowledged frames per transfer; `None` submits all frames back-to-back
    pub max_in_flight: Option<u16>,

    // --- Speed test ---
    /// Synthetic payload size for throughput measurement (bytes)
    pub speed_test_size: usize,

    // --- GATT ---
    /// 16-bit UUID of the characteristic frames are written to
    pub writer_uuid: u16,
    /// 16-bit UUID of the characteristic replies are notified on
    pub reader_uuid: u16,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            // Framing
            channel_id: ChannelId::BROADCAST,

            // Reassembly
            reassembly_timeout_ms: 2000,

            // Flow control
            max_in_flight: None,

            // Speed test
            speed_test_size: DEFAULT_SPEED_TEST_SIZE,

            // GATT
            writer_uuid: 0x0001,
            reader_uuid: 0x0002,
        }
    }
}

/// Why a configuration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroTimeout,
    ZeroWindow,
    WindowTooLarge,
    SpeedTestTooLarge,
    UuidCollision,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroTimeout => write!(f, "reassembly_timeout_ms must be non-zero"),
            Self::ZeroWindow => write!(f, "max_in_flight must be at least 1"),
            Self::WindowTooLarge => write!(
                f,
                "max_in_flight exceeds {} frames per message",
                MAX_FRAMES_PER_MESSAGE
            ),
            Self::SpeedTestTooLarge => {
                write!(f, "speed_test_size exceeds {} bytes", MAX_PAYLOAD_LEN)
            }
            Self::UuidCollision => write!(f, "writer_uuid and reader_uuid must differ"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl LinkConfig {
    /// Reject values that would make the link misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reassembly_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        match self.max_in_flight {
            Some(0) => return Err(ConfigError::ZeroWindow),
            Some(w) if w as usize > MAX_FRAMES_PER_MESSAGE => {
                return Err(ConfigError::WindowTooLarge);
            }
            _ => {}
        }
        if self.speed_test_size > MAX_PAYLOAD_LEN {
            return Err(ConfigError::SpeedTestTooLarge);
        }
        if self.writer_uuid == self.reader_uuid {
            return Err(ConfigError::UuidCollision);
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("malformed link config")?;
        config.validate().context("invalid link config")?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("loading {}", path.display()))
    }

    /// Reassembly timeout in microseconds.
    pub fn reassembly_timeout_us(&self) -> u64 {
        u64::from(self.reassembly_timeout_ms) * 1000
    }
}
