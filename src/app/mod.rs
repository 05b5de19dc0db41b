//! Application core — link orchestration, zero I/O.
//!
//! Builds the command payloads, drives outbound transfer sessions and
//! inbound reassembly from transport events. All interaction with the BLE
//! stack and the clock happens through port traits defined in [`ports`]
//! and [`LinkPort`](crate::link::transport::LinkPort), keeping this layer
//! testable without a radio.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
