//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter         | Implements  | Connects to                 |
//! |-----------------|-------------|-----------------------------|
//! | `ble_transport` | LinkPort    | Platform GATT client        |
//! | `log_sink`      | EventSink   | `log` facade                |
//! | `time`          | TimePort    | `std::time::Instant`        |

pub mod ble_transport;
pub mod log_sink;
pub mod time;
