//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters. All tests run on the host with no radio required.

mod gatt_flow_tests;
mod mock_link;
mod service_tests;
