//! Integration test utilities for the party gateway
//!
//! Runs the full session protocol in-process against in-memory stores;
//! no Postgres, Redis, or sockets are required.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
