//! # party-gateway
//!
//! WebSocket gateway for real-time room presence and chat fan-out.

pub mod broadcast;
pub mod connection;
pub mod events;
pub mod server;
pub mod session;

pub use server::run;
