//! # hashq
//!
//! Deferred password hashing. Passwords are accepted immediately, held in a
//! FIFO for a fixed minimum delay, then hashed (SHA-512, base64) by a single
//! background worker. Digests are fetched later by request id; aggregate
//! timing statistics are kept alongside.

pub mod api;
pub mod config;
pub mod counter;
pub mod digest;
pub mod engine;
pub mod error;
pub mod model;
pub mod queue;
pub mod store;
pub mod telemetry;
