//! XPVR Test Harness - Multi-participant replication scenarios
//!
//! This crate provides:
//! - An in-memory room service and ordered per-room channel
//! - Seeded random-walk tracking
//! - Simulated participants joining, moving and leaving a room

pub mod integration;
pub mod loopback;
pub mod scripted;

pub use integration::*;
pub use loopback::*;
pub use scripted::*;
