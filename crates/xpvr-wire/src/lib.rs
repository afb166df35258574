//! XPVR Wire Protocol - Avatar snapshot format
//!
//! This crate implements the wire format for one synchronization tick:
//! - Fixed header (8 bytes): version, variant tag, flags, field count, sequence
//! - Payload: ordered fields, each a kind tag followed by its value
//!
//! The header turns variant and field-count mismatches between peers into
//! recoverable errors instead of misaligned reads.

pub mod flags;
pub mod frame;
pub mod header;
pub mod stream;

pub use flags::*;
pub use frame::*;
pub use header::*;
pub use stream::*;
