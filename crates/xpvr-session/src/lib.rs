//! XPVR Session - Drives avatar replication for one process
//!
//! The session runs on two external clocks:
//! 1. Sync tick: publish the local snapshot, apply inbound snapshots
//! 2. Render frame: map local input to hand poses, smooth remote avatars
//!
//! Room matchmaking and the transport are collaborators behind the
//! `SessionBootstrap` and `SyncChannel` traits.

pub mod bootstrap;
pub mod channel;
pub mod config;
pub mod session;
pub mod telemetry;

pub use bootstrap::*;
pub use channel::*;
pub use config::*;
pub use session::*;
pub use telemetry::*;
