//! XPVR Avatar - Pose replication for networked avatars
//!
//! Each avatar instance is either local (owned by this process) or remote
//! for its whole life:
//!
//! - Local: the publisher samples tracked devices and emits one snapshot
//!   per synchronization tick.
//! - Remote: the receiver overwrites a target pose from each snapshot, and
//!   the smoother walks the displayed pose toward it once per frame.
//!
//! The smoother interpolates while the avatar is close to its target and
//! snaps when it is not, so teleports and late joins do not rubber-band.

pub mod instance;
pub mod publisher;
pub mod receiver;
pub mod registry;
pub mod smoothing;
pub mod snapshot;
pub mod tracking;

pub use instance::*;
pub use publisher::*;
pub use receiver::*;
pub use registry::*;
pub use smoothing::*;
pub use snapshot::*;
pub use tracking::*;
