//! Synchronization channel - the transport collaborator
//!
//! The channel must deliver each view's snapshots reliably and in order.
//! The session neither deduplicates nor reorders.

use bytes::Bytes;
use xpvr_core::{ViewId, XpvrResult};

/// Per-view snapshot transport
pub trait SyncChannel {
    /// Queue this tick's snapshot of a view owned by this process
    fn send(&mut self, view: ViewId, payload: Bytes) -> XpvrResult<()>;

    /// Snapshots received since the last call, in delivery order
    fn drain(&mut self) -> Vec<(ViewId, Bytes)>;
}

/// Channel that records what is sent and replays what is pushed
#[derive(Debug, Default)]
pub struct QueueChannel {
    pub sent: Vec<(ViewId, Bytes)>,
    pub inbound: Vec<(ViewId, Bytes)>,
}

impl QueueChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_inbound(&mut self, view: ViewId, payload: Bytes) {
        self.inbound.push((view, payload));
    }
}

impl SyncChannel for QueueChannel {
    fn send(&mut self, view: ViewId, payload: Bytes) -> XpvrResult<()> {
        self.sent.push((view, payload));
        Ok(())
    }

    fn drain(&mut self) -> Vec<(ViewId, Bytes)> {
        std::mem::take(&mut self.inbound)
    }
}
