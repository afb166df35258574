//! State receiver - inbound side of a remote avatar
//!
//! Every decoded snapshot overwrites the target unconditionally. The
//! channel is reliable and ordered, so there is no staleness check; the
//! sequence number is only kept for diagnostics.

use bytes::Bytes;
use tracing::{debug, trace};
use xpvr_core::{AvatarVariant, XpvrResult};
use xpvr_wire::SnapshotFrame;

use crate::{AvatarSnapshot, HandsSnapshot, SmoothingState};

/// Decodes inbound snapshots for one remote avatar
#[derive(Debug, Clone)]
pub struct StateReceiver {
    variant: AvatarVariant,
    last_sequence: Option<u32>,
    received: u64,
}

impl StateReceiver {
    pub fn new(variant: AvatarVariant) -> Self {
        Self {
            variant,
            last_sequence: None,
            received: 0,
        }
    }

    pub fn variant(&self) -> AvatarVariant {
        self.variant
    }

    /// Sequence of the last applied snapshot
    pub fn last_sequence(&self) -> Option<u32> {
        self.last_sequence
    }

    /// Snapshots applied so far
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Decode `bytes` and overwrite the target pose and hands.
    ///
    /// The whole snapshot is decoded before anything is written, so a
    /// malformed snapshot leaves the previous target in place.
    pub fn receive(
        &mut self,
        bytes: Bytes,
        smoothing: &mut SmoothingState,
        hands: &mut Option<HandsSnapshot>,
    ) -> XpvrResult<AvatarSnapshot> {
        let frame = SnapshotFrame::parse(bytes)?;
        let snapshot = AvatarSnapshot::decode(&frame, self.variant)?;

        smoothing.set_target(snapshot.head);
        if snapshot.hands.is_some() {
            *hands = snapshot.hands;
        }

        if let Some(prev) = self.last_sequence {
            let expected = prev.wrapping_add(1);
            if frame.header.sequence != expected {
                debug!(
                    expected,
                    actual = frame.header.sequence,
                    "snapshot sequence gap"
                );
            }
        }
        trace!(sequence = frame.header.sequence, "applied snapshot");

        self.last_sequence = Some(frame.header.sequence);
        self.received += 1;
        Ok(snapshot)
    }
}
