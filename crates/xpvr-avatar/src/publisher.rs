//! State publisher - outbound side of the local avatar

use bytes::Bytes;
use tracing::trace;
use xpvr_core::{AvatarVariant, Hand, HandEncoding, HandPose, HandPoses, XpvrResult};

use crate::{AvatarSnapshot, DeviceSample, HandsSnapshot};

/// Builds one snapshot per synchronization tick from local tracking
#[derive(Debug, Clone)]
pub struct StatePublisher {
    variant: AvatarVariant,
    encoding: HandEncoding,
    sequence: u32,
    hand_poses: HandPoses,
}

impl StatePublisher {
    /// Both hands start in the resting pose
    pub fn new(variant: AvatarVariant, encoding: HandEncoding) -> Self {
        Self {
            variant,
            encoding,
            sequence: 0,
            hand_poses: HandPoses::default(),
        }
    }

    pub fn variant(&self) -> AvatarVariant {
        self.variant
    }

    pub fn hand_poses(&self) -> HandPoses {
        self.hand_poses
    }

    /// Snapshots published so far
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Set one hand's pose directly
    pub fn set_hand_pose(&mut self, hand: Hand, pose: HandPose) {
        self.hand_poses.set(hand, pose);
    }

    /// Per-frame input mapping from controller triggers.
    ///
    /// A missing controller leaves that hand's pose unchanged.
    pub fn update_hand_poses(&mut self, sample: &DeviceSample) {
        if !self.variant.tracks_hands() {
            return;
        }
        for hand in Hand::all() {
            if let Some(controller) = sample.controller(hand) {
                self.hand_poses
                    .set(hand, HandPose::from_triggers(controller.triggers));
            }
        }
    }

    /// Snapshot of the current local state
    pub fn snapshot(&self, sample: &DeviceSample) -> XpvrResult<AvatarSnapshot> {
        if !self.variant.tracks_hands() {
            return Ok(AvatarSnapshot::head_only(sample.head));
        }

        let (left, right) = sample.controllers()?;
        Ok(AvatarSnapshot::with_hands(
            sample.head,
            HandsSnapshot {
                left: left.transform,
                right: right.transform,
                poses: self.hand_poses,
            },
        ))
    }

    /// Encode this tick's snapshot
    pub fn publish(&mut self, sample: &DeviceSample) -> XpvrResult<Bytes> {
        let snapshot = self.snapshot(sample)?;
        let frame = snapshot.encode(self.variant, self.encoding, self.sequence)?;
        let bytes = frame.serialize()?;

        trace!(
            variant = %self.variant,
            sequence = self.sequence,
            fields = frame.header.field_count,
            "published snapshot"
        );

        self.sequence = self.sequence.wrapping_add(1);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControllerSample;
    use xpvr_core::{Position3D, Transform, TriggerState, XpvrError};
    use xpvr_wire::SnapshotFrame;

    fn vr_sample(left: TriggerState, right: TriggerState) -> DeviceSample {
        DeviceSample {
            head: Transform::from_position(Position3D::new(0.0, 1.6, 0.0)),
            left: Some(ControllerSample {
                transform: Transform::from_position(Position3D::new(-0.3, 1.0, 0.2)),
                triggers: left,
            }),
            right: Some(ControllerSample {
                transform: Transform::from_position(Position3D::new(0.3, 1.0, 0.2)),
                triggers: right,
            }),
        }
    }

    #[test]
    fn test_hand_poses_follow_triggers() {
        let mut publisher = StatePublisher::new(AvatarVariant::FullVr, HandEncoding::Flags);
        assert_eq!(publisher.hand_poses(), HandPoses::default());

        publisher.update_hand_poses(&vr_sample(
            TriggerState::new(true, true),
            TriggerState::new(true, false),
        ));
        assert_eq!(
            publisher.hand_poses(),
            HandPoses::new(HandPose::ThumbsUp, HandPose::FingerPoint)
        );

        publisher.update_hand_poses(&vr_sample(TriggerState::default(), TriggerState::default()));
        assert_eq!(publisher.hand_poses(), HandPoses::default());
    }

    #[test]
    fn test_publish_increments_sequence() {
        let mut publisher = StatePublisher::new(AvatarVariant::FullVr, HandEncoding::Flags);
        let sample = vr_sample(TriggerState::default(), TriggerState::default());

        let first = SnapshotFrame::parse(publisher.publish(&sample).unwrap()).unwrap();
        let second = SnapshotFrame::parse(publisher.publish(&sample).unwrap()).unwrap();

        assert_eq!(first.header.sequence, 0);
        assert_eq!(second.header.sequence, 1);
        assert_eq!(publisher.sequence(), 2);
    }

    #[test]
    fn test_full_vr_needs_controllers() {
        let mut publisher = StatePublisher::new(AvatarVariant::FullVr, HandEncoding::Flags);
        let sample = DeviceSample::head_only(Transform::IDENTITY);

        assert_eq!(
            publisher.publish(&sample),
            Err(XpvrError::MissingTrackedDevice("left controller"))
        );
        assert_eq!(publisher.sequence(), 0);
    }

    #[test]
    fn test_head_only_variant_ignores_triggers() {
        let mut publisher = StatePublisher::new(AvatarVariant::Hololens, HandEncoding::Flags);
        publisher.update_hand_poses(&vr_sample(
            TriggerState::new(true, true),
            TriggerState::new(true, true),
        ));
        assert_eq!(publisher.hand_poses(), HandPoses::default());

        let snapshot = publisher
            .snapshot(&vr_sample(TriggerState::default(), TriggerState::default()))
            .unwrap();
        assert!(snapshot.hands.is_none());
    }
}
