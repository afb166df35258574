//! Avatar snapshot - the serialization order contract
//!
//! Field order for a full VR avatar:
//!
//! 1. head position, head rotation
//! 2. left controller position, left controller rotation
//! 3. right controller position, right controller rotation
//! 4. left hand pose, right hand pose
//!
//! With the flag encoding each hand pose is three booleans
//! (normal, thumbs up, finger point); with the compact encoding it is one
//! code. Head-only variants stop after step 1.

use xpvr_core::{
    AvatarVariant, HandEncoding, HandPose, HandPoses, Transform, XpvrError, XpvrResult,
};
use xpvr_wire::{SnapshotFlags, SnapshotFrame, SyncReader, SyncWriter};

/// Controller transforms and hand poses of a full VR avatar
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandsSnapshot {
    pub left: Transform,
    pub right: Transform,
    pub poses: HandPoses,
}

/// One tick of replicated avatar state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AvatarSnapshot {
    pub head: Transform,
    /// Present exactly for variants that track hands
    pub hands: Option<HandsSnapshot>,
}

impl AvatarSnapshot {
    pub fn head_only(head: Transform) -> Self {
        Self { head, hands: None }
    }

    pub fn with_hands(head: Transform, hands: HandsSnapshot) -> Self {
        Self {
            head,
            hands: Some(hands),
        }
    }

    /// Write the fields of `variant` in their fixed order
    pub fn write(
        &self,
        variant: AvatarVariant,
        encoding: HandEncoding,
        w: &mut SyncWriter,
    ) -> XpvrResult<()> {
        w.send_position(self.head.position);
        w.send_rotation(self.head.rotation);

        if !variant.tracks_hands() {
            return Ok(());
        }

        let hands = self
            .hands
            .ok_or(XpvrError::MissingTrackedDevice("hand controllers"))?;

        w.send_position(hands.left.position);
        w.send_rotation(hands.left.rotation);
        w.send_position(hands.right.position);
        w.send_rotation(hands.right.rotation);

        match encoding {
            HandEncoding::Flags => {
                for pose in [hands.poses.left, hands.poses.right] {
                    for flag in pose.to_flags() {
                        w.send_flag(flag);
                    }
                }
            }
            HandEncoding::Compact => {
                w.send_hand_code(hands.poses.left);
                w.send_hand_code(hands.poses.right);
            }
        }

        Ok(())
    }

    /// Read the fields of `variant` in their fixed order
    pub fn read(
        variant: AvatarVariant,
        encoding: HandEncoding,
        r: &mut SyncReader,
    ) -> XpvrResult<Self> {
        let head = Transform::new(r.receive_position()?, r.receive_rotation()?);

        if !variant.tracks_hands() {
            return Ok(Self::head_only(head));
        }

        let left = Transform::new(r.receive_position()?, r.receive_rotation()?);
        let right = Transform::new(r.receive_position()?, r.receive_rotation()?);

        let poses = match encoding {
            HandEncoding::Flags => {
                let left = read_flags(r)?;
                let right = read_flags(r)?;
                HandPoses::new(left, right)
            }
            HandEncoding::Compact => {
                HandPoses::new(r.receive_hand_code()?, r.receive_hand_code()?)
            }
        };

        Ok(Self::with_hands(head, HandsSnapshot { left, right, poses }))
    }

    /// Encode into a complete frame
    pub fn encode(
        &self,
        variant: AvatarVariant,
        encoding: HandEncoding,
        sequence: u32,
    ) -> XpvrResult<SnapshotFrame> {
        let mut w = SyncWriter::with_capacity(variant.field_count(encoding));
        self.write(variant, encoding, &mut w)?;
        SnapshotFrame::from_writer(variant, SnapshotFlags::for_encoding(encoding), sequence, w)
    }

    /// Decode a frame sent by a peer of the same variant
    pub fn decode(frame: &SnapshotFrame, variant: AvatarVariant) -> XpvrResult<Self> {
        let mut r = frame.reader_for(variant)?;
        let snapshot = Self::read(variant, frame.header.hand_encoding(), &mut r)?;
        r.finish()?;
        Ok(snapshot)
    }
}

fn read_flags(r: &mut SyncReader) -> XpvrResult<HandPose> {
    let flags = [r.receive_flag()?, r.receive_flag()?, r.receive_flag()?];
    HandPose::from_flags(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpvr_core::{Position3D, Rotation3D};

    fn full_vr_sample() -> AvatarSnapshot {
        AvatarSnapshot::with_hands(
            Transform::from_position(Position3D::new(1.0, 2.0, 3.0)),
            HandsSnapshot::default(),
        )
    }

    #[test]
    fn test_full_vr_roundtrip() {
        let snapshot = full_vr_sample();
        let frame = snapshot
            .encode(AvatarVariant::FullVr, HandEncoding::Flags, 1)
            .unwrap();
        assert_eq!(frame.header.field_count, 12);

        let decoded = AvatarSnapshot::decode(&frame, AvatarVariant::FullVr).unwrap();
        assert_eq!(decoded, snapshot);

        let hands = decoded.hands.unwrap();
        assert_eq!(hands.left, Transform::IDENTITY);
        assert_eq!(hands.poses, HandPoses::default());
    }

    #[test]
    fn test_compact_roundtrip() {
        let mut snapshot = full_vr_sample();
        if let Some(hands) = snapshot.hands.as_mut() {
            hands.poses = HandPoses::new(HandPose::ThumbsUp, HandPose::FingerPoint);
            hands.right.rotation = Rotation3D::from_euler(0.3, 0.0, 0.0);
        }

        let frame = snapshot
            .encode(AvatarVariant::FullVr, HandEncoding::Compact, 2)
            .unwrap();
        assert_eq!(frame.header.field_count, 8);

        let decoded = AvatarSnapshot::decode(&frame, AvatarVariant::FullVr).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_head_only_variant_drops_hands() {
        let frame = full_vr_sample()
            .encode(AvatarVariant::Pc, HandEncoding::Flags, 0)
            .unwrap();
        assert_eq!(frame.header.field_count, 2);

        let decoded = AvatarSnapshot::decode(&frame, AvatarVariant::Pc).unwrap();
        assert_eq!(decoded.head, full_vr_sample().head);
        assert!(decoded.hands.is_none());
    }

    #[test]
    fn test_full_vr_without_hands_fails() {
        let snapshot = AvatarSnapshot::head_only(Transform::IDENTITY);
        assert!(matches!(
            snapshot.encode(AvatarVariant::FullVr, HandEncoding::Flags, 0),
            Err(XpvrError::MissingTrackedDevice(_))
        ));
    }

    #[test]
    fn test_two_field_sender_against_twelve_field_receiver() {
        let frame = AvatarSnapshot::head_only(Transform::IDENTITY)
            .encode(AvatarVariant::GenericVr, HandEncoding::Flags, 0)
            .unwrap();
        let bytes = frame.serialize().unwrap();

        // Receiver running the full VR contract
        let parsed = SnapshotFrame::parse(bytes).unwrap();
        let err = AvatarSnapshot::decode(&parsed, AvatarVariant::FullVr).unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn test_conflicting_hand_flags_rejected() {
        let mut w = SyncWriter::new();
        for t in [Transform::IDENTITY; 3] {
            w.send_position(t.position);
            w.send_rotation(t.rotation);
        }
        for flag in [true, true, false, true, false, false] {
            w.send_flag(flag);
        }
        let frame =
            SnapshotFrame::from_writer(AvatarVariant::FullVr, SnapshotFlags::NONE, 0, w).unwrap();

        assert_eq!(
            AvatarSnapshot::decode(&frame, AvatarVariant::FullVr),
            Err(XpvrError::InvalidHandFlags([true, true, false]))
        );
    }
}
