//! End-to-end replication scenarios
//!
//! Participants join a `LoopbackHub` room through the bootstrap flow,
//! spawn their local avatar with scripted tracking, and follow each other
//! through their own `AvatarSession`.

use tracing::debug;
use xpvr_avatar::{AvatarFrame, LocalInstanceRegistry};
use xpvr_core::{ParticipantId, Transform, XpvrResult};
use xpvr_session::{AvatarSession, RoomInfo, SessionBootstrap, SessionConfig};

use crate::{LoopbackChannel, LoopbackClient, LoopbackHub, ScriptedTracking, TrackingProbe, WalkConfig};

/// One simulated client in a loopback room
pub struct SimulatedParticipant {
    client: LoopbackClient,
    session: AvatarSession<LoopbackChannel>,
    room: RoomInfo,
    probe: TrackingProbe,
}

impl SimulatedParticipant {
    /// Join or create a room and spawn the local avatar
    pub fn join(
        hub: &LoopbackHub,
        config: SessionConfig,
        walk: WalkConfig,
        seed: u64,
        registry: &'static LocalInstanceRegistry,
    ) -> XpvrResult<Self> {
        let mut client = hub.client();
        let room = client.join_or_create(&config.room)?;

        let variant = config.variant;
        let tracking = ScriptedTracking::with_walk(variant, seed, walk);
        let probe = tracking.probe();

        let mut session = AvatarSession::with_registry(config, client.channel()?, registry)?;
        session.spawn_local(room.local, Box::new(tracking))?;
        client.instantiate(variant)?;

        Ok(Self {
            client,
            session,
            room,
            probe,
        })
    }

    pub fn participant(&self) -> ParticipantId {
        self.room.local
    }

    pub fn room(&self) -> &RoomInfo {
        &self.room
    }

    pub fn session(&self) -> &AvatarSession<LoopbackChannel> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut AvatarSession<LoopbackChannel> {
        &mut self.session
    }

    /// Most recent pose of the local tracking
    pub fn tracked_head(&self) -> Transform {
        self.probe.last().head
    }

    /// Spawn avatars of new peers and despawn departed ones
    pub fn refresh_roster(&mut self) -> XpvrResult<()> {
        let peers = self.client.peers();

        for (participant, variant) in &peers {
            if !self.session.roster().contains(*participant) {
                self.session.spawn_remote(*participant, *variant)?;
            }
        }

        let departed: Vec<ParticipantId> = self
            .session
            .roster()
            .iter()
            .filter(|i| !i.is_local())
            .map(|i| i.participant())
            .filter(|p| !peers.iter().any(|(q, _)| q == p))
            .collect();
        for participant in departed {
            debug!(%participant, "peer departed");
            self.session.despawn(participant)?;
        }
        Ok(())
    }

    /// Roster refresh followed by one `update`
    pub fn step(&mut self, dt: f32) -> XpvrResult<Vec<AvatarFrame>> {
        self.refresh_roster()?;
        self.session.update(dt)
    }

    /// Tear down the session and leave the room
    pub fn leave(mut self) {
        self.session.teardown();
        self.client.leave();
    }
}

/// Step every participant `frames` times; returns each one's last frames
pub fn run_frames(
    participants: &mut [SimulatedParticipant],
    frames: usize,
    dt: f32,
) -> XpvrResult<Vec<Vec<AvatarFrame>>> {
    let mut last = vec![Vec::new(); participants.len()];
    for _ in 0..frames {
        for (participant, out) in participants.iter_mut().zip(last.iter_mut()) {
            *out = participant.step(dt)?;
        }
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpvr_avatar::SmoothStep;
    use xpvr_core::{AvatarVariant, Hand, HandEncoding, HandPose};

    const DT: f32 = 1.0 / 60.0;

    fn registry() -> &'static LocalInstanceRegistry {
        Box::leak(Box::new(LocalInstanceRegistry::new()))
    }

    fn config(variant: AvatarVariant) -> SessionConfig {
        SessionConfig {
            variant,
            ..SessionConfig::default()
        }
    }

    fn stopping_walk(moves: u64) -> WalkConfig {
        WalkConfig {
            moves: Some(moves),
            ..WalkConfig::default()
        }
    }

    fn join(hub: &LoopbackHub, config: SessionConfig, seed: u64) -> SimulatedParticipant {
        SimulatedParticipant::join(hub, config, stopping_walk(120), seed, registry()).unwrap()
    }

    fn assert_close(actual: &Transform, expected: &Transform) {
        assert!(
            actual.position.distance(&expected.position) < 1e-3,
            "{actual:?} vs {expected:?}"
        );
        assert!(actual.rotation.dot(&expected.rotation).abs() > 0.9999);
    }

    #[test]
    fn test_two_participants_converge() {
        let hub = LoopbackHub::new();
        let mut room = vec![
            join(&hub, config(AvatarVariant::FullVr), 1),
            join(&hub, config(AvatarVariant::FullVr), 2),
        ];
        assert_eq!(room[0].room().name, room[1].room().name);

        let frames = run_frames(&mut room, 900, DT).unwrap();

        for (i, other) in [(0usize, 1usize), (1, 0)] {
            assert_eq!(frames[i].len(), 1);
            let frame = &frames[i][0];
            assert_eq!(frame.participant, room[other].participant());
            assert_close(&frame.head, &room[other].tracked_head());
        }

        let stats = room[1].session().stats();
        assert!(stats.snapshots_received > 0);
        assert_eq!(stats.protocol_errors, 0);
        assert_eq!(stats.dropped_snapshots, 0);
    }

    #[test]
    fn test_hand_poses_follow_sender_triggers() {
        let hub = LoopbackHub::new();
        let mut room = vec![
            join(&hub, config(AvatarVariant::FullVr), 11),
            join(&hub, config(AvatarVariant::FullVr), 12),
        ];
        let frames = run_frames(&mut room, 900, DT).unwrap();

        let sent = room[0].probe.last();
        let frame = &frames[1][0];
        for hand in Hand::all() {
            let triggers = sent.controller(hand).unwrap().triggers;
            let shown = frame.hand(hand).unwrap();
            assert_eq!(shown.visuals, HandPose::from_triggers(triggers).visuals());
            assert_eq!(shown.visuals.enabled_count(), 1);
        }
    }

    #[test]
    fn test_mixed_variants_share_a_room() {
        let hub = LoopbackHub::new();
        let mut room = vec![
            join(&hub, config(AvatarVariant::Pc), 3),
            join(&hub, config(AvatarVariant::FullVr), 4),
        ];
        let frames = run_frames(&mut room, 900, DT).unwrap();

        let pc_view_of_vr = &frames[0][0];
        assert!(pc_view_of_vr.left.is_some() && pc_view_of_vr.right.is_some());

        let vr_view_of_pc = &frames[1][0];
        assert!(vr_view_of_pc.left.is_none() && vr_view_of_pc.right.is_none());
        assert_close(&vr_view_of_pc.head, &room[0].tracked_head());
    }

    #[test]
    fn test_compact_hands_interoperate() {
        let hub = LoopbackHub::new();
        let compact = SessionConfig {
            hand_encoding: HandEncoding::Compact,
            ..config(AvatarVariant::FullVr)
        };
        let mut room = vec![join(&hub, compact, 5), join(&hub, config(AvatarVariant::FullVr), 6)];
        let frames = run_frames(&mut room, 900, DT).unwrap();

        assert_eq!(room[1].session().stats().protocol_errors, 0);
        assert_close(&frames[1][0].head, &room[0].tracked_head());
    }

    #[test]
    fn test_first_snapshot_snaps() {
        let hub = LoopbackHub::new();
        let mut room = vec![
            join(&hub, config(AvatarVariant::GenericVr), 7),
            join(&hub, config(AvatarVariant::GenericVr), 8),
        ];
        run_frames(&mut room, 10, DT).unwrap();

        // Heads start 1.6 m above the origin, beyond the default distance
        let stats = room[1].session().stats();
        assert!(stats.snapped_steps >= 1);
        assert!(stats.interpolated_steps >= 1);
    }

    #[test]
    fn test_leaving_participant_is_despawned() {
        let hub = LoopbackHub::new();
        let mut room = vec![
            join(&hub, config(AvatarVariant::FullVr), 9),
            join(&hub, config(AvatarVariant::FullVr), 10),
        ];
        run_frames(&mut room, 60, DT).unwrap();

        let leaver = room.remove(0);
        let gone = leaver.participant();
        leaver.leave();

        let frames = run_frames(&mut room, 1, DT).unwrap();
        assert!(frames[0].is_empty());
        assert!(!room[0].session().roster().contains(gone));
        assert_eq!(room[0].session().roster().len(), 1);
    }

    #[test]
    fn test_wrong_variant_is_rejected_not_truncated() {
        let hub = LoopbackHub::new();
        let mut sender = join(&hub, config(AvatarVariant::FullVr), 13);
        let mut receiver = join(&hub, config(AvatarVariant::FullVr), 14);

        // Receiver expects a head-only avatar for a full-VR sender
        receiver
            .session_mut()
            .spawn_remote(sender.participant(), AvatarVariant::GenericVr)
            .unwrap();

        for _ in 0..30 {
            sender.step(DT).unwrap();
            receiver.session_mut().update(DT).unwrap();
        }

        let stats = receiver.session().stats();
        assert!(stats.protocol_errors > 0);
        assert_eq!(stats.snapshots_received, 0);

        let frames = receiver.session_mut().on_frame(DT).unwrap();
        assert_eq!(frames[0].head, Transform::IDENTITY);
        assert_eq!(frames[0].step, SmoothStep::Interpolated);
    }

    #[test]
    fn test_scene_loaded_once_per_room() {
        let hub = LoopbackHub::new();
        let first = join(&hub, config(AvatarVariant::Pc), 15);
        let second = join(&hub, config(AvatarVariant::Pc), 16);

        assert_eq!(first.room().player_count, 1);
        assert_eq!(second.room().player_count, 2);
        assert_eq!(hub.scene(&first.room().name).as_deref(), Some("MP_Scene"));
        assert_eq!(hub.members(&first.room().name).len(), 2);
    }
}
