//! Scripted tracking for simulated participants
//!
//! A seeded random walk of the headset with controllers held at fixed
//! offsets. Identical seeds give identical motion.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use xpvr_avatar::{ControllerSample, DeviceSample, TrackedDevice, TrackingSource};
use xpvr_core::{AvatarVariant, Position3D, Rotation3D, Transform, TriggerState, XpvrResult};

/// Walk bounds on the horizontal axes, metres
pub const WALK_BOUND: f32 = 3.0;

const HEAD_HEIGHT: f32 = 1.6;
const LEFT_OFFSET: Position3D = Position3D {
    x: -0.25,
    y: -0.4,
    z: 0.3,
};
const RIGHT_OFFSET: Position3D = Position3D {
    x: 0.25,
    y: -0.4,
    z: 0.3,
};

/// Random-walk settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkConfig {
    /// Largest move per sample on each axis, metres
    pub step: f32,
    /// Largest yaw change per sample, radians
    pub turn: f32,
    /// Chance per sample that a trigger flips
    pub trigger_flip: f64,
    /// Samples that move; later samples repeat the last pose
    pub moves: Option<u64>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            step: 0.05,
            turn: 0.05,
            trigger_flip: 0.05,
            moves: None,
        }
    }
}

/// Read access to the last sample of a `ScriptedTracking`
#[derive(Debug, Clone, Default)]
pub struct TrackingProbe {
    last: Arc<Mutex<DeviceSample>>,
}

impl TrackingProbe {
    pub fn last(&self) -> DeviceSample {
        *self.last.lock()
    }
}

/// Seeded random-walk tracking source
#[derive(Debug)]
pub struct ScriptedTracking {
    rng: StdRng,
    variant: AvatarVariant,
    walk: WalkConfig,
    position: Position3D,
    yaw: f32,
    left: TriggerState,
    right: TriggerState,
    samples: u64,
    probe: TrackingProbe,
}

impl ScriptedTracking {
    pub fn new(variant: AvatarVariant, seed: u64) -> Self {
        Self::with_walk(variant, seed, WalkConfig::default())
    }

    pub fn with_walk(variant: AvatarVariant, seed: u64, walk: WalkConfig) -> Self {
        let mut tracking = Self {
            rng: StdRng::seed_from_u64(seed),
            variant,
            walk,
            position: Position3D::new(0.0, HEAD_HEIGHT, 0.0),
            yaw: 0.0,
            left: TriggerState::default(),
            right: TriggerState::default(),
            samples: 0,
            probe: TrackingProbe::default(),
        };
        *tracking.probe.last.lock() = tracking.current();
        tracking
    }

    pub fn probe(&self) -> TrackingProbe {
        self.probe.clone()
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    fn current(&self) -> DeviceSample {
        let rotation = Rotation3D::from_euler(self.yaw, 0.0, 0.0);
        let head = Transform::new(self.position, rotation);
        if !self.variant.tracks_hands() {
            return DeviceSample::head_only(head);
        }

        let controller = |offset: Position3D, triggers: TriggerState| ControllerSample {
            transform: Transform::new(
                Position3D::new(
                    self.position.x + offset.x,
                    self.position.y + offset.y,
                    self.position.z + offset.z,
                ),
                rotation,
            ),
            triggers,
        };
        DeviceSample {
            head,
            left: Some(controller(LEFT_OFFSET, self.left)),
            right: Some(controller(RIGHT_OFFSET, self.right)),
        }
    }

    fn advance(&mut self) {
        if self.walk.moves.map_or(false, |m| self.samples >= m) {
            return;
        }

        let step = self.walk.step;
        if step > 0.0 {
            self.position.x = (self.position.x + self.rng.gen_range(-step..=step))
                .clamp(-WALK_BOUND, WALK_BOUND);
            self.position.z = (self.position.z + self.rng.gen_range(-step..=step))
                .clamp(-WALK_BOUND, WALK_BOUND);
        }
        if self.walk.turn > 0.0 {
            self.yaw += self.rng.gen_range(-self.walk.turn..=self.walk.turn);
        }

        for triggers in [&mut self.left, &mut self.right] {
            if self.rng.gen_bool(self.walk.trigger_flip) {
                triggers.grip = !triggers.grip;
            }
            if self.rng.gen_bool(self.walk.trigger_flip) {
                triggers.index = !triggers.index;
            }
        }
    }
}

impl TrackingSource for ScriptedTracking {
    fn has_device(&self, device: TrackedDevice) -> bool {
        match device {
            TrackedDevice::Head => true,
            TrackedDevice::LeftController | TrackedDevice::RightController => {
                self.variant.tracks_hands()
            }
        }
    }

    fn sample(&mut self) -> XpvrResult<DeviceSample> {
        self.advance();
        self.samples += 1;
        let sample = self.current();
        *self.probe.last.lock() = sample;
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_walk() {
        let mut a = ScriptedTracking::new(AvatarVariant::FullVr, 7);
        let mut b = ScriptedTracking::new(AvatarVariant::FullVr, 7);
        for _ in 0..50 {
            assert_eq!(a.sample().unwrap(), b.sample().unwrap());
        }
    }

    #[test]
    fn test_head_only_variant_has_no_controllers() {
        let mut tracking = ScriptedTracking::new(AvatarVariant::Hololens, 1);
        assert!(!tracking.has_device(TrackedDevice::LeftController));
        let sample = tracking.sample().unwrap();
        assert!(sample.left.is_none() && sample.right.is_none());
    }

    #[test]
    fn test_walk_stops_after_moves() {
        let walk = WalkConfig {
            moves: Some(3),
            ..WalkConfig::default()
        };
        let mut tracking = ScriptedTracking::with_walk(AvatarVariant::FullVr, 9, walk);
        let probe = tracking.probe();
        for _ in 0..3 {
            tracking.sample().unwrap();
        }
        let frozen = probe.last();
        assert_eq!(tracking.sample().unwrap(), frozen);
        assert_eq!(tracking.sample().unwrap(), frozen);
        assert_eq!(tracking.samples(), 5);
    }

    proptest! {
        #[test]
        fn prop_walk_stays_in_bounds(seed in any::<u64>(), n in 1usize..300) {
            let walk = WalkConfig { step: 0.5, ..WalkConfig::default() };
            let mut tracking = ScriptedTracking::with_walk(AvatarVariant::FullVr, seed, walk);
            for _ in 0..n {
                let sample = tracking.sample().unwrap();
                prop_assert!(sample.head.is_finite());
                prop_assert!(sample.head.position.x.abs() <= WALK_BOUND);
                prop_assert!(sample.head.position.z.abs() <= WALK_BOUND);
            }
        }
    }
}
