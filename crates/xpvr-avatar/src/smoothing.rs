//! Motion smoothing - distance-gated interpolation of remote avatars
//!
//! Once per rendered frame the displayed head transform moves toward the
//! last received target:
//!
//! - closer than `applied_distance`: lerp with factor
//!   `frame_delta * smoothing_factor`
//! - otherwise: snap to the target
//!
//! The factor is not clamped. With a long frame or a high smoothing factor
//! the step overshoots the target; visual tuning depends on this.

use serde::Deserialize;
use xpvr_core::{Transform, XpvrError, XpvrResult};

/// Upper bound of the smoothing factor
pub const MAX_SMOOTHING_FACTOR: u8 = 3;

/// Upper bound of the applied distance, in metres
pub const MAX_APPLIED_DISTANCE: f32 = 3.0;

/// Per-instance smoothing parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// 0: no movement while within range, higher: faster convergence
    pub smoothing_factor: u8,
    /// Maximum distance (metres) at which interpolation applies
    pub applied_distance: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 2,
            applied_distance: 1.0,
        }
    }
}

impl SmoothingConfig {
    /// Validated constructor
    pub fn new(smoothing_factor: u8, applied_distance: f32) -> XpvrResult<Self> {
        let config = Self {
            smoothing_factor,
            applied_distance,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> XpvrResult<()> {
        if self.smoothing_factor > MAX_SMOOTHING_FACTOR {
            return Err(XpvrError::InvalidConfig(format!(
                "smoothing_factor {} outside 0..={}",
                self.smoothing_factor, MAX_SMOOTHING_FACTOR
            )));
        }
        if !(0.0..=MAX_APPLIED_DISTANCE).contains(&self.applied_distance) {
            return Err(XpvrError::InvalidConfig(format!(
                "applied_distance {} outside 0..={}",
                self.applied_distance, MAX_APPLIED_DISTANCE
            )));
        }
        Ok(())
    }

    /// Interpolation factor for a frame of `frame_delta` seconds
    #[inline]
    pub fn factor(&self, frame_delta: f32) -> f32 {
        frame_delta * self.smoothing_factor as f32
    }
}

/// Target written by the receiver, display advanced by the smoother
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothingState {
    target: Transform,
    display: Transform,
}

impl SmoothingState {
    pub fn new(initial: Transform) -> Self {
        Self {
            target: initial,
            display: initial,
        }
    }

    pub fn target(&self) -> &Transform {
        &self.target
    }

    pub fn display(&self) -> &Transform {
        &self.display
    }

    /// Overwrite the target; the display is left to the smoother
    pub fn set_target(&mut self, target: Transform) {
        self.target = target;
    }

    /// Distance between displayed and target position
    pub fn distance(&self) -> f32 {
        self.display.position.distance(&self.target.position)
    }
}

/// What one smoothing step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothStep {
    Interpolated,
    Snapped,
}

/// Advances a `SmoothingState` once per frame
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionSmoother {
    config: SmoothingConfig,
}

impl MotionSmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SmoothingConfig {
        &self.config
    }

    /// Move the displayed transform toward the target
    pub fn step(&self, state: &mut SmoothingState, frame_delta: f32) -> SmoothStep {
        if state.distance() < self.config.applied_distance {
            let t = self.config.factor(frame_delta);
            state.display = state.display.lerp(&state.target, t);
            SmoothStep::Interpolated
        } else {
            state.display = state.target;
            SmoothStep::Snapped
        }
    }
}
