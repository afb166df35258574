//! Hand poses - discrete gesture state per controller
//!
//! A hand is always in exactly one pose. The wire's legacy form carries
//! three booleans per hand and the renderer toggles three meshes, but the
//! data model holds a single enum so the invariant cannot be broken.

use crate::{XpvrError, XpvrResult};

/// Which hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn all() -> [Hand; 2] {
        [Hand::Left, Hand::Right]
    }
}

/// Discrete hand gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum HandPose {
    #[default]
    Normal = 0,
    ThumbsUp = 1,
    FingerPoint = 2,
}

impl HandPose {
    /// Derive the pose from controller triggers.
    ///
    /// Grip and index together show a thumbs up, grip alone points a
    /// finger, anything else is the resting pose.
    pub fn from_triggers(triggers: TriggerState) -> Self {
        match (triggers.grip, triggers.index) {
            (true, true) => HandPose::ThumbsUp,
            (true, false) => HandPose::FingerPoint,
            _ => HandPose::Normal,
        }
    }

    /// Three mutually exclusive flags: (normal, thumbs_up, finger_point)
    pub fn to_flags(self) -> [bool; 3] {
        [
            self == HandPose::Normal,
            self == HandPose::ThumbsUp,
            self == HandPose::FingerPoint,
        ]
    }

    /// Parse the legacy three-flag form; exactly one flag must be set
    pub fn from_flags(flags: [bool; 3]) -> XpvrResult<Self> {
        match flags {
            [true, false, false] => Ok(HandPose::Normal),
            [false, true, false] => Ok(HandPose::ThumbsUp),
            [false, false, true] => Ok(HandPose::FingerPoint),
            _ => Err(XpvrError::InvalidHandFlags(flags)),
        }
    }

    /// 2-bit compact code
    #[inline]
    pub fn to_code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> XpvrResult<Self> {
        match code {
            0 => Ok(HandPose::Normal),
            1 => Ok(HandPose::ThumbsUp),
            2 => Ok(HandPose::FingerPoint),
            other => Err(XpvrError::InvalidHandCode(other)),
        }
    }

    /// Rendering form of this pose
    pub fn visuals(self) -> HandVisuals {
        let [normal, thumbs_up, finger_point] = self.to_flags();
        HandVisuals {
            normal,
            thumbs_up,
            finger_point,
        }
    }
}

/// Controller trigger sample for one hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerState {
    /// Side grip button
    pub grip: bool,
    /// Front index trigger
    pub index: bool,
}

impl TriggerState {
    pub fn new(grip: bool, index: bool) -> Self {
        Self { grip, index }
    }
}

/// Enable state of the three pose meshes of one hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandVisuals {
    pub normal: bool,
    pub thumbs_up: bool,
    pub finger_point: bool,
}

impl HandVisuals {
    pub fn enabled_count(&self) -> usize {
        [self.normal, self.thumbs_up, self.finger_point]
            .iter()
            .filter(|v| **v)
            .count()
    }
}

/// Pose of both hands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandPoses {
    pub left: HandPose,
    pub right: HandPose,
}

impl HandPoses {
    pub fn new(left: HandPose, right: HandPose) -> Self {
        Self { left, right }
    }

    pub fn get(&self, hand: Hand) -> HandPose {
        match hand {
            Hand::Left => self.left,
            Hand::Right => self.right,
        }
    }

    pub fn set(&mut self, hand: Hand, pose: HandPose) {
        match hand {
            Hand::Left => self.left = pose,
            Hand::Right => self.right = pose,
        }
    }
}
