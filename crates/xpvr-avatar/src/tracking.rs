//! Tracked devices - the local pose source
//!
//! Input polling lives outside this crate. A `TrackingSource` hands the
//! publisher one sample of the headset and controllers per call.

use xpvr_core::{AvatarVariant, Hand, Transform, TriggerState, XpvrError, XpvrResult};

/// Tracked device identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedDevice {
    Head,
    LeftController,
    RightController,
}

impl TrackedDevice {
    pub fn name(self) -> &'static str {
        match self {
            TrackedDevice::Head => "head",
            TrackedDevice::LeftController => "left controller",
            TrackedDevice::RightController => "right controller",
        }
    }

    /// Devices an avatar variant needs bound before it can publish
    pub fn required_by(variant: AvatarVariant) -> &'static [TrackedDevice] {
        if variant.tracks_hands() {
            &[
                TrackedDevice::Head,
                TrackedDevice::LeftController,
                TrackedDevice::RightController,
            ]
        } else {
            &[TrackedDevice::Head]
        }
    }
}

/// One controller's pose and buttons
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerSample {
    pub transform: Transform,
    pub triggers: TriggerState,
}

/// Pose of every tracked device at one instant
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceSample {
    pub head: Transform,
    pub left: Option<ControllerSample>,
    pub right: Option<ControllerSample>,
}

impl DeviceSample {
    pub fn head_only(head: Transform) -> Self {
        Self {
            head,
            left: None,
            right: None,
        }
    }

    pub fn controller(&self, hand: Hand) -> Option<&ControllerSample> {
        match hand {
            Hand::Left => self.left.as_ref(),
            Hand::Right => self.right.as_ref(),
        }
    }

    /// Both controllers, or the first one missing
    pub fn controllers(&self) -> XpvrResult<(ControllerSample, ControllerSample)> {
        let left = self.left.ok_or(XpvrError::MissingTrackedDevice(
            TrackedDevice::LeftController.name(),
        ))?;
        let right = self.right.ok_or(XpvrError::MissingTrackedDevice(
            TrackedDevice::RightController.name(),
        ))?;
        Ok((left, right))
    }
}

/// Source of local tracked-device poses
pub trait TrackingSource {
    /// Is the device available for binding?
    fn has_device(&self, device: TrackedDevice) -> bool;

    /// Current pose of every device
    fn sample(&mut self) -> XpvrResult<DeviceSample>;
}

/// Check that `source` provides everything `variant` publishes
pub fn check_devices(source: &dyn TrackingSource, variant: AvatarVariant) -> XpvrResult<()> {
    for device in TrackedDevice::required_by(variant) {
        if !source.has_device(*device) {
            return Err(XpvrError::MissingTrackedDevice(device.name()));
        }
    }
    Ok(())
}

/// Tracking source that always reports the same sample
#[derive(Debug, Clone, Default)]
pub struct FixedTracking {
    pub sample: DeviceSample,
}

impl FixedTracking {
    pub fn new(sample: DeviceSample) -> Self {
        Self { sample }
    }
}

impl TrackingSource for FixedTracking {
    fn has_device(&self, device: TrackedDevice) -> bool {
        match device {
            TrackedDevice::Head => true,
            TrackedDevice::LeftController => self.sample.left.is_some(),
            TrackedDevice::RightController => self.sample.right.is_some(),
        }
    }

    fn sample(&mut self) -> XpvrResult<DeviceSample> {
        Ok(self.sample)
    }
}
