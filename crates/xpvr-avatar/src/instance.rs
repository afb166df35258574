//! Avatar instance lifecycle
//!
//! ```text
//! Uninitialized ──bind(Local)──▶ LocalBound  ──┐
//!               └─bind(Remote)─▶ RemoteBound ──┴─first tick/frame─▶ Active ──▶ Destroyed
//! ```
//!
//! Ownership is decided once, at binding, and never re-evaluated. Only a
//! local instance publishes; only a remote instance receives and smooths.

use std::fmt;

use bytes::Bytes;
use tracing::debug;
use xpvr_core::{
    AvatarVariant, Hand, HandEncoding, HandPose, HandVisuals, ParticipantId, Transform, ViewId,
    XpvrError, XpvrResult,
};

use crate::{
    check_devices, HandsSnapshot, MotionSmoother, SmoothStep, SmoothingConfig, SmoothingState,
    StatePublisher, StateReceiver, TrackingSource,
};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    Uninitialized,
    LocalBound,
    RemoteBound,
    Active,
    Destroyed,
}

/// How an instance is bound
pub enum Ownership {
    /// This process's participant
    Local {
        tracking: Box<dyn TrackingSource>,
        encoding: HandEncoding,
    },
    /// Another participant
    Remote { smoothing: SmoothingConfig },
}

impl fmt::Debug for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ownership::Local { encoding, .. } => f
                .debug_struct("Local")
                .field("encoding", encoding)
                .finish_non_exhaustive(),
            Ownership::Remote { smoothing } => f
                .debug_struct("Remote")
                .field("smoothing", smoothing)
                .finish(),
        }
    }
}

/// Local-only fields, bound once
pub struct LocalAvatar {
    publisher: StatePublisher,
    tracking: Box<dyn TrackingSource>,
}

impl LocalAvatar {
    pub fn publisher(&self) -> &StatePublisher {
        &self.publisher
    }
}

/// Remote-only fields
#[derive(Debug, Clone)]
pub struct RemoteAvatar {
    receiver: StateReceiver,
    smoother: MotionSmoother,
    smoothing: SmoothingState,
    hands: Option<HandsSnapshot>,
}

impl RemoteAvatar {
    pub fn receiver(&self) -> &StateReceiver {
        &self.receiver
    }

    pub fn smoothing(&self) -> &SmoothingState {
        &self.smoothing
    }

    /// Controller transforms and poses as last received
    pub fn hands(&self) -> Option<&HandsSnapshot> {
        self.hands.as_ref()
    }
}

enum Role {
    Local(LocalAvatar),
    Remote(RemoteAvatar),
}

/// One hand of a rendered remote avatar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFrame {
    pub transform: Transform,
    pub visuals: HandVisuals,
}

/// What the renderer draws for a remote avatar this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarFrame {
    pub participant: ParticipantId,
    pub head: Transform,
    pub step: SmoothStep,
    pub left: Option<HandFrame>,
    pub right: Option<HandFrame>,
}

impl AvatarFrame {
    pub fn hand(&self, hand: Hand) -> Option<&HandFrame> {
        match hand {
            Hand::Left => self.left.as_ref(),
            Hand::Right => self.right.as_ref(),
        }
    }
}

/// A participant's avatar in the current scene
pub struct AvatarInstance {
    participant: ParticipantId,
    view: ViewId,
    variant: AvatarVariant,
    state: InstanceState,
    role: Option<Role>,
}

impl fmt::Debug for AvatarInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarInstance")
            .field("participant", &self.participant)
            .field("view", &self.view)
            .field("variant", &self.variant)
            .field("state", &self.state)
            .finish()
    }
}

impl AvatarInstance {
    /// Unbound instance
    pub fn new(participant: ParticipantId, variant: AvatarVariant) -> Self {
        Self {
            participant,
            view: ViewId::avatar_of(participant),
            variant,
            state: InstanceState::Uninitialized,
            role: None,
        }
    }

    /// Instantiate and bind in one step
    pub fn create(
        participant: ParticipantId,
        variant: AvatarVariant,
        ownership: Ownership,
    ) -> XpvrResult<Self> {
        let mut instance = Self::new(participant, variant);
        instance.bind(ownership)?;
        Ok(instance)
    }

    /// Decide ownership. Allowed exactly once.
    pub fn bind(&mut self, ownership: Ownership) -> XpvrResult<()> {
        if self.state != InstanceState::Uninitialized {
            return Err(XpvrError::InvalidTransition(format!(
                "bind from {:?}",
                self.state
            )));
        }

        match ownership {
            Ownership::Local { tracking, encoding } => {
                check_devices(tracking.as_ref(), self.variant)?;
                self.role = Some(Role::Local(LocalAvatar {
                    publisher: StatePublisher::new(self.variant, encoding),
                    tracking,
                }));
                self.state = InstanceState::LocalBound;
            }
            Ownership::Remote { smoothing } => {
                smoothing.validate()?;
                self.role = Some(Role::Remote(RemoteAvatar {
                    receiver: StateReceiver::new(self.variant),
                    smoother: MotionSmoother::new(smoothing),
                    smoothing: SmoothingState::default(),
                    hands: None,
                }));
                self.state = InstanceState::RemoteBound;
            }
        }

        debug!(
            participant = %self.participant,
            variant = %self.variant,
            state = ?self.state,
            "avatar bound"
        );
        Ok(())
    }

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn variant(&self) -> AvatarVariant {
        self.variant
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn is_local(&self) -> bool {
        matches!(self.role, Some(Role::Local(_)))
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == InstanceState::Destroyed
    }

    pub fn local(&self) -> Option<&LocalAvatar> {
        match &self.role {
            Some(Role::Local(local)) => Some(local),
            _ => None,
        }
    }

    pub fn remote(&self) -> Option<&RemoteAvatar> {
        match &self.role {
            Some(Role::Remote(remote)) => Some(remote),
            _ => None,
        }
    }

    /// Sync tick on the local instance: sample tracking and encode
    pub fn publish(&mut self) -> XpvrResult<Bytes> {
        let local = self.local_mut()?;
        let sample = local.tracking.sample()?;
        let bytes = local.publisher.publish(&sample)?;
        self.activate();
        Ok(bytes)
    }

    /// Sync tick on a remote instance: apply an inbound snapshot
    pub fn receive(&mut self, bytes: Bytes) -> XpvrResult<()> {
        let remote = self.remote_mut()?;
        remote
            .receiver
            .receive(bytes, &mut remote.smoothing, &mut remote.hands)?;
        self.activate();
        Ok(())
    }

    /// Render frame.
    ///
    /// Local: map controller triggers to hand poses, nothing to draw.
    /// Remote: advance smoothing and return what to draw.
    pub fn on_frame(&mut self, frame_delta: f32) -> XpvrResult<Option<AvatarFrame>> {
        self.check_alive()?;
        let participant = self.participant;

        let frame = match &mut self.role {
            Some(Role::Local(local)) => {
                let sample = local.tracking.sample()?;
                local.publisher.update_hand_poses(&sample);
                None
            }
            Some(Role::Remote(remote)) => {
                let step = remote.smoother.step(&mut remote.smoothing, frame_delta);
                let hand_frame = |transform: Transform, pose: HandPose| HandFrame {
                    transform,
                    visuals: pose.visuals(),
                };
                Some(AvatarFrame {
                    participant,
                    head: *remote.smoothing.display(),
                    step,
                    left: remote.hands.map(|h| hand_frame(h.left, h.poses.left)),
                    right: remote.hands.map(|h| hand_frame(h.right, h.poses.right)),
                })
            }
            None => {
                return Err(XpvrError::InvalidTransition(
                    "frame on unbound instance".into(),
                ))
            }
        };

        self.activate();
        Ok(frame)
    }

    /// Remove from the scene. Further operations fail.
    pub fn destroy(&mut self) {
        if self.state != InstanceState::Destroyed {
            debug!(participant = %self.participant, "avatar destroyed");
        }
        self.state = InstanceState::Destroyed;
        self.role = None;
    }

    fn activate(&mut self) {
        if matches!(
            self.state,
            InstanceState::LocalBound | InstanceState::RemoteBound
        ) {
            self.state = InstanceState::Active;
        }
    }

    fn check_alive(&self) -> XpvrResult<()> {
        if self.state == InstanceState::Destroyed {
            return Err(XpvrError::Destroyed);
        }
        Ok(())
    }

    fn local_mut(&mut self) -> XpvrResult<&mut LocalAvatar> {
        self.check_alive()?;
        match &mut self.role {
            Some(Role::Local(local)) => Ok(local),
            _ => Err(XpvrError::NotLocal),
        }
    }

    fn remote_mut(&mut self) -> XpvrResult<&mut RemoteAvatar> {
        self.check_alive()?;
        match &mut self.role {
            Some(Role::Remote(remote)) => Ok(remote),
            _ => Err(XpvrError::NotRemote),
        }
    }
}
