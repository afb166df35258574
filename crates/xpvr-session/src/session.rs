//! Avatar session driver
//!
//! One `AvatarSession` per process and scene. It owns the roster, the
//! channel and the local instance, and is driven by the host:
//!
//! - `on_sync_tick()` at the network rate
//! - `on_frame(dt)` once per rendered frame
//! - or `update(dt)`, which runs the sync ticks due for `dt` and then a frame

use tracing::{debug, info, trace, warn};
use xpvr_avatar::{
    local_registry, AvatarFrame, AvatarInstance, LocalAvatarHandle, LocalInstanceRegistry,
    Ownership, Roster, SmoothStep, TrackingSource,
};
use xpvr_core::{AvatarVariant, ParticipantId, XpvrError, XpvrResult};

use crate::{SessionConfig, SyncChannel};

/// Upper bound on sync ticks run by a single `update`
pub const MAX_CATCH_UP_TICKS: u32 = 4;

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub ticks: u64,
    pub frames: u64,
    pub snapshots_sent: u64,
    pub snapshots_received: u64,
    /// Inbound snapshots rejected by the decoder
    pub protocol_errors: u64,
    /// Inbound snapshots with no remote instance to apply them to
    pub dropped_snapshots: u64,
    /// Sync ticks on which the local snapshot could not be built
    pub publish_errors: u64,
    /// Frames on which local input could not be sampled
    pub input_errors: u64,
    pub interpolated_steps: u64,
    pub snapped_steps: u64,
}

/// Converts frame deltas into due sync ticks
#[derive(Debug, Clone, PartialEq)]
pub struct SyncClock {
    interval: f32,
    accumulated: f32,
}

impl SyncClock {
    pub fn new(interval_secs: f32) -> Self {
        Self {
            interval: interval_secs,
            accumulated: 0.0,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Advance by `dt` seconds and return the ticks now due.
    ///
    /// At most `MAX_CATCH_UP_TICKS` are returned; the backlog beyond that
    /// is dropped.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if self.interval.is_nan() || self.interval <= 0.0 || !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.accumulated += dt;
        let due = (self.accumulated / self.interval).floor();
        if due >= MAX_CATCH_UP_TICKS as f32 {
            self.accumulated = 0.0;
            return MAX_CATCH_UP_TICKS;
        }
        self.accumulated -= due * self.interval;
        due as u32
    }
}

/// Replication driver for one scene
pub struct AvatarSession<C: SyncChannel> {
    config: SessionConfig,
    channel: C,
    registry: &'static LocalInstanceRegistry,
    roster: Roster,
    local: Option<ParticipantId>,
    clock: SyncClock,
    stats: SessionStats,
}

impl<C: SyncChannel> AvatarSession<C> {
    /// Session using the process-wide local registry
    pub fn new(config: SessionConfig, channel: C) -> XpvrResult<Self> {
        Self::with_registry(config, channel, local_registry())
    }

    pub fn with_registry(
        config: SessionConfig,
        channel: C,
        registry: &'static LocalInstanceRegistry,
    ) -> XpvrResult<Self> {
        config.validate()?;
        let clock = SyncClock::new(config.tick_interval().as_secs_f32());
        Ok(Self {
            config,
            channel,
            registry,
            roster: Roster::new(),
            local: None,
            clock,
            stats: SessionStats::default(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn local_participant(&self) -> Option<ParticipantId> {
        self.local
    }

    pub fn instance(&self, participant: ParticipantId) -> Option<&AvatarInstance> {
        self.roster.get(participant)
    }

    /// Instantiate this process's avatar with the configured variant
    pub fn spawn_local(
        &mut self,
        participant: ParticipantId,
        tracking: Box<dyn TrackingSource>,
    ) -> XpvrResult<()> {
        if self.roster.contains(participant) {
            return Err(XpvrError::DuplicateParticipant(participant));
        }

        let instance = AvatarInstance::create(
            participant,
            self.config.variant,
            Ownership::Local {
                tracking,
                encoding: self.config.hand_encoding,
            },
        )?;
        self.registry.register(LocalAvatarHandle::of(&instance))?;
        self.roster.insert(instance)?;
        self.local = Some(participant);

        info!(%participant, variant = %self.config.variant, "local avatar spawned");
        Ok(())
    }

    /// Instantiate another participant's avatar
    pub fn spawn_remote(
        &mut self,
        participant: ParticipantId,
        variant: AvatarVariant,
    ) -> XpvrResult<()> {
        let instance = AvatarInstance::create(
            participant,
            variant,
            Ownership::Remote {
                smoothing: self.config.smoothing,
            },
        )?;
        self.roster.insert(instance)?;

        info!(%participant, %variant, "remote avatar spawned");
        Ok(())
    }

    /// Remove a participant's avatar immediately
    pub fn despawn(&mut self, participant: ParticipantId) -> XpvrResult<()> {
        self.roster.remove(participant)?;
        if self.local == Some(participant) {
            self.registry.clear(participant);
            self.local = None;
        }

        info!(%participant, "avatar despawned");
        Ok(())
    }

    /// Sync tick: apply inbound snapshots, then publish the local one.
    ///
    /// A snapshot that fails to decode is logged and counted; the remote
    /// keeps its previous target. A local snapshot that cannot be built,
    /// e.g. a controller lost after binding, is logged and counted and
    /// nothing is sent this tick. Only channel failures are returned.
    pub fn on_sync_tick(&mut self) -> XpvrResult<()> {
        self.stats.ticks += 1;

        for (view, payload) in self.channel.drain() {
            let owner = view.owner();
            let Some(instance) = self
                .roster
                .get_mut(owner)
                .filter(|i| !i.is_local() && i.view() == view)
            else {
                debug!(?view, "snapshot for unknown view dropped");
                self.stats.dropped_snapshots += 1;
                continue;
            };

            match instance.receive(payload) {
                Ok(()) => self.stats.snapshots_received += 1,
                Err(e) if e.is_protocol() => {
                    warn!(participant = %owner, error = %e, "rejected snapshot");
                    self.stats.protocol_errors += 1;
                }
                Err(e) => {
                    warn!(participant = %owner, error = %e, "snapshot not applied");
                    self.stats.dropped_snapshots += 1;
                }
            }
        }

        if let Some(participant) = self.local {
            let instance = self
                .roster
                .get_mut(participant)
                .ok_or(XpvrError::ParticipantNotFound(participant))?;
            match instance.publish() {
                Ok(payload) => {
                    self.channel.send(instance.view(), payload)?;
                    self.stats.snapshots_sent += 1;
                }
                Err(e) => {
                    warn!(%participant, error = %e, "local snapshot not published");
                    self.stats.publish_errors += 1;
                }
            }
        }

        Ok(())
    }

    /// Render frame: hand-pose input for the local avatar, smoothing for
    /// every remote one. Returns the remote frames in participant order.
    pub fn on_frame(&mut self, frame_delta: f32) -> XpvrResult<Vec<AvatarFrame>> {
        self.stats.frames += 1;

        if let Some(participant) = self.local {
            if let Some(instance) = self.roster.get_mut(participant) {
                if let Err(e) = instance.on_frame(frame_delta) {
                    warn!(%participant, error = %e, "local input not sampled");
                    self.stats.input_errors += 1;
                }
            }
        }

        let mut frames = Vec::with_capacity(self.roster.len());
        for instance in self.roster.remotes_mut() {
            if let Some(frame) = instance.on_frame(frame_delta)? {
                match frame.step {
                    SmoothStep::Interpolated => self.stats.interpolated_steps += 1,
                    SmoothStep::Snapped => self.stats.snapped_steps += 1,
                }
                frames.push(frame);
            }
        }

        trace!(remotes = frames.len(), frame_delta, "frame");
        Ok(frames)
    }

    /// Run the sync ticks due for `dt`, then one render frame
    pub fn update(&mut self, dt: f32) -> XpvrResult<Vec<AvatarFrame>> {
        for _ in 0..self.clock.advance(dt) {
            self.on_sync_tick()?;
        }
        self.on_frame(dt)
    }

    /// Destroy every instance and release the local registry slot
    pub fn teardown(&mut self) {
        let destroyed = self.roster.clear();
        if let Some(participant) = self.local.take() {
            self.registry.clear(participant);
        }
        if destroyed > 0 {
            info!(destroyed, "session torn down");
        }
    }
}

impl<C: SyncChannel> Drop for AvatarSession<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
