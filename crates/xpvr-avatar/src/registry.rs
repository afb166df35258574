//! Instance registries
//!
//! - `LocalInstanceRegistry`: which avatar is "mine", set once when the local
//!   instance is created and cleared at teardown. A process-wide registry
//!   is available through `local_registry()`.
//! - `Roster`: every avatar instance of the current scene, one per
//!   participant.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::debug;
use xpvr_core::{AvatarVariant, ParticipantId, ViewId, XpvrError, XpvrResult};

use crate::AvatarInstance;

/// Lookup record for the local avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalAvatarHandle {
    pub participant: ParticipantId,
    pub view: ViewId,
    pub variant: AvatarVariant,
}

impl LocalAvatarHandle {
    pub fn of(instance: &AvatarInstance) -> Self {
        Self {
            participant: instance.participant(),
            view: instance.view(),
            variant: instance.variant(),
        }
    }
}

/// Set-once slot for the local avatar
#[derive(Debug)]
pub struct LocalInstanceRegistry {
    slot: RwLock<Option<LocalAvatarHandle>>,
}

impl Default for LocalInstanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalInstanceRegistry {
    pub const fn new() -> Self {
        Self {
            slot: parking_lot::const_rwlock(None),
        }
    }

    /// Record the local avatar; fails if one is already registered
    pub fn register(&self, handle: LocalAvatarHandle) -> XpvrResult<()> {
        let mut slot = self.slot.write();
        if let Some(existing) = *slot {
            return Err(XpvrError::LocalAlreadyRegistered(existing.participant));
        }
        *slot = Some(handle);
        debug!(participant = %handle.participant, "local avatar registered");
        Ok(())
    }

    /// The local avatar, if one exists
    pub fn get(&self) -> Option<LocalAvatarHandle> {
        *self.slot.read()
    }

    pub fn is_local(&self, participant: ParticipantId) -> bool {
        self.get().map_or(false, |h| h.participant == participant)
    }

    /// Clear the slot if it belongs to `participant`
    pub fn clear(&self, participant: ParticipantId) -> bool {
        let mut slot = self.slot.write();
        match *slot {
            Some(h) if h.participant == participant => {
                *slot = None;
                debug!(%participant, "local avatar cleared");
                true
            }
            _ => false,
        }
    }
}

static LOCAL_REGISTRY: LocalInstanceRegistry = LocalInstanceRegistry::new();

/// The process-wide local avatar registry
pub fn local_registry() -> &'static LocalInstanceRegistry {
    &LOCAL_REGISTRY
}

/// The process-wide local avatar, if any
pub fn local_avatar() -> Option<LocalAvatarHandle> {
    LOCAL_REGISTRY.get()
}

/// Avatar instances of one scene
#[derive(Debug, Default)]
pub struct Roster {
    instances: BTreeMap<ParticipantId, AvatarInstance>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance; a participant may appear only once
    pub fn insert(&mut self, instance: AvatarInstance) -> XpvrResult<()> {
        let participant = instance.participant();
        if self.instances.contains_key(&participant) {
            return Err(XpvrError::DuplicateParticipant(participant));
        }
        self.instances.insert(participant, instance);
        Ok(())
    }

    /// Destroy and remove a participant's instance
    pub fn remove(&mut self, participant: ParticipantId) -> XpvrResult<AvatarInstance> {
        let mut instance = self
            .instances
            .remove(&participant)
            .ok_or(XpvrError::ParticipantNotFound(participant))?;
        instance.destroy();
        Ok(instance)
    }

    pub fn get(&self, participant: ParticipantId) -> Option<&AvatarInstance> {
        self.instances.get(&participant)
    }

    pub fn get_mut(&mut self, participant: ParticipantId) -> Option<&mut AvatarInstance> {
        self.instances.get_mut(&participant)
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.instances.contains_key(&participant)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Remote instances in participant order
    pub fn remotes_mut(&mut self) -> impl Iterator<Item = &mut AvatarInstance> {
        self.instances.values_mut().filter(|i| !i.is_local())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AvatarInstance> {
        self.instances.values()
    }

    /// Destroy every instance
    pub fn clear(&mut self) -> usize {
        let count = self.instances.len();
        for instance in self.instances.values_mut() {
            instance.destroy();
        }
        self.instances.clear();
        count
    }
}
