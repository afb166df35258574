//! Identity types for avatar replication
//!
//! Participants are numbered by the room service; views are the networked
//! objects a participant owns inside a scene.

use std::fmt;

/// Participant identity - one per connected user in a room
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    pub const NONE: ParticipantId = ParticipantId(0);

    #[inline]
    pub fn new(id: u32) -> Self {
        ParticipantId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        ParticipantId(u32::from_le_bytes(bytes))
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Participant({})", self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Networked view identity - scopes a synchronization channel
///
/// Format: \[participant:32\]\[slot:16\] in the low 48 bits. Each
/// participant owns exactly one avatar view per scene, at slot 1.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ViewId(pub u64);

impl ViewId {
    /// Slot used by avatar views
    pub const AVATAR_SLOT: u16 = 1;

    #[inline]
    pub fn new(id: u64) -> Self {
        ViewId(id)
    }

    /// The avatar view owned by a participant
    #[inline]
    pub fn avatar_of(participant: ParticipantId) -> Self {
        Self::from_parts(participant, Self::AVATAR_SLOT)
    }

    #[inline]
    pub fn from_parts(participant: ParticipantId, slot: u16) -> Self {
        ViewId(((participant.0 as u64) << 16) | slot as u64)
    }

    #[inline]
    pub fn owner(self) -> ParticipantId {
        ParticipantId((self.0 >> 16) as u32)
    }

    #[inline]
    pub fn slot(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "View({}:{})", self.owner().0, self.slot())
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner().0, self.slot())
    }
}
