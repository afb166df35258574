//! In-memory room service
//!
//! `LoopbackHub` plays the matchmaking server for any number of clients in
//! one process. Delivery is immediate, reliable and ordered: a snapshot
//! sent by one member is queued for every other member of the room and
//! picked up at their next sync tick.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;
use xpvr_core::{AvatarVariant, ParticipantId, ViewId, XpvrError, XpvrResult};
use xpvr_session::{RoomInfo, RoomOptions, SessionBootstrap, SyncChannel};

#[derive(Debug)]
struct RoomState {
    name: String,
    game_version: String,
    max_players: u8,
    scene: Option<String>,
    /// Members and the avatar variant each has instantiated
    members: BTreeMap<ParticipantId, Option<AvatarVariant>>,
}

impl RoomState {
    fn info(&self, local: ParticipantId) -> RoomInfo {
        RoomInfo {
            name: self.name.clone(),
            local,
            player_count: self.members.len() as u8,
            max_players: self.max_players,
        }
    }

    fn is_open_for(&self, game_version: &str) -> bool {
        self.game_version == game_version && self.members.len() < self.max_players as usize
    }
}

#[derive(Debug, Default)]
struct HubState {
    rooms: Vec<RoomState>,
    mailboxes: BTreeMap<ParticipantId, VecDeque<(ViewId, Bytes)>>,
    next_participant: u32,
    next_room: u32,
    delivered: u64,
}

impl HubState {
    fn room_mut(&mut self, name: &str) -> XpvrResult<&mut RoomState> {
        self.rooms
            .iter_mut()
            .find(|r| r.name == name)
            .ok_or_else(|| XpvrError::Channel(format!("room {name} closed")))
    }

    fn admit(&mut self) -> ParticipantId {
        self.next_participant += 1;
        let participant = ParticipantId::new(self.next_participant);
        self.mailboxes.insert(participant, VecDeque::new());
        participant
    }
}

/// Shared in-memory room service
#[derive(Debug, Clone, Default)]
pub struct LoopbackHub {
    state: Arc<Mutex<HubState>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new, disconnected client
    pub fn client(&self) -> LoopbackClient {
        LoopbackClient {
            hub: self.clone(),
            game_version: None,
            membership: None,
        }
    }

    pub fn room_count(&self) -> usize {
        self.state.lock().rooms.len()
    }

    /// Scene loaded in a room, if any
    pub fn scene(&self, room: &str) -> Option<String> {
        let state = self.state.lock();
        state
            .rooms
            .iter()
            .find(|r| r.name == room)
            .and_then(|r| r.scene.clone())
    }

    pub fn members(&self, room: &str) -> Vec<ParticipantId> {
        let state = self.state.lock();
        state
            .rooms
            .iter()
            .find(|r| r.name == room)
            .map(|r| r.members.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Snapshots handed to mailboxes so far
    pub fn delivered(&self) -> u64 {
        self.state.lock().delivered
    }
}

/// One client of the hub
#[derive(Debug)]
pub struct LoopbackClient {
    hub: LoopbackHub,
    game_version: Option<String>,
    membership: Option<(String, ParticipantId)>,
}

impl LoopbackClient {
    pub fn participant(&self) -> Option<ParticipantId> {
        self.membership.as_ref().map(|(_, p)| *p)
    }

    pub fn room_name(&self) -> Option<&str> {
        self.membership.as_ref().map(|(name, _)| name.as_str())
    }

    /// Channel bound to this client's room membership
    pub fn channel(&self) -> XpvrResult<LoopbackChannel> {
        let (room, participant) = self.membership.clone().ok_or(XpvrError::NotConnected)?;
        Ok(LoopbackChannel {
            hub: self.hub.clone(),
            room,
            participant,
        })
    }

    /// Announce the local avatar to the room
    pub fn instantiate(&self, variant: AvatarVariant) -> XpvrResult<()> {
        let (room, participant) = self.membership.as_ref().ok_or(XpvrError::NotConnected)?;
        let mut state = self.hub.state.lock();
        let room = state.room_mut(room)?;
        room.members.insert(*participant, Some(variant));
        Ok(())
    }

    /// Other members with an instantiated avatar
    pub fn peers(&self) -> Vec<(ParticipantId, AvatarVariant)> {
        let Some((room, participant)) = self.membership.as_ref() else {
            return Vec::new();
        };
        let mut state = self.hub.state.lock();
        let Ok(room) = state.room_mut(room) else {
            return Vec::new();
        };
        room.members
            .iter()
            .filter(|(p, _)| *p != participant)
            .filter_map(|(p, v)| v.map(|v| (*p, v)))
            .collect()
    }

    /// Leave the room; an empty room is closed
    pub fn leave(&mut self) {
        let Some((room, participant)) = self.membership.take() else {
            return;
        };
        let mut state = self.hub.state.lock();
        state.mailboxes.remove(&participant);
        if let Ok(r) = state.room_mut(&room) {
            r.members.remove(&participant);
        }
        state.rooms.retain(|r| !r.members.is_empty());
        debug!(%participant, %room, "left room");
    }

    fn require_connected(&self) -> XpvrResult<&str> {
        self.game_version.as_deref().ok_or(XpvrError::NotConnected)
    }

    fn require_outside_room(&self) -> XpvrResult<()> {
        if self.membership.is_some() {
            return Err(XpvrError::InvalidTransition("already in a room".into()));
        }
        Ok(())
    }
}

impl SessionBootstrap for LoopbackClient {
    fn is_connected(&self) -> bool {
        self.game_version.is_some()
    }

    fn connect(&mut self, game_version: &str) -> XpvrResult<()> {
        self.game_version = Some(game_version.to_string());
        Ok(())
    }

    fn join_random_room(&mut self) -> XpvrResult<RoomInfo> {
        let game_version = self.require_connected()?.to_string();
        self.require_outside_room()?;

        let mut state = self.hub.state.lock();
        let index = state
            .rooms
            .iter()
            .position(|r| r.is_open_for(&game_version))
            .ok_or(XpvrError::NoRoomAvailable)?;
        let participant = state.admit();
        let room = &mut state.rooms[index];
        room.members.insert(participant, None);

        let info = room.info(participant);
        drop(state);
        self.membership = Some((info.name.clone(), participant));
        Ok(info)
    }

    fn create_room(&mut self, options: &RoomOptions) -> XpvrResult<RoomInfo> {
        options.validate()?;
        let game_version = self.require_connected()?.to_string();
        self.require_outside_room()?;

        let mut state = self.hub.state.lock();
        state.next_room += 1;
        let participant = state.admit();
        let room = RoomState {
            name: format!("room-{}", state.next_room),
            game_version,
            max_players: options.max_players,
            scene: None,
            members: BTreeMap::from([(participant, None)]),
        };
        let info = room.info(participant);
        state.rooms.push(room);
        drop(state);

        self.membership = Some((info.name.clone(), participant));
        Ok(info)
    }

    fn load_scene(&mut self, scene: &str) -> XpvrResult<()> {
        let (room, _) = self.membership.as_ref().ok_or(XpvrError::NotConnected)?;
        let mut state = self.hub.state.lock();
        state.room_mut(room)?.scene = Some(scene.to_string());
        Ok(())
    }
}

/// Room-wide broadcast channel of one member
#[derive(Debug, Clone)]
pub struct LoopbackChannel {
    hub: LoopbackHub,
    room: String,
    participant: ParticipantId,
}

impl LoopbackChannel {
    pub fn participant(&self) -> ParticipantId {
        self.participant
    }
}

impl SyncChannel for LoopbackChannel {
    fn send(&mut self, view: ViewId, payload: Bytes) -> XpvrResult<()> {
        let mut guard = self.hub.state.lock();
        let state = &mut *guard;
        let room = state
            .rooms
            .iter()
            .find(|r| r.name == self.room)
            .ok_or_else(|| XpvrError::Channel(format!("room {} closed", self.room)))?;

        for member in room.members.keys().filter(|p| **p != self.participant) {
            if let Some(mailbox) = state.mailboxes.get_mut(member) {
                mailbox.push_back((view, payload.clone()));
                state.delivered += 1;
            }
        }
        Ok(())
    }

    fn drain(&mut self) -> Vec<(ViewId, Bytes)> {
        let mut state = self.hub.state.lock();
        state
            .mailboxes
            .get_mut(&self.participant)
            .map(|mailbox| mailbox.drain(..).collect())
            .unwrap_or_default()
    }
}
