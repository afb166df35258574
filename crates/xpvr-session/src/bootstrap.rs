//! Room bootstrap - the matchmaking collaborator
//!
//! The room service itself is external. This module fixes the interface
//! the session relies on and the join flow every client follows:
//! connect, join any open room, otherwise create one, and load the shared
//! scene when first in the room.

use serde::Deserialize;
use tracing::info;
use xpvr_core::{ParticipantId, XpvrError, XpvrResult};

/// Default scene every room loads
pub const DEFAULT_SCENE: &str = "MP_Scene";

/// Hard cap on participants per room
pub const MAX_PLAYERS_LIMIT: u8 = 20;

/// Options for rooms this client creates
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoomOptions {
    /// Participants per room; a full room is skipped when joining
    pub max_players: u8,
    /// Only clients with the same game version are matched
    pub game_version: String,
    /// Scene loaded by the first participant
    pub scene: String,
}

impl Default for RoomOptions {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS_LIMIT,
            game_version: "1".into(),
            scene: DEFAULT_SCENE.into(),
        }
    }
}

impl RoomOptions {
    pub fn validate(&self) -> XpvrResult<()> {
        if self.max_players == 0 || self.max_players > MAX_PLAYERS_LIMIT {
            return Err(XpvrError::InvalidConfig(format!(
                "max_players {} outside 1..={}",
                self.max_players, MAX_PLAYERS_LIMIT
            )));
        }
        if self.game_version.is_empty() {
            return Err(XpvrError::InvalidConfig("empty game_version".into()));
        }
        if self.scene.is_empty() {
            return Err(XpvrError::InvalidConfig("empty scene".into()));
        }
        Ok(())
    }
}

/// Room joined by this client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub name: String,
    /// This client's participant number in the room
    pub local: ParticipantId,
    /// Participants including this client
    pub player_count: u8,
    pub max_players: u8,
}

impl RoomInfo {
    /// The first participant loads the scene for everyone
    pub fn is_first(&self) -> bool {
        self.player_count == 1
    }
}

/// Room service used to get into a session
pub trait SessionBootstrap {
    fn is_connected(&self) -> bool;

    /// Connect to the room service
    fn connect(&mut self, game_version: &str) -> XpvrResult<()>;

    /// Join any open room; `NoRoomAvailable` when there is none
    fn join_random_room(&mut self) -> XpvrResult<RoomInfo>;

    fn create_room(&mut self, options: &RoomOptions) -> XpvrResult<RoomInfo>;

    /// Load `scene` for every participant of the room
    fn load_scene(&mut self, scene: &str) -> XpvrResult<()>;

    /// Connect if needed, join or create a room, load the scene if first
    fn join_or_create(&mut self, options: &RoomOptions) -> XpvrResult<RoomInfo> {
        if !self.is_connected() {
            self.connect(&options.game_version)?;
        }

        let room = match self.join_random_room() {
            Err(XpvrError::NoRoomAvailable) => {
                info!("no open room, creating one");
                self.create_room(options)?
            }
            other => other?,
        };

        info!(
            room = %room.name,
            participant = %room.local,
            players = room.player_count,
            "joined room"
        );

        if room.is_first() {
            self.load_scene(&options.scene)?;
        }
        Ok(room)
    }
}
