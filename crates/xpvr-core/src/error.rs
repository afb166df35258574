//! Error types for avatar replication

use thiserror::Error;

use crate::{AvatarVariant, FieldKind, ParticipantId};

/// Core XPVR errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XpvrError {
    // Wire errors
    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Frame too large: {size} > {max}")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Unsupported wire version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unknown avatar variant tag: {0}")]
    UnknownVariant(u8),

    #[error("Reserved header bits set: {0:#04x}")]
    ReservedBits(u8),

    #[error("Variant mismatch: expected {expected}, got {actual}")]
    VariantMismatch {
        expected: AvatarVariant,
        actual: AvatarVariant,
    },

    #[error("Field count mismatch: expected {expected}, got {actual}")]
    FieldCountMismatch { expected: usize, actual: usize },

    #[error("Field {index} kind mismatch: expected {expected:?}, got {actual:?}")]
    FieldKindMismatch {
        index: usize,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("Unknown field kind: {0:#04x}")]
    UnknownFieldKind(u8),

    #[error("Stream exhausted after {0} fields")]
    StreamExhausted(usize),

    #[error("Trailing data: {0} bytes after last field")]
    TrailingData(usize),

    #[error("Non-finite value in field {0}")]
    NonFinite(usize),

    #[error("Invalid hand pose flags: {0:?}")]
    InvalidHandFlags([bool; 3]),

    #[error("Invalid hand pose code: {0}")]
    InvalidHandCode(u8),

    #[error("Invalid boolean byte: {0:#04x}")]
    InvalidBool(u8),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Lifecycle errors
    #[error("Invalid lifecycle transition: {0}")]
    InvalidTransition(String),

    #[error("Operation requires the local instance")]
    NotLocal,

    #[error("Operation requires a remote instance")]
    NotRemote,

    #[error("Instance destroyed")]
    Destroyed,

    #[error("Local instance already registered: {0}")]
    LocalAlreadyRegistered(ParticipantId),

    #[error("Participant already has an instance in this scene: {0}")]
    DuplicateParticipant(ParticipantId),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    // Tracking errors
    #[error("Missing tracked device: {0}")]
    MissingTrackedDevice(&'static str),

    // Session errors
    #[error("Not connected")]
    NotConnected,

    #[error("No room available")]
    NoRoomAvailable,

    #[error("Room full")]
    RoomFull,

    #[error("Channel error: {0}")]
    Channel(String),
}

impl XpvrError {
    /// Errors caused by a peer's snapshot rather than local misuse
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            XpvrError::BufferTooShort { .. }
                | XpvrError::UnsupportedVersion(_)
                | XpvrError::UnknownVariant(_)
                | XpvrError::ReservedBits(_)
                | XpvrError::VariantMismatch { .. }
                | XpvrError::FieldCountMismatch { .. }
                | XpvrError::FieldKindMismatch { .. }
                | XpvrError::UnknownFieldKind(_)
                | XpvrError::StreamExhausted(_)
                | XpvrError::TrailingData(_)
                | XpvrError::NonFinite(_)
                | XpvrError::InvalidHandFlags(_)
                | XpvrError::InvalidHandCode(_)
                | XpvrError::InvalidBool(_)
        )
    }
}

/// Result type for XPVR operations
pub type XpvrResult<T> = Result<T, XpvrError>;
