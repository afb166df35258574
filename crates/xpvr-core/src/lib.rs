//! XPVR Core - Fundamental avatar types
//!
//! This crate defines the types shared by every avatar variant:
//! - Identifiers (ParticipantId, ViewId)
//! - Pose math (Position3D, Rotation3D, Transform)
//! - Hand poses and their three-toggle rendering form
//! - Avatar variants and their wire field schemas
//! - The error type used across the workspace

pub mod error;
pub mod hand;
pub mod id;
pub mod math;
pub mod variant;

pub use error::*;
pub use hand::*;
pub use id::*;
pub use math::*;
pub use variant::*;
