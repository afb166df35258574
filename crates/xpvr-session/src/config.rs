//! Session configuration
//!
//! Every field has a default; a JSON document only needs the fields it
//! changes:
//!
//! ```json
//! {
//!   "variant": "full_vr",
//!   "smoothing": { "smoothing_factor": 3 },
//!   "room": { "max_players": 8 }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use xpvr_avatar::SmoothingConfig;
use xpvr_core::{AvatarVariant, HandEncoding, XpvrError, XpvrResult};

use crate::RoomOptions;

/// Logging setup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            json: false,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Avatar variant of this client
    pub variant: AvatarVariant,
    /// Hand pose encoding of outbound snapshots
    pub hand_encoding: HandEncoding,
    /// Smoothing applied to every remote avatar
    pub smoothing: SmoothingConfig,
    /// Sync tick interval in milliseconds
    pub tick_interval_ms: u64,
    pub room: RoomOptions,
    pub log: LogConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            variant: AvatarVariant::default(),
            hand_encoding: HandEncoding::default(),
            smoothing: SmoothingConfig::default(),
            tick_interval_ms: 100,
            room: RoomOptions::default(),
            log: LogConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(s: &str) -> XpvrResult<Self> {
        let config: SessionConfig = serde_json::from_str(s)
            .map_err(|e| XpvrError::InvalidConfig(format!("parse: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> XpvrResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| XpvrError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> XpvrResult<()> {
        self.smoothing.validate()?;
        self.room.validate()?;
        if self.tick_interval_ms == 0 {
            return Err(XpvrError::InvalidConfig("tick_interval_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.variant, AvatarVariant::FullVr);
        assert_eq!(config.smoothing.smoothing_factor, 2);
        assert_eq!(config.smoothing.applied_distance, 1.0);
        assert_eq!(config.room.max_players, 20);
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = SessionConfig::from_json_str(
            r#"{
                "variant": "hololens",
                "hand_encoding": "compact",
                "smoothing": { "applied_distance": 2.5 },
                "room": { "max_players": 4 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.variant, AvatarVariant::Hololens);
        assert_eq!(config.hand_encoding, HandEncoding::Compact);
        assert_eq!(config.smoothing.smoothing_factor, 2);
        assert_eq!(config.smoothing.applied_distance, 2.5);
        assert_eq!(config.room.max_players, 4);
        assert_eq!(config.room.scene, "MP_Scene");
    }

    #[test]
    fn test_out_of_range_rejected() {
        let result = SessionConfig::from_json_str(r#"{ "smoothing": { "smoothing_factor": 7 } }"#);
        assert!(matches!(result, Err(XpvrError::InvalidConfig(_))));

        let result = SessionConfig::from_json_str(r#"{ "tick_interval_ms": 0 }"#);
        assert!(matches!(result, Err(XpvrError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(SessionConfig::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(SessionConfig::from_file("/nonexistent/xpvr.json").is_err());
    }
}
