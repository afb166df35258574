//! Tracing setup

use tracing_subscriber::EnvFilter;
use xpvr_core::{XpvrError, XpvrResult};

use crate::LogConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Fails if a
/// subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> XpvrResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| XpvrError::InvalidConfig(format!("log filter: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| XpvrError::InvalidConfig(format!("tracing: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_invalid_filter_rejected() {
        std::env::remove_var("RUST_LOG");
        let config = LogConfig {
            filter: "xpvr=loudest".into(),
            json: false,
        };
        assert!(matches!(
            init_tracing(&config),
            Err(XpvrError::InvalidConfig(msg)) if msg.starts_with("log filter")
        ));
    }

    #[test]
    #[serial]
    fn test_second_init_rejected() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(init_tracing(&LogConfig::default()), Ok(()));

        let json = LogConfig {
            filter: "xpvr=debug".into(),
            json: true,
        };
        assert!(matches!(
            init_tracing(&json),
            Err(XpvrError::InvalidConfig(msg)) if msg.starts_with("tracing")
        ));
    }
}
