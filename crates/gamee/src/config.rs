//! Session configuration

use gamee_bridge::{BridgeConfig, PROTOCOL_VERSION};
use gamee_core::{HostEnvironment, Platform};

/// Configuration for a gamee session
#[derive(Debug, Clone)]
pub struct GameeConfig {
    /// Platform the game is embedded in (default: web)
    pub platform: Platform,
    /// Mute payload tracing and unknown-method reports
    pub silent_mode: bool,
    /// Protocol version announced in `init` (default: 2.4.0)
    pub version: String,
}

impl Default for GameeConfig {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            silent_mode: false,
            version: PROTOCOL_VERSION.to_string(),
        }
    }
}

impl GameeConfig {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            ..Default::default()
        }
    }

    /// Detect the platform from the embedding page
    pub fn detect(env: &HostEnvironment) -> Self {
        Self::for_platform(Platform::detect(env))
    }

    pub fn silent(mut self, silent_mode: bool) -> Self {
        self.silent_mode = silent_mode;
        self
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            silent_mode: self.silent_mode,
            version: self.version.clone(),
        }
    }
}
