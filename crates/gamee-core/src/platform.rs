//! Host platform identification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform the game is embedded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Platform {
    /// Iframe inside the web app
    #[default]
    #[serde(rename = "web")]
    Web,
    /// iOS webview
    #[serde(rename = "ios")]
    Ios,
    /// Android webview
    #[serde(rename = "android")]
    Android,
    /// Instant Games SDK runtime
    #[serde(rename = "fb")]
    InstantGames,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::InstantGames => "fb",
        }
    }

    /// Resolve the platform from what the embedding page exposes
    pub fn detect(env: &HostEnvironment) -> Self {
        let user_agent = env.user_agent.to_lowercase();

        if env.framed
            && (env.referrer.contains("facebook.") || env.referrer.contains("messenger.com"))
        {
            Platform::InstantGames
        } else if ["iphone", "ipod", "ipad"]
            .iter()
            .any(|device| user_agent.contains(device))
        {
            if env.framed { Platform::Web } else { Platform::Ios }
        } else if is_android_app(&user_agent) {
            Platform::Android
        } else {
            Platform::Web
        }
    }

    /// Whether the platform delivers physical keyboard events
    pub fn has_keyboard(self) -> bool {
        matches!(self, Platform::Web | Platform::InstantGames)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = crate::GameeError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "web" => Ok(Platform::Web),
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            "fb" | "instant" => Ok(Platform::InstantGames),
            other => Err(crate::GameeError::InvalidArgument(format!(
                "Can't identify the platform `{}`",
                other
            ))),
        }
    }
}

/// The Android app appends `gamee/<version>` to its user agent
fn is_android_app(user_agent: &str) -> bool {
    user_agent.rsplit_once("gamee/").is_some_and(|(_, version)| {
        !version.is_empty() && version.chars().all(|c| c.is_ascii_digit() || c == '.')
    })
}

/// Facts about the embedding page used for platform detection
#[derive(Debug, Clone, Default)]
pub struct HostEnvironment {
    pub user_agent: String,
    pub referrer: String,
    /// Running inside a parent frame
    pub framed: bool,
}
