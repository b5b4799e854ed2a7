//! Request and signal method names
//!
//! String method names only exist on the wire. Everything above the envelope
//! layer matches on these enums.

use crate::capability::Capability;
use crate::error::{GameeError, Result};
use crate::input::{ButtonState, TouchPhase};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Game -> host request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestMethod {
    Init,
    GameLoadingProgress,
    GameReady,
    UpdateScore,
    GameOver,
    SaveState,
    RequestSocial,
    LogEvent,
    RequestBattleData,
    RequestPlayerReplay,
    RequestPlayerSaveState,
    PurchaseItemWithCoins,
    /// Legacy alias of `PurchaseItemWithCoins`
    PurchaseItem,
    PurchaseItemWithGems,
    Share,
    LoadRewardedVideo,
    ShowRewardedVideo,
    RequestPlayerData,
}

impl RequestMethod {
    pub const ALL: [RequestMethod; 18] = [
        RequestMethod::Init,
        RequestMethod::GameLoadingProgress,
        RequestMethod::GameReady,
        RequestMethod::UpdateScore,
        RequestMethod::GameOver,
        RequestMethod::SaveState,
        RequestMethod::RequestSocial,
        RequestMethod::LogEvent,
        RequestMethod::RequestBattleData,
        RequestMethod::RequestPlayerReplay,
        RequestMethod::RequestPlayerSaveState,
        RequestMethod::PurchaseItemWithCoins,
        RequestMethod::PurchaseItem,
        RequestMethod::PurchaseItemWithGems,
        RequestMethod::Share,
        RequestMethod::LoadRewardedVideo,
        RequestMethod::ShowRewardedVideo,
        RequestMethod::RequestPlayerData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestMethod::Init => "init",
            RequestMethod::GameLoadingProgress => "gameLoadingProgress",
            RequestMethod::GameReady => "gameReady",
            RequestMethod::UpdateScore => "updateScore",
            RequestMethod::GameOver => "gameOver",
            RequestMethod::SaveState => "saveState",
            RequestMethod::RequestSocial => "requestSocial",
            RequestMethod::LogEvent => "logEvent",
            RequestMethod::RequestBattleData => "requestBattleData",
            RequestMethod::RequestPlayerReplay => "requestPlayerReplay",
            RequestMethod::RequestPlayerSaveState => "requestPlayerSaveState",
            RequestMethod::PurchaseItemWithCoins => "purchaseItemWithCoins",
            RequestMethod::PurchaseItem => "purchaseItem",
            RequestMethod::PurchaseItemWithGems => "purchaseItemWithGems",
            RequestMethod::Share => "share",
            RequestMethod::LoadRewardedVideo => "loadRewardedVideo",
            RequestMethod::ShowRewardedVideo => "showRewardedVideo",
            RequestMethod::RequestPlayerData => "requestPlayerData",
        }
    }

    /// Capability that must have been negotiated before the method may be sent
    pub fn required_capability(self) -> Option<Capability> {
        match self {
            RequestMethod::SaveState => Some(Capability::SaveState),
            RequestMethod::RequestSocial => Some(Capability::SocialData),
            RequestMethod::LogEvent => Some(Capability::LogEvents),
            RequestMethod::RequestPlayerReplay => Some(Capability::Replay),
            RequestMethod::PurchaseItemWithCoins | RequestMethod::PurchaseItem => {
                Some(Capability::Coins)
            }
            RequestMethod::PurchaseItemWithGems => Some(Capability::Gems),
            RequestMethod::Share => Some(Capability::Share),
            RequestMethod::LoadRewardedVideo | RequestMethod::ShowRewardedVideo => {
                Some(Capability::RewardedAds)
            }
            RequestMethod::RequestPlayerData => Some(Capability::PlayerData),
            RequestMethod::Init
            | RequestMethod::GameLoadingProgress
            | RequestMethod::GameReady
            | RequestMethod::UpdateScore
            | RequestMethod::GameOver
            | RequestMethod::RequestBattleData
            | RequestMethod::RequestPlayerSaveState => None,
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = GameeError;

    fn from_str(s: &str) -> Result<Self> {
        RequestMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| GameeError::InvalidArgument(format!("unknown request method `{}`", s)))
    }
}

/// Host -> game control signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignalMethod {
    Pause,
    Resume,
    Mute,
    Unmute,
    GhostShow,
    GhostHide,
    Start,
}

impl SignalMethod {
    pub const ALL: [SignalMethod; 7] = [
        SignalMethod::Pause,
        SignalMethod::Resume,
        SignalMethod::Mute,
        SignalMethod::Unmute,
        SignalMethod::GhostShow,
        SignalMethod::GhostHide,
        SignalMethod::Start,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SignalMethod::Pause => "pause",
            SignalMethod::Resume => "resume",
            SignalMethod::Mute => "mute",
            SignalMethod::Unmute => "unmute",
            SignalMethod::GhostShow => "ghostShow",
            SignalMethod::GhostHide => "ghostHide",
            SignalMethod::Start => "start",
        }
    }
}

impl fmt::Display for SignalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host -> game controller input relayed through the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMethod {
    /// `button_<name>_<down|up>`
    Button { button: String, state: ButtonState },
    /// `touchstart`, `touchmove`, ...
    Touch(TouchPhase),
    /// Joystick axis `change`
    Change,
}

impl InputMethod {
    /// Decode a host button message such as `button_left_down`.
    ///
    /// Host names are lowercase; the action buttons arrive as `a`/`b` and map
    /// to the controller names `A`/`B`.
    pub fn parse_button(message: &str) -> Option<Self> {
        let rest = message.strip_prefix("button_")?;
        let (name, edge) = rest.rsplit_once('_')?;
        let state = match edge {
            "down" => ButtonState::Down,
            "up" => ButtonState::Up,
            _ => return None,
        };
        if name.is_empty() {
            return None;
        }
        let button = match name {
            "a" => "A".to_string(),
            "b" => "B".to_string(),
            other => other.to_string(),
        };
        Some(InputMethod::Button { button, state })
    }
}

/// Classified inbound request method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMethod {
    Signal(SignalMethod),
    Input(InputMethod),
}

impl InboundMethod {
    pub fn parse(method: &str) -> Option<Self> {
        if let Some(signal) = SignalMethod::ALL
            .into_iter()
            .find(|signal| signal.as_str() == method)
        {
            return Some(InboundMethod::Signal(signal));
        }
        if let Some(phase) = TouchPhase::from_event_name(method) {
            return Some(InboundMethod::Input(InputMethod::Touch(phase)));
        }
        if method == "change" {
            return Some(InboundMethod::Input(InputMethod::Change));
        }
        InputMethod::parse_button(method).map(InboundMethod::Input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_method_wire_names() {
        for method in RequestMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
            assert_eq!(method.as_str().parse::<RequestMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_capability_gates() {
        assert_eq!(
            RequestMethod::SaveState.required_capability(),
            Some(Capability::SaveState)
        );
        assert_eq!(
            RequestMethod::PurchaseItem.required_capability(),
            Some(Capability::Coins)
        );
        assert_eq!(RequestMethod::GameOver.required_capability(), None);
        assert_eq!(RequestMethod::RequestPlayerSaveState.required_capability(), None);
    }

    #[test]
    fn test_parse_host_button() {
        assert_eq!(
            InputMethod::parse_button("button_left_down"),
            Some(InputMethod::Button {
                button: "left".into(),
                state: ButtonState::Down
            })
        );
        assert_eq!(
            InputMethod::parse_button("button_a_up"),
            Some(InputMethod::Button {
                button: "A".into(),
                state: ButtonState::Up
            })
        );
        assert_eq!(
            InputMethod::parse_button("button_button_down"),
            Some(InputMethod::Button {
                button: "button".into(),
                state: ButtonState::Down
            })
        );
        assert_eq!(InputMethod::parse_button("button_left_sideways"), None);
        assert_eq!(InputMethod::parse_button("left_down"), None);
    }

    #[test]
    fn test_classify_inbound_method() {
        assert_eq!(
            InboundMethod::parse("ghostHide"),
            Some(InboundMethod::Signal(SignalMethod::GhostHide))
        );
        assert_eq!(
            InboundMethod::parse("touchmove"),
            Some(InboundMethod::Input(InputMethod::Touch(TouchPhase::Move)))
        );
        assert_eq!(
            InboundMethod::parse("change"),
            Some(InboundMethod::Input(InputMethod::Change))
        );
        assert_eq!(InboundMethod::parse("explode"), None);
    }
}
