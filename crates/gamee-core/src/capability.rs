//! Capability vocabulary and negotiation
//!
//! A game declares the optional features it uses when it calls `init`. The
//! declared list is validated against a closed vocabulary, all-or-nothing, and
//! the resulting set is cached for the rest of the session.

use crate::error::{GameeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Opt-in feature negotiated during the init handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    GhostMode,
    SaveState,
    Replay,
    SocialData,
    RewardedAds,
    Coins,
    LogEvents,
    PlayerData,
    Share,
    Gems,
}

impl Capability {
    /// The closed vocabulary, in wire order
    pub const ALL: [Capability; 10] = [
        Capability::GhostMode,
        Capability::SaveState,
        Capability::Replay,
        Capability::SocialData,
        Capability::RewardedAds,
        Capability::Coins,
        Capability::LogEvents,
        Capability::PlayerData,
        Capability::Share,
        Capability::Gems,
    ];

    /// Wire name of the capability
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::GhostMode => "ghostMode",
            Capability::SaveState => "saveState",
            Capability::Replay => "replay",
            Capability::SocialData => "socialData",
            Capability::RewardedAds => "rewardedAds",
            Capability::Coins => "coins",
            Capability::LogEvents => "logEvents",
            Capability::PlayerData => "playerData",
            Capability::Share => "share",
            Capability::Gems => "gems",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = GameeError;

    fn from_str(s: &str) -> Result<Self> {
        Capability::ALL
            .into_iter()
            .find(|cap| cap.as_str() == s)
            .ok_or_else(|| GameeError::InvalidCapabilities(format!("unknown capability `{}`", s)))
    }
}

/// Validated set of capabilities for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// Validate a requested capability list.
    ///
    /// Every element must belong to the vocabulary. A single bad element
    /// rejects the whole list; partial grants do not exist.
    pub fn negotiate<S: AsRef<str>>(requested: &[S]) -> Result<Self> {
        let mut set = BTreeSet::new();
        let mut rejected = Vec::new();

        for name in requested {
            match name.as_ref().parse::<Capability>() {
                Ok(cap) => {
                    set.insert(cap);
                }
                Err(_) => rejected.push(name.as_ref().to_string()),
            }
        }

        if !rejected.is_empty() {
            return Err(GameeError::InvalidCapabilities(format!(
                "unsupported capabilities requested: {}",
                rejected.join(", ")
            )));
        }

        Ok(Self(set))
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Fail with `CapabilityNotGranted` unless the capability was negotiated
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.contains(capability) {
            Ok(())
        } else {
            Err(GameeError::CapabilityNotGranted(capability))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Init payload form: `{"saveState": true, ...}`
    pub fn to_wire(&self) -> serde_json::Value {
        let map = self
            .0
            .iter()
            .map(|cap| (cap.as_str().to_string(), serde_json::Value::Bool(true)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Session-wide capability cache.
///
/// Written once when the init handshake completes, read by every gated
/// operation and by the signal emitter. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct CapabilityCache(Arc<OnceLock<CapabilitySet>>);

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the negotiated set. A second store is rejected.
    pub fn store(&self, capabilities: CapabilitySet) -> Result<()> {
        self.0.set(capabilities).map_err(|_| {
            GameeError::InvalidCapabilities("capabilities were already negotiated".into())
        })
    }

    pub fn get(&self) -> Option<&CapabilitySet> {
        self.0.get()
    }

    pub fn is_negotiated(&self) -> bool {
        self.0.get().is_some()
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.get().is_some_and(|set| set.contains(capability))
    }

    /// Before negotiation nothing is granted
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.contains(capability) {
            Ok(())
        } else {
            Err(GameeError::CapabilityNotGranted(capability))
        }
    }
}
