//! Game-facing API
//!
//! `Gamee` owns one platform bridge, the session's capability cache and the
//! session context holding the main controller. Every capability-gated call
//! checks the cache first and fails without contacting the host.

use crate::config::GameeConfig;
use crate::init::InitResponse;
use crate::options::{GameOverOptions, require_fields};
use crate::session::SessionContext;
use gamee_bridge::{
    Device, EmbeddedWebBridge, Inbound, InboundHandler, InstantGamesBridge, InstantGamesSdk,
    MessageChannel, MessageSource, MobileBridge, PlatformBridge, PlatformEvent,
    PlatformSignalEmitter, ResponseCallback, listen,
};
use gamee_controller::{Controller, ControllerInput, ControllerOptions, KeyEvent};
use gamee_core::{
    CapabilityCache, CapabilitySet, ControllerKind, GameeError, InboundMessage, Platform,
    RequestMethod, Result,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Completion callback handed to game-facing calls
pub type Callback<T> = Box<dyn FnOnce(Result<T>) + Send>;

/// Init request waiting for the host
struct PendingInit {
    kind: ControllerKind,
    options: ControllerOptions,
    capabilities: CapabilitySet,
    response: oneshot::Receiver<Result<Option<Value>>>,
    callback: Callback<InitResponse>,
}

/// A gamee session
pub struct Gamee {
    config: GameeConfig,
    bridge: Box<dyn PlatformBridge>,
    capabilities: CapabilityCache,
    session: SessionContext,
    /// Highest loading percentage sent so far
    loading_progress: f64,
    pending_init: Option<PendingInit>,
}

impl Gamee {
    /// Create a session over an existing bridge. `capabilities` must be the
    /// cache the bridge's signal emitter reads.
    pub fn new(
        config: GameeConfig,
        bridge: Box<dyn PlatformBridge>,
        capabilities: CapabilityCache,
    ) -> Self {
        Self {
            config,
            bridge,
            capabilities,
            session: SessionContext::new(),
            loading_progress: 0.0,
            pending_init: None,
        }
    }

    /// Create a session for an envelope platform (web, iOS, Android)
    pub fn connect(
        config: GameeConfig,
        channel: Arc<dyn MessageChannel>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PlatformEvent>)> {
        let capabilities = CapabilityCache::new();
        let (emitter, events) = PlatformSignalEmitter::new(capabilities.clone());
        let bridge_config = config.bridge_config();

        let bridge: Box<dyn PlatformBridge> = match config.platform {
            Platform::Web => Box::new(EmbeddedWebBridge::new(channel, emitter, bridge_config)),
            Platform::Ios | Platform::Android => Box::new(MobileBridge::new(
                Device::try_from(config.platform)?,
                channel,
                emitter,
                bridge_config,
            )),
            Platform::InstantGames => {
                return Err(GameeError::InvalidArgument(
                    "Instant Games sessions talk to the SDK, not a message channel".into(),
                ));
            }
        };

        Ok((Self::new(config, bridge, capabilities), events))
    }

    /// Create a session backed by the Instant Games SDK
    pub fn instant_games(
        mut config: GameeConfig,
        sdk: Arc<dyn InstantGamesSdk>,
    ) -> (Self, mpsc::UnboundedReceiver<PlatformEvent>) {
        config.platform = Platform::InstantGames;
        let capabilities = CapabilityCache::new();
        let (emitter, events) = PlatformSignalEmitter::new(capabilities.clone());
        let bridge = InstantGamesBridge::new(sdk, emitter, config.bridge_config());
        (Self::new(config, Box::new(bridge), capabilities), events)
    }

    pub fn config(&self) -> &GameeConfig {
        &self.config
    }

    pub fn platform(&self) -> Platform {
        self.bridge.platform()
    }

    /// Platform name: `web`, `ios`, `android` or `fb`
    pub fn get_platform(&self) -> &'static str {
        self.platform().as_str()
    }

    pub fn capabilities(&self) -> &CapabilityCache {
        &self.capabilities
    }

    pub fn is_initialized(&self) -> bool {
        self.capabilities.is_negotiated()
    }

    /// Requests still waiting for a host response
    pub fn pending_requests(&self) -> usize {
        self.bridge.pending_count()
    }

    // --- Init handshake ---

    pub fn init<S: AsRef<str>>(
        &mut self,
        kind: ControllerKind,
        capabilities: &[S],
        callback: Callback<InitResponse>,
    ) -> Result<()> {
        self.init_with_options(kind, ControllerOptions::default(), capabilities, callback)
    }

    /// Start the init handshake.
    ///
    /// The capability list is validated before anything is sent; one bad
    /// name fails the whole call. When the host answers, the capabilities are
    /// cached, the main controller is built and `callback` runs.
    pub fn init_with_options<S: AsRef<str>>(
        &mut self,
        kind: ControllerKind,
        options: ControllerOptions,
        capabilities: &[S],
        callback: Callback<InitResponse>,
    ) -> Result<()> {
        if self.pending_init.is_some() || self.capabilities.is_negotiated() {
            return Err(GameeError::InvalidArgument("init was already called".into()));
        }

        let negotiated = CapabilitySet::negotiate(capabilities)?;
        let payload = json!({
            "version": self.config.version,
            "controller": kind.as_str(),
            "capabilities": negotiated.to_wire(),
        });

        let (tx, rx) = oneshot::channel();
        let on_response: ResponseCallback = Box::new(move |result: Result<Option<Value>>| {
            let _ = tx.send(result);
        });
        self.bridge
            .create_request(RequestMethod::Init, Some(payload), Some(on_response))?;

        self.pending_init = Some(PendingInit {
            kind,
            options,
            capabilities: negotiated,
            response: rx,
            callback,
        });
        Ok(())
    }

    /// Finish an init handshake whose response already arrived
    pub fn process_pending(&mut self) {
        let Some(mut pending) = self.pending_init.take() else {
            return;
        };

        match pending.response.try_recv() {
            Ok(result) => self.complete_init(pending, result),
            Err(oneshot::error::TryRecvError::Empty) => self.pending_init = Some(pending),
            Err(oneshot::error::TryRecvError::Closed) => (pending.callback)(Err(
                GameeError::Transport("init request was dropped".into()),
            )),
        }
    }

    /// Wait for the init response.
    ///
    /// Only for backends that complete requests on their own, such as the
    /// Instant Games SDK. Envelope backends need `handle_inbound` instead.
    pub async fn wait_for_init(&mut self) {
        let Some(mut pending) = self.pending_init.take() else {
            return;
        };
        let result = (&mut pending.response)
            .await
            .unwrap_or_else(|_| Err(GameeError::Transport("init request was dropped".into())));
        self.complete_init(pending, result);
    }

    fn complete_init(&mut self, pending: PendingInit, result: Result<Option<Value>>) {
        let PendingInit {
            kind,
            mut options,
            capabilities,
            callback,
            ..
        } = pending;

        let data = match result {
            Ok(data) => data,
            Err(e) => return callback(Err(e)),
        };

        if let Err(e) = self.capabilities.store(capabilities) {
            return callback(Err(e));
        }

        options.enable_keyboard |= self.platform().has_keyboard();
        let controller = match self.session.request_controller(kind, &options) {
            Ok(controller) => controller.map(|c| c.kind()),
            Err(e) => return callback(Err(e)),
        };

        info!("Session initialized on {}", self.platform());
        callback(Ok(InitResponse::from_host(data, controller)));
    }

    // --- Inbound traffic ---

    /// Handle one host message: responses, signals and controller input
    pub fn handle_inbound(&mut self, message: InboundMessage) -> Result<()> {
        let inbound = self.bridge.handle_inbound(message);
        self.process_pending();

        match inbound? {
            Inbound::Input { input, data, ack } => {
                let input = ControllerInput::from_host(input, data.as_ref())?;
                self.session.trigger_host(input)?;
                ack.ack()
            }
            _ => Ok(()),
        }
    }

    /// Listen until the host goes away or violates the protocol
    pub async fn run<S: MessageSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        listen(self, source).await
    }

    // --- Requests ---

    fn request(
        &mut self,
        method: RequestMethod,
        data: Option<Value>,
        callback: Option<ResponseCallback>,
    ) -> Result<()> {
        if let Some(capability) = method.required_capability() {
            self.capabilities.require(capability)?;
        }
        self.bridge.create_request(method, data, callback)?;
        Ok(())
    }

    /// Report loading progress in percent. Only increases are sent.
    pub fn game_loading_progress(&mut self, percentage: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(GameeError::InvalidArgument(
                "Percentage passed to gameLoadingProgress out of bounds or not a number.".into(),
            ));
        }
        if percentage <= self.loading_progress {
            return Ok(());
        }
        self.loading_progress = percentage;
        self.request(
            RequestMethod::GameLoadingProgress,
            Some(json!({ "percentage": percentage })),
            None,
        )
    }

    /// The game can accept a start command
    pub fn game_ready(&mut self) -> Result<()> {
        self.request(RequestMethod::GameReady, None, None)
    }

    /// Send the current score; `ghost_sign` updates the ghost's score instead
    pub fn update_score(&mut self, score: f64, ghost_sign: bool) -> Result<()> {
        if !score.is_finite() {
            return Err(GameeError::InvalidArgument(
                "Score passed to updateScore is not a number.".into(),
            ));
        }
        let mut data = json!({ "score": score.trunc() as i64 });
        if ghost_sign {
            data["ghostSign"] = Value::Bool(true);
        }
        self.request(RequestMethod::UpdateScore, Some(data), None)
    }

    pub fn game_over(&mut self, options: &GameOverOptions) -> Result<()> {
        let data = options.to_payload()?;
        self.request(RequestMethod::GameOver, Some(data), None)
    }

    /// Store game state; the game owns the serialization
    pub fn game_save(&mut self, state: &str, share: bool) -> Result<()> {
        self.request(
            RequestMethod::SaveState,
            Some(json!({ "state": state, "share": share })),
            None,
        )
    }

    /// Friends data. The response always carries a `socialData` field.
    pub fn request_social(
        &mut self,
        number_of_players: Option<u32>,
        callback: Callback<Value>,
    ) -> Result<()> {
        let data = number_of_players.map(|n| json!({ "numberOfPlayers": n }));
        let on_response: ResponseCallback = Box::new(move |result: Result<Option<Value>>| {
            callback(result.map(|data| {
                let data = data.unwrap_or(Value::Null);
                if data.get("socialData").is_some() {
                    data
                } else {
                    json!({ "socialData": data })
                }
            }))
        });
        self.request(RequestMethod::RequestSocial, data, Some(on_response))
    }

    /// Telemetry event; failures reported by the host are logged
    pub fn log_event(&mut self, event_name: &str, event_value: &str) -> Result<()> {
        let name = event_name.to_string();
        let on_response: ResponseCallback = Box::new(move |result: Result<Option<Value>>| {
            if let Err(e) = result {
                error!("logEvent {} failed: {}", name, e);
            }
        });
        self.request(
            RequestMethod::LogEvent,
            Some(json!({ "eventName": event_name, "eventValue": event_value })),
            Some(on_response),
        )
    }

    pub fn request_battle_data(&mut self, callback: Callback<Value>) -> Result<()> {
        self.request(RequestMethod::RequestBattleData, None, Some(with_data(callback)))
    }

    pub fn request_player_replay(&mut self, user_id: u64, callback: Callback<Value>) -> Result<()> {
        self.request(
            RequestMethod::RequestPlayerReplay,
            Some(json!({ "userID": user_id })),
            Some(with_data(callback)),
        )
    }

    pub fn request_player_save_state(
        &mut self,
        user_id: u64,
        callback: Callback<Value>,
    ) -> Result<()> {
        self.request(
            RequestMethod::RequestPlayerSaveState,
            Some(json!({ "userID": user_id })),
            Some(with_data(callback)),
        )
    }

    /// Buy an item with coins; `options` needs `coinsCost` and `itemName`
    pub fn purchase_item_with_coins(
        &mut self,
        options: Value,
        callback: Callback<Value>,
    ) -> Result<()> {
        self.purchase_with_coins(RequestMethod::PurchaseItemWithCoins, options, callback)
    }

    /// Same as [`purchase_item_with_coins`](Self::purchase_item_with_coins)
    /// under the method name older hosts expect
    pub fn purchase_item(&mut self, options: Value, callback: Callback<Value>) -> Result<()> {
        self.purchase_with_coins(RequestMethod::PurchaseItem, options, callback)
    }

    fn purchase_with_coins(
        &mut self,
        method: RequestMethod,
        options: Value,
        callback: Callback<Value>,
    ) -> Result<()> {
        self.capabilities.require(gamee_core::Capability::Coins)?;
        require_fields(&options, "Purchase Options", &["coinsCost", "itemName"])?;
        self.trace_options(method, &options);
        self.request(method, Some(options), Some(with_data(callback)))
    }

    /// Buy an item with gems; `options` needs `gemsCost` and `itemName`
    pub fn purchase_item_with_gems(
        &mut self,
        options: Value,
        callback: Callback<Value>,
    ) -> Result<()> {
        self.capabilities.require(gamee_core::Capability::Gems)?;
        require_fields(&options, "Purchase options", &["gemsCost", "itemName"])?;
        self.trace_options(RequestMethod::PurchaseItemWithGems, &options);
        self.request(
            RequestMethod::PurchaseItemWithGems,
            Some(options),
            Some(with_data(callback)),
        )
    }

    /// Share to a destination; `options` needs `destination`
    pub fn share(&mut self, options: Value, callback: Callback<Value>) -> Result<()> {
        self.capabilities.require(gamee_core::Capability::Share)?;
        require_fields(&options, "Share Options", &["destination"])?;
        self.trace_options(RequestMethod::Share, &options);
        self.request(RequestMethod::Share, Some(options), Some(with_data(callback)))
    }

    pub fn load_rewarded_video(&mut self, callback: Callback<Value>) -> Result<()> {
        self.request(RequestMethod::LoadRewardedVideo, None, Some(with_data(callback)))
    }

    pub fn show_rewarded_video(&mut self, callback: Callback<Value>) -> Result<()> {
        self.request(RequestMethod::ShowRewardedVideo, None, Some(with_data(callback)))
    }

    /// Player profile; the current player unless `user_id` is given
    pub fn request_player_data(
        &mut self,
        user_id: Option<u64>,
        callback: Callback<Value>,
    ) -> Result<()> {
        let data = user_id.map(|id| json!({ "userID": id }));
        self.request(RequestMethod::RequestPlayerData, data, Some(with_data(callback)))
    }

    fn trace_options(&self, method: RequestMethod, options: &Value) {
        if !self.config.silent_mode {
            debug!("{} options: {}", method, options);
        }
    }

    // --- Controllers ---

    pub fn controller(&self) -> Option<&Controller> {
        self.session.main()
    }

    pub fn controller_mut(&mut self) -> Option<&mut Controller> {
        self.session.main_mut()
    }

    /// A controller outside the session; it never receives ambient input
    pub fn additional_controller(
        &self,
        kind: ControllerKind,
        options: &ControllerOptions,
    ) -> Result<Controller> {
        self.session.additional_controller(kind, options)
    }

    /// Dispatch input on the main controller
    pub fn trigger(&mut self, input: ControllerInput) -> Result<bool> {
        self.session.trigger(input)
    }

    /// Route a physical key event to the main controller
    pub fn key_event(&mut self, event: KeyEvent) -> Result<bool> {
        self.session.key_event(event)
    }
}

impl InboundHandler for Gamee {
    fn handle(&mut self, message: InboundMessage) -> Result<()> {
        self.handle_inbound(message)
    }

    fn silent(&self) -> bool {
        self.config.silent_mode
    }
}

/// Adapt a game callback to the bridge, treating a missing payload as null
fn with_data(callback: Callback<Value>) -> ResponseCallback {
    Box::new(move |result: Result<Option<Value>>| {
        callback(result.map(|data| data.unwrap_or(Value::Null)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReplayData;
    use async_trait::async_trait;
    use gamee_bridge::QueueChannel;
    use gamee_core::{Capability, Signal, WireMessage};
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    type Slot<T> = Arc<Mutex<Option<Result<T>>>>;

    fn slot<T: Send + 'static>() -> (Slot<T>, Callback<T>) {
        let slot: Slot<T> = Arc::new(Mutex::new(None));
        let sink = slot.clone();
        let callback: Callback<T> = Box::new(move |result: Result<T>| {
            *sink.lock().unwrap() = Some(result);
        });
        (slot, callback)
    }

    struct Harness {
        gamee: Gamee,
        wire: mpsc::UnboundedReceiver<WireMessage>,
        events: mpsc::UnboundedReceiver<PlatformEvent>,
    }

    impl Harness {
        fn new(config: GameeConfig) -> Self {
            let (channel, wire) = QueueChannel::new();
            let (gamee, events) = Gamee::connect(config, Arc::new(channel)).unwrap();
            Self {
                gamee,
                wire,
                events,
            }
        }

        fn sent(&mut self) -> Value {
            self.wire.try_recv().unwrap().to_value().unwrap()
        }

        fn nothing_sent(&mut self) -> bool {
            self.wire.try_recv().is_err()
        }

        fn host(&mut self, message: Value) -> Result<()> {
            self.gamee.handle_inbound(InboundMessage::Object(message))
        }

        /// Run the init handshake to completion
        fn initialized(kind: ControllerKind, options: ControllerOptions, caps: &[&str]) -> Self {
            let mut h = Self::new(GameeConfig::default());
            let (init, callback) = slot::<InitResponse>();
            h.gamee
                .init_with_options(kind, options, caps, callback)
                .unwrap();
            let id = h.sent()["request"]["messageId"].as_u64().unwrap();
            h.host(json!({ "response": { "messageId": id, "data": { "sound": true } } }))
                .unwrap();
            assert!(init.lock().unwrap().take().unwrap().is_ok());
            h
        }
    }

    #[test]
    fn test_init_envelope_and_response() {
        let mut h = Harness::new(GameeConfig::default());
        let (init, callback) = slot::<InitResponse>();
        h.gamee
            .init(ControllerKind::OneButton, &["saveState", "replay"], callback)
            .unwrap();

        assert_eq!(
            h.sent(),
            json!({
                "request": {
                    "method": "init",
                    "messageId": 0,
                    "data": {
                        "version": "2.4.0",
                        "controller": "OneButton",
                        "capabilities": { "saveState": true, "replay": true }
                    }
                }
            })
        );
        assert!(!h.gamee.is_initialized());
        assert!(init.lock().unwrap().is_none());

        h.host(json!({
            "response": { "messageId": 0, "data": { "saveState": "lvl2", "sound": false } }
        }))
        .unwrap();

        let response = init.lock().unwrap().take().unwrap().unwrap();
        assert_eq!(response.save_state.as_deref(), Some("lvl2"));
        assert_eq!(response.controller, Some(ControllerKind::OneButton));
        assert!(h.gamee.is_initialized());
        assert!(h.gamee.capabilities().contains(Capability::Replay));

        // Web sessions get keyboard input
        assert!(h.gamee.controller().unwrap().keyboard_enabled());

        assert_ok!(h.gamee.game_over(&GameOverOptions {
            replay_data: Some(ReplayData::new("d").with_variant("v")),
            ..Default::default()
        }));
        assert_eq!(
            h.sent(),
            json!({
                "request": {
                    "method": "gameOver",
                    "messageId": 1,
                    "data": { "replayData": { "variant": "v", "data": "d" }, "hideOverlay": false }
                }
            })
        );
    }

    #[test]
    fn test_init_with_unknown_capability_sends_nothing() {
        let mut h = Harness::new(GameeConfig::default());
        let (init, callback) = slot::<InitResponse>();
        let err = assert_err!(h.gamee.init(
            ControllerKind::OneButton,
            &["saveState", "flying"],
            callback
        ));
        assert!(matches!(err, GameeError::InvalidCapabilities(_)));
        assert!(h.nothing_sent());
        assert!(init.lock().unwrap().is_none());
        assert!(!h.gamee.is_initialized());
    }

    #[test]
    fn test_init_twice_is_rejected() {
        let mut h = Harness::initialized(
            ControllerKind::OneButton,
            ControllerOptions::default(),
            &[],
        );
        let (_init, callback) = slot::<InitResponse>();
        let empty: [&str; 0] = [];
        assert!(h.gamee.init(ControllerKind::OneButton, &empty, callback).is_err());
        assert!(h.nothing_sent());
    }

    #[test]
    fn test_init_error_response_reaches_callback() {
        let mut h = Harness::new(GameeConfig::default());
        let (init, callback) = slot::<InitResponse>();
        h.gamee
            .init(ControllerKind::OneButton, &["coins"], callback)
            .unwrap();
        h.sent();

        h.host(json!({ "response": { "messageId": 0 }, "error": "maintenance" }))
            .unwrap();
        let result = init.lock().unwrap().take().unwrap();
        assert!(matches!(result, Err(GameeError::HostError(_))));
        assert!(!h.gamee.is_initialized());
    }

    #[test]
    fn test_game_save_requires_save_state() {
        let mut h = Harness::initialized(
            ControllerKind::OneButton,
            ControllerOptions::default(),
            &["replay"],
        );

        let err = h.gamee.game_save("{}", false).unwrap_err();
        assert!(matches!(err, GameeError::CapabilityNotGranted(Capability::SaveState)));
        assert!(h.nothing_sent());
    }

    #[test]
    fn test_gated_calls_before_init_fail() {
        let mut h = Harness::new(GameeConfig::default());
        let (_result, callback) = slot::<Value>();
        assert!(h.gamee.show_rewarded_video(callback).is_err());
        assert!(h.gamee.log_event("level", "1").is_err());
        assert!(h.nothing_sent());

        // Ungated calls go through
        assert_ok!(h.gamee.game_ready());
        assert_eq!(h.sent()["request"]["method"], "gameReady");
    }

    #[test]
    fn test_game_save_with_capability() {
        let mut h = Harness::initialized(
            ControllerKind::OneButton,
            ControllerOptions::default(),
            &["saveState"],
        );
        h.gamee.game_save("{\"lvl\":3}", true).unwrap();
        assert_eq!(
            h.sent()["request"]["data"],
            json!({ "state": "{\"lvl\":3}", "share": true })
        );
    }

    #[test]
    fn test_update_score_payload() {
        let mut h = Harness::new(GameeConfig::default());
        h.gamee.update_score(42.9, false).unwrap();
        assert_eq!(h.sent()["request"]["data"], json!({ "score": 42 }));

        h.gamee.update_score(7.0, true).unwrap();
        assert_eq!(
            h.sent()["request"]["data"],
            json!({ "score": 7, "ghostSign": true })
        );

        assert!(h.gamee.update_score(f64::NAN, false).is_err());
    }

    #[test]
    fn test_loading_progress_bounds() {
        let mut h = Harness::new(GameeConfig::default());
        assert!(h.gamee.game_loading_progress(101.0).is_err());
        assert!(h.gamee.game_loading_progress(-1.0).is_err());

        // Valid, but the web host does not take progress updates
        assert_ok!(h.gamee.game_loading_progress(50.0));
        assert!(h.nothing_sent());
    }

    #[test]
    fn test_request_social_normalizes_response() {
        let mut h = Harness::initialized(
            ControllerKind::OneButton,
            ControllerOptions::default(),
            &["socialData"],
        );
        let (social, callback) = slot::<Value>();
        h.gamee.request_social(None, callback).unwrap();
        let id = h.sent()["request"]["messageId"].as_u64().unwrap();

        h.host(json!({ "response": { "messageId": id, "data": [{ "name": "ann" }] } }))
            .unwrap();
        assert_eq!(
            social.lock().unwrap().take().unwrap().unwrap(),
            json!({ "socialData": [{ "name": "ann" }] })
        );
    }

    #[test]
    fn test_purchases() {
        let mut h = Harness::initialized(
            ControllerKind::OneButton,
            ControllerOptions::default(),
            &["coins"],
        );

        let (_r, callback) = slot::<Value>();
        let err = h
            .gamee
            .purchase_item_with_coins(json!({ "coinsCost": 5 }), callback)
            .unwrap_err();
        assert!(matches!(err, GameeError::InvalidArgument(_)));
        assert!(h.nothing_sent());

        let (purchase, callback) = slot::<Value>();
        h.gamee
            .purchase_item(json!({ "coinsCost": 5, "itemName": "hat" }), callback)
            .unwrap();
        let sent = h.sent();
        assert_eq!(sent["request"]["method"], "purchaseItem");
        let id = sent["request"]["messageId"].as_u64().unwrap();

        h.host(json!({ "response": { "messageId": id, "data": { "purchaseStatus": true } } }))
            .unwrap();
        assert_eq!(
            purchase.lock().unwrap().take().unwrap().unwrap(),
            json!({ "purchaseStatus": true })
        );

        // Gems were not negotiated
        let (_r, callback) = slot::<Value>();
        let err = h
            .gamee
            .purchase_item_with_gems(json!({ "gemsCost": 1, "itemName": "hat" }), callback)
            .unwrap_err();
        assert!(matches!(err, GameeError::CapabilityNotGranted(Capability::Gems)));
    }

    #[test]
    fn test_request_player_data_payload() {
        let mut h = Harness::initialized(
            ControllerKind::OneButton,
            ControllerOptions::default(),
            &["playerData"],
        );
        let (_r, callback) = slot::<Value>();
        h.gamee.request_player_data(None, callback).unwrap();
        assert_eq!(h.sent()["request"]["data"], Value::Null);

        let (_r, callback) = slot::<Value>();
        h.gamee.request_player_data(Some(77), callback).unwrap();
        assert_eq!(h.sent()["request"]["data"], json!({ "userID": 77 }));
    }

    #[test]
    fn test_host_button_routes_through_remap() {
        let options: ControllerOptions =
            serde_json::from_value(json!({ "buttons": { "left": { "name": "throttle" } } }))
                .unwrap();
        let mut h = Harness::initialized(ControllerKind::TwoButtons, options, &[]);
        let mut events = h.gamee.controller().unwrap().subscribe();

        h.host(json!({ "request": { "method": "button_left_down", "messageId": 9 } }))
            .unwrap();

        let controller = h.gamee.controller().unwrap();
        assert!(controller.is_down("throttle"));
        assert!(controller.button("left").is_none());
        assert!(events.try_recv().is_ok());
        assert_eq!(h.sent(), json!({ "response": { "messageId": 9 } }));
    }

    #[test]
    fn test_input_without_controller() {
        let mut h = Harness::new(GameeConfig::default());
        let err = h
            .host(json!({ "request": { "method": "button_a_down", "messageId": 1 } }))
            .unwrap_err();
        assert!(matches!(err, GameeError::NoMainController));
        assert!(h.gamee.trigger(ControllerInput::key_down("A")).is_err());

        // Full-screen games have no controller at all
        let mut h = Harness::initialized(
            ControllerKind::FullScreen,
            ControllerOptions::default(),
            &[],
        );
        assert!(h.gamee.controller().is_none());
        assert!(matches!(
            h.gamee.key_event(KeyEvent::down(32)),
            Err(GameeError::NoMainController)
        ));
    }

    #[test]
    fn test_start_rejected_without_replay() {
        let mut h = Harness::initialized(
            ControllerKind::OneButton,
            ControllerOptions::default(),
            &["saveState"],
        );
        h.host(json!({
            "request": { "method": "start", "messageId": 4, "data": { "replay": true } }
        }))
        .unwrap();

        assert!(h.events.try_recv().is_err());
        assert_eq!(
            h.sent(),
            json!({ "response": { "messageId": 4 }, "error": "Game doesn't support replay. " })
        );

        h.host(json!({
            "request": { "method": "start", "messageId": 5, "data": { "resetState": true } }
        }))
        .unwrap();
        let event = h.events.try_recv().unwrap();
        assert!(matches!(event.signal, Signal::Start(options) if options.reset_state));
    }

    #[test]
    fn test_mobile_sessions_have_no_keyboard() {
        let mut h = Harness::new(GameeConfig::for_platform(Platform::Android));
        assert_eq!(h.gamee.get_platform(), "android");

        let (_init, callback) = slot::<InitResponse>();
        let empty: [&str; 0] = [];
        h.gamee
            .init(ControllerKind::OneButton, &empty, callback)
            .unwrap();
        assert!(matches!(h.wire.try_recv().unwrap(), WireMessage::Text(_)));

        h.gamee
            .handle_inbound(InboundMessage::Text(
                r#"{"response":{"messageId":0,"data":{}}}"#.into(),
            ))
            .unwrap();
        assert!(!h.gamee.controller().unwrap().keyboard_enabled());
    }

    #[test]
    fn test_instant_games_needs_sdk() {
        let (channel, _wire) = QueueChannel::new();
        let result = Gamee::connect(
            GameeConfig::for_platform(Platform::InstantGames),
            Arc::new(channel),
        );
        assert!(result.is_err());
    }

    #[derive(Default)]
    struct RecordingSdk {
        progress: Mutex<Vec<f64>>,
    }

    #[async_trait]
    impl InstantGamesSdk for RecordingSdk {
        async fn initialize(&self) -> Result<()> {
            Ok(())
        }

        async fn get_player_data(&self, _keys: Vec<String>) -> Result<Value> {
            Ok(json!({ "gamee": "saved" }))
        }

        async fn set_player_data(&self, _data: Value) -> Result<()> {
            Ok(())
        }

        fn set_loading_progress(&self, percentage: f64) {
            self.progress.lock().unwrap().push(percentage);
        }

        async fn start_game(&self) -> Result<()> {
            Ok(())
        }

        async fn end_game(&self) -> Result<()> {
            Ok(())
        }

        fn set_score(&self, _score: i64) {}
    }

    #[tokio::test]
    async fn test_instant_games_session() {
        let sdk = Arc::new(RecordingSdk::default());
        let (mut gamee, _events) = Gamee::instant_games(GameeConfig::default(), sdk.clone());
        assert_eq!(gamee.get_platform(), "fb");

        let (init, callback) = slot::<InitResponse>();
        gamee
            .init(ControllerKind::TwoArrowsOneButton, &["saveState"], callback)
            .unwrap();
        gamee.wait_for_init().await;

        let response = init.lock().unwrap().take().unwrap().unwrap();
        assert_eq!(response.save_state.as_deref(), Some("saved"));
        assert!(response.sound);
        assert!(gamee.controller().unwrap().keyboard_enabled());

        // Only increasing values reach the SDK
        for pct in [10.0, 5.0, 10.0, 60.0] {
            gamee.game_loading_progress(pct).unwrap();
        }
        assert_eq!(*sdk.progress.lock().unwrap(), vec![10.0, 60.0]);

        // Not mapped by the SDK adapter
        let (_r, callback) = slot::<Value>();
        let err = gamee.request_battle_data(callback).unwrap_err();
        assert!(matches!(err, GameeError::UnsupportedMethod { .. }));
    }
}
