//! Instant Games backend
//!
//! No envelopes here: each request method maps onto the SDK's own async
//! calls, and the response is synthesized by calling the request callback
//! when the SDK call completes. Ids are never allocated.

use crate::bridge::{BridgeConfig, Inbound, PlatformBridge};
use crate::correlator::ResponseCallback;
use crate::signal::{Acknowledger, PlatformSignalEmitter};
use async_trait::async_trait;
use gamee_core::{
    GameeError, InboundMessage, MessageId, Platform, RequestEnvelope, RequestMethod, Result,
    Signal, StartOptions,
};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Player data key the game state is stored under
const SAVE_KEY: &str = "gamee";

/// Entry points of the Instant Games SDK used by the adapter
#[async_trait]
pub trait InstantGamesSdk: Send + Sync {
    async fn initialize(&self) -> Result<()>;

    /// Stored player data for `keys`, as a JSON object
    async fn get_player_data(&self, keys: Vec<String>) -> Result<Value>;

    async fn set_player_data(&self, data: Value) -> Result<()>;

    fn set_loading_progress(&self, percentage: f64);

    async fn start_game(&self) -> Result<()>;

    async fn end_game(&self) -> Result<()>;

    fn set_score(&self, score: i64);
}

/// SDK adapter bridge
pub struct InstantGamesBridge {
    sdk: Arc<dyn InstantGamesSdk>,
    emitter: PlatformSignalEmitter,
    config: BridgeConfig,
}

impl InstantGamesBridge {
    pub fn new(
        sdk: Arc<dyn InstantGamesSdk>,
        emitter: PlatformSignalEmitter,
        config: BridgeConfig,
    ) -> Self {
        info!("Bridge ready: platform=fb protocol={}", config.version);
        Self {
            sdk,
            emitter,
            config,
        }
    }

    fn dispatch(
        &self,
        method: RequestMethod,
        data: Option<Value>,
        callback: Option<ResponseCallback>,
    ) -> Result<()> {
        let sdk = self.sdk.clone();

        match method {
            RequestMethod::Init => self.spawn(method, callback, async move {
                sdk.initialize().await?;
                let stored = sdk.get_player_data(vec![SAVE_KEY.to_string()]).await?;
                let save_state = stored.get(SAVE_KEY).cloned().unwrap_or(Value::Null);
                Ok(Some(json!({
                    "saveState": save_state,
                    "replayData": null,
                    "sound": true
                })))
            }),
            RequestMethod::GameLoadingProgress => {
                let percentage = number_field(method, data.as_ref(), "percentage")?;
                sdk.set_loading_progress(percentage);
                complete(callback, Ok(None));
                Ok(())
            }
            RequestMethod::GameReady => {
                let emitter = self.emitter.clone();
                self.spawn(method, callback, async move {
                    sdk.set_loading_progress(100.0);
                    sdk.start_game().await?;
                    emitter.emit(Signal::Start(StartOptions::default()), Acknowledger::noop())?;
                    Ok(None)
                })
            }
            RequestMethod::UpdateScore => {
                let score = number_field(method, data.as_ref(), "score")?;
                sdk.set_score(score as i64);
                complete(callback, Ok(None));
                Ok(())
            }
            RequestMethod::GameOver => {
                let emitter = self.emitter.clone();
                self.spawn(method, callback, async move {
                    sdk.end_game().await?;
                    emitter.emit(Signal::Start(StartOptions::default()), Acknowledger::noop())?;
                    Ok(None)
                })
            }
            RequestMethod::SaveState => {
                let state = field(method, data.as_ref(), "state")?.clone();
                self.spawn(method, callback, async move {
                    sdk.set_player_data(json!({ "gamee": state })).await?;
                    info!("Instant Games: data is saved");
                    Ok(None)
                })
            }
            other => Err(GameeError::UnsupportedMethod {
                platform: Platform::InstantGames.to_string(),
                method: other.to_string(),
            }),
        }
    }

    fn spawn<F>(
        &self,
        method: RequestMethod,
        callback: Option<ResponseCallback>,
        task: F,
    ) -> Result<()>
    where
        F: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        let handle = Handle::try_current()
            .map_err(|e| GameeError::Sdk(format!("no async runtime for {}: {}", method, e)))?;

        handle.spawn(async move {
            let result = task.await;
            if let Err(e) = &result {
                warn!("Instant Games {} failed: {}", method, e);
            }
            complete(callback, result);
        });
        Ok(())
    }
}

fn complete(callback: Option<ResponseCallback>, result: Result<Option<Value>>) {
    if let Some(callback) = callback {
        callback(result);
    }
}

fn field<'a>(method: RequestMethod, data: Option<&'a Value>, name: &str) -> Result<&'a Value> {
    data.and_then(|d| d.get(name)).ok_or_else(|| {
        GameeError::InvalidArgument(format!("{} requires `{}`", method, name))
    })
}

fn number_field(method: RequestMethod, data: Option<&Value>, name: &str) -> Result<f64> {
    field(method, data, name)?.as_f64().ok_or_else(|| {
        GameeError::InvalidArgument(format!("{} `{}` must be a number", method, name))
    })
}

impl PlatformBridge for InstantGamesBridge {
    fn platform(&self) -> Platform {
        Platform::InstantGames
    }

    fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn create_request(
        &mut self,
        method: RequestMethod,
        data: Option<Value>,
        callback: Option<ResponseCallback>,
    ) -> Result<Option<MessageId>> {
        self.dispatch(method, data, callback)?;
        Ok(None)
    }

    fn do_call(&self, envelope: &RequestEnvelope) -> Result<()> {
        let method = envelope.request.method.parse::<RequestMethod>()?;
        self.dispatch(method, envelope.request.data.clone(), None)
    }

    /// The SDK never sends host requests, so there is nothing to acknowledge
    fn do_response(&self, message_id: MessageId, _data: Option<Value>) -> Result<()> {
        debug!("Instant Games has no host to acknowledge {}", message_id);
        Ok(())
    }

    fn handle_inbound(&mut self, _message: InboundMessage) -> Result<Inbound> {
        Ok(Inbound::Ignored)
    }
}
