//! gamee-probe
//!
//! Plays the game side of a gamee session over stdio:
//! - Host envelopes are read from stdin, one JSON document per line
//! - Everything the game sends is written to stdout the same way
//! - Logs go to stderr
//!
//! Signals are acknowledged automatically and `gameReady` is sent as soon as
//! the init handshake completes.

use anyhow::{Context, Result, bail};
use clap::Parser;
use gamee::{
    ControllerKind, Gamee, GameeConfig, InboundMessage, InitResponse, Platform, PlatformEvent,
    QueueChannel, Signal, WireMessage,
};
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Play the game side of a gamee session over stdio
#[derive(Debug, Parser)]
#[command(name = "gamee-probe")]
#[command(about = "Play the game side of a gamee session over stdio")]
#[command(version)]
struct Args {
    /// Host platform: web, ios or android
    #[arg(long, default_value = "web", value_parser = Platform::from_str)]
    platform: Platform,

    /// Controller kind announced in init
    #[arg(long, default_value = "OneButton", value_parser = ControllerKind::from_str)]
    controller: ControllerKind,

    /// Comma-separated capabilities requested in init
    #[arg(long, value_delimiter = ',')]
    capabilities: Vec<String>,

    /// Mute payload tracing in the bridge
    #[arg(long)]
    silent: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Requested capability names with blanks dropped
    fn capability_names(&self) -> Vec<&str> {
        self.capabilities
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// Drain outbound envelopes to stdout
async fn write_wire(mut wire: mpsc::UnboundedReceiver<WireMessage>) {
    let mut stdout = tokio::io::stdout();

    while let Some(message) = wire.recv().await {
        let text = match message.to_text() {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to encode outbound message: {}", e);
                continue;
            }
        };

        let written = async {
            stdout.write_all(text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await
        };
        if let Err(e) = written.await {
            error!("Failed to write stdout: {}", e);
            break;
        }
        debug!("Sent: {}", message.preview());
    }
}

fn on_init(gamee: &mut Gamee, result: gamee::Result<InitResponse>) -> Result<()> {
    let response = result.context("init handshake failed")?;
    info!(
        "Init done: sound={} saveState={}",
        response.sound,
        response.save_state.as_deref().unwrap_or("none")
    );

    if let Some(controller) = gamee.controller() {
        info!(
            "Controller {} buttons: [{}]",
            controller.kind(),
            controller.button_names().join(", ")
        );
        let mut controller_events = controller.subscribe();
        tokio::spawn(async move {
            loop {
                match controller_events.recv().await {
                    Ok(event) => info!("Controller: {:?}", event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Controller log lagged, missed {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    gamee.game_ready()?;
    Ok(())
}

fn on_signal(event: PlatformEvent) {
    let PlatformEvent { signal, ack } = event;
    match signal {
        Signal::Start(options) => info!(
            "Start: replay={} ghostMode={} resetState={}",
            options.replay, options.ghost_mode, options.reset_state
        ),
        other => info!("Signal: {}", other.method()),
    }

    if let Err(e) = ack.ack() {
        warn!("Failed to acknowledge {}: {}", signal.method(), e);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.platform == Platform::InstantGames {
        bail!("Instant Games sessions run against the SDK, not stdio");
    }

    let (channel, wire) = QueueChannel::new();
    let writer = tokio::spawn(write_wire(wire));

    let config = GameeConfig::for_platform(args.platform).silent(args.silent);
    let (mut gamee, mut events) = Gamee::connect(config, Arc::new(channel))?;

    let (init_tx, mut init_rx) = mpsc::unbounded_channel();
    gamee.init(
        args.controller,
        &args.capability_names(),
        Box::new(move |result: gamee::Result<InitResponse>| {
            let _ = init_tx.send(result);
        }),
    )?;
    info!(
        "gamee-probe started: platform={} controller={}",
        gamee.get_platform(),
        args.controller
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    info!("Host disconnected (EOF)");
                    break;
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if let Err(e) = gamee.handle_inbound(InboundMessage::Text(trimmed.to_string())) {
                    if e.is_fatal() {
                        error!("Stopping: {}", e);
                        break;
                    }
                    warn!("{}", e);
                }
            }
            Some(result) = init_rx.recv() => on_init(&mut gamee, result)?,
            Some(event) = events.recv() => on_signal(event),
        }
    }

    if gamee.pending_requests() > 0 {
        warn!("{} requests never got a response", gamee.pending_requests());
    }

    drop(gamee);
    drop(events);
    let _ = writer.await;
    Ok(())
}
