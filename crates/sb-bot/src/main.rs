use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use sb_bot::dispatch::{Dispatcher, GatewayEvent};
use sb_bot::notify::Notifier;
use sb_bot::{Cli, Config, ingress};
use sb_core::ChannelId;

/// Capacity of the queue between the ingress endpoint and the dispatcher.
const INBOUND_QUEUE_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    // A bad or missing value here exits non-zero so the supervisor restarts us.
    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let watched = ChannelId::new(config.watched_channel_id.clone())
        .context("invalid watched channel ID")?;
    let notification_channel = ChannelId::new(config.notification_channel_id.clone())
        .context("invalid notification channel ID")?;

    let notifier = Notifier::new(config.discord_token.clone())?;
    let llm = sb_llm::Client::new(config.gemini_api_key.clone())
        .context("failed to build Gemini client")?;

    let (tx, rx) = mpsc::channel::<GatewayEvent>(INBOUND_QUEUE_CAPACITY);
    let app = ingress::router(tx, config.ingress_token.clone());
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "ingress listening");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let dispatcher = Dispatcher::new(watched, notification_channel, notifier, llm);
    let mut dispatch = tokio::spawn(dispatcher.run(rx));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
        result = &mut dispatch => {
            match result {
                Ok(()) => tracing::warn!("dispatch loop exited"),
                Err(error) => tracing::error!(%error, "dispatch task join error"),
            }
        }
        result = &mut server => {
            match result {
                Ok(Ok(())) => tracing::warn!("ingress server exited"),
                Ok(Err(error)) => tracing::error!(%error, "ingress server failed"),
                Err(error) => tracing::error!(%error, "ingress task join error"),
            }
        }
    }

    let _ = shutdown_tx.send(());
    Ok(())
}
