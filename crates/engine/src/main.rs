//! Parties Engine - standalone smoke runner.
//!
//! Loads the config file, wires the core against in-process adapters and
//! ticks it until Ctrl+C or SIGTERM. Nothing feeds the player directory and
//! no client connects, so parties stay empty; the run exercises config
//! loading, the game loop and shutdown. A game server embeds the library
//! instead, fills the directory from its own player list and registers a
//! sender per client in `ClientConnections`.

use std::sync::Arc;

use parties_domain::{BossMultipliers, EntityId, LootScaling};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parties_engine::app::{App, Collaborators};
use parties_engine::game_loop::GameLoop;
use parties_engine::infrastructure::{
    broadcast::{spawn_delivery, ChannelBroadcaster, ClientConnections},
    clock::SystemClock,
    config::{ConfigHandle, FileConfigProvider},
    directory::InMemoryPlayerDirectory,
    ports::{AttributeService, ConfigProvider, LootService},
};

/// Records attribute changes instead of touching live entities.
struct LoggingAttributes;

impl AttributeService for LoggingAttributes {
    fn apply(&self, entity: EntityId, multipliers: BossMultipliers) {
        tracing::info!(
            entity_id = %entity,
            health = multipliers.health,
            damage = multipliers.damage,
            "Boss attributes scaled"
        );
    }
}

struct LoggingLoot;

impl LootService for LoggingLoot {
    fn scale_drops(&self, entity: EntityId, scaling: LootScaling) {
        tracing::info!(entity_id = %entity, ?scaling, "Boss loot scaled");
    }
}

fn setup_shutdown_signal(cancel_token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown...");
            }
        }

        cancel_token.cancel();
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parties_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Parties Engine");

    let cancel_token = CancellationToken::new();
    setup_shutdown_signal(cancel_token.clone());

    // Load configuration
    let provider = Arc::new(FileConfigProvider::from_env());
    let config = ConfigHandle::new(provider.load()?)?;
    {
        let current = config.current();
        tracing::info!(path = %provider.path().display(), "Configuration loaded");
        tracing::info!("  Party size: {}", current.max_party_size());
        tracing::info!("  Invite expiry: {}s", current.timers.player_accept_timer);
        tracing::info!(
            "  Sync intervals: fast={} slow={}",
            current.timers.fast_interval,
            current.timers.slow_interval
        );
    }

    // Outbound delivery
    let (broadcaster, outbound_rx) = ChannelBroadcaster::new();
    let connections = Arc::new(ClientConnections::new());
    let delivery = spawn_delivery(outbound_rx, connections, cancel_token.clone());

    tracing::info!("No players are attached; running as a smoke test of the tick loop");
    let app = Arc::new(App::new(
        config,
        Collaborators {
            clock: Arc::new(SystemClock::new()),
            directory: Arc::new(InMemoryPlayerDirectory::new()),
            broadcaster: Arc::new(broadcaster),
            attributes: Arc::new(LoggingAttributes),
            loot: Arc::new(LoggingLoot),
            config_provider: provider,
            proximity: None,
            external_teams: None,
            team_mirror: None,
        },
    )?);

    GameLoop::new(app).run(cancel_token.clone()).await;

    if let Err(e) = delivery.await {
        tracing::warn!(error = %e, "Delivery task ended abnormally");
    }
    tracing::info!("Parties Engine stopped");
    Ok(())
}
