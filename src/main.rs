use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use plateping::channel::{backoff, ChannelManager, MqttChannel, ReconnectSupervisor};
use plateping::config::AppConfig;
use plateping::db::{self, PgAlertStore};
use plateping::notify::LogNotifier;
use plateping::plate::NormalizedPlate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.as_str())
        .init();

    info!("Starting plateping owner agent...");

    let plate = NormalizedPlate::parse(&config.own_plate)
        .context("OWN_PLATE must be a valid license plate")?;

    // Init DB
    let pool = db::init_pool(&config.database_url).await?;
    info!("Connected to database");

    let store = Arc::new(PgAlertStore::new(pool));
    let notifier = Arc::new(LogNotifier::new());

    // Open the channel for our own plate and supervise it
    let (channel, eventloop) = MqttChannel::connect(&config);
    let supervisor = ReconnectSupervisor::new(
        plate.clone(),
        store,
        notifier,
        config.history_keep,
        backoff::build(&config.reconnect),
    );

    let mut manager = ChannelManager::new();
    manager.insert(plate.clone(), supervisor.spawn_mqtt(channel, eventloop));
    info!("Listening for alerts on {}", MqttChannel::topic(&plate));

    tokio::signal::ctrl_c().await?;
    manager.unsubscribe(&plate);
    info!("Shut down");

    Ok(())
}
