//! # thermobridged — thermobridge daemon
//!
//! Composition root that wires all adapters together and starts the
//! server.
//!
//! ## Responsibilities
//! - Load configuration (TOML file + env overrides) and initialize tracing
//! - Fetch the zone roster from the setup store (empty roster is fatal)
//! - Construct the collaborator platforms (IoT REST, Netatmo, setup store)
//! - Build the registry, scheduler, and bridge services
//! - Activate device sessions (credential gating) and authenticate sensors
//! - Spawn the inbound command feed and forward it to the dispatcher
//! - Serve the admin surface under the configured context root
//! - Handle graceful shutdown (SIGTERM/SIGINT), cancelling every timer
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use thermobridge_adapter_http_axum::AppState;
use thermobridge_adapter_iot_rest::commands::CommandFeed;
use thermobridge_adapter_iot_rest::{IotRestConfig, IotRestPlatform};
use thermobridge_adapter_netatmo::{NetatmoConfig, NetatmoPlatform};
use thermobridge_adapter_setup_rest::{SetupRestConfig, SetupRestStore};
use thermobridge_app::ports::SetupStore;
use thermobridge_app::registry::ZoneRegistry;
use thermobridge_app::scheduler::ZoneScheduler;
use thermobridge_app::services::{CommandBridge, LifecycleService, TelemetryBridge};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Zone roster
    let setup_store = Arc::new(SetupRestStore::new(SetupRestConfig {
        base_url: config.setup.base_url.clone(),
        setup_path: config.setup.setup_path.clone(),
        target_path: config.setup.target_path.clone(),
    }));
    let setups = setup_store.fetch_zones().await?;
    if setups.is_empty() {
        return Err("no demozones configured in the setup store".into());
    }

    // Collaborator platforms
    let iot_config = IotRestConfig {
        base_url: config.iot.base_url.clone(),
        username: config.iot.username.clone(),
        password: config.iot.password.clone(),
        credential_dir: config.iot.credential_dir.clone(),
    };
    let device_platform = Arc::new(IotRestPlatform::from_roster(iot_config.clone(), &setups));
    let sensor_platform = Arc::new(NetatmoPlatform::new(NetatmoConfig {
        base_url: config.netatmo.base_url.clone(),
    }));

    // Application core
    let registry = Arc::new(ZoneRegistry::from_setups(
        setups,
        config.scheduler.default_poll_secs,
    ));
    let bridge = Arc::new(TelemetryBridge::new(Arc::clone(&registry)));
    let scheduler = Arc::new(ZoneScheduler::new(Arc::clone(&registry), bridge));
    let lifecycle = Arc::new(LifecycleService::new(
        Arc::clone(&device_platform),
        Arc::clone(&sensor_platform),
        Arc::clone(&registry),
        Arc::clone(&scheduler),
    ));

    // Sessions
    lifecycle.init_devices().await?;
    lifecycle.init_sensors().await;

    // Inbound command feed
    let command_bridge = Arc::new(CommandBridge::new(
        Arc::clone(&registry),
        Arc::clone(&setup_store),
    ));
    let feed = CommandFeed::new(
        &iot_config,
        device_platform.targets(),
        Duration::from_secs(config.iot.command_poll_secs),
    );
    let (mut commands, feed_handle) = feed.spawn();
    let forwarder = tokio::spawn(async move {
        while let Some(value) = commands.recv().await {
            command_bridge.on_set_point(&value).await;
        }
    });

    // HTTP
    let state = AppState::new(
        Arc::clone(&scheduler),
        Arc::clone(&registry),
        lifecycle,
        Arc::clone(&device_platform),
    );
    let app = axum::Router::new().nest(
        &config.server.context_root,
        thermobridge_adapter_http_axum::build(state),
    );

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        addr = bind_addr,
        context_root = config.server.context_root,
        "admin surface listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    feed_handle.abort();
    forwarder.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
