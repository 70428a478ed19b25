use crate::app_config::AppConfig;
use crate::domain::controller_registry;
use tracing::{error, info};

mod app_config;
mod client;
mod controllers;
mod domain;
mod sync_loop;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!("✅  Loaded configuration");

    let client = client::new_client(&config)?;
    info!(url = config.api().url(), "✅  Initialized api client");

    let known_controllers = controller_registry::registered_names();
    info!("✅  Registered endpoints controllers: {}", known_controllers.join(", "));

    let name = config.endpoints().controller();
    let Some(controller) = controller_registry::get(name, &client) else {
        error!(
            "💥 Unknown endpoints controller '{}', known controllers: {}",
            name,
            known_controllers.join(", ")
        );
        return Err(format!("unknown endpoints controller '{}'", name).into());
    };

    info!("🔥 {} is up and running", env!("CARGO_PKG_NAME"));

    let stats = sync_loop::run(name, controller, config.endpoints().sync_interval(), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("💥 Unable to listen for the shutdown signal, syncing until killed: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await;

    info!(succeeded = stats.succeeded, failed = stats.failed, "👋 Stopped {}", env!("CARGO_PKG_NAME"));
    Ok(())
}
