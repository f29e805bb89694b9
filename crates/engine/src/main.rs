use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use domain::services::{DirectoryStore, LeaseStore, NotificationStore, StaticCredentialsResolver};
use lease_engine::config::Config;
use lease_engine::jobs::{AutoRenewalJob, JobScheduler, NotificationTickJob};
use lease_engine::services::{
    build_senders, AutoRenewalService, DispatchRouter, NotificationOrchestrator,
};
use lease_engine::logging;
use persistence::repositories::{DirectoryRepository, LeaseRepository, NotificationRepository};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    logging::init_logging(&config.logging);

    info!("Starting Lease Engine v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let pool = persistence::db::create_pool(&config.database).await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // Stores
    let leases: Arc<dyn LeaseStore> = Arc::new(LeaseRepository::new(pool.clone()));
    let directory: Arc<dyn DirectoryStore> = Arc::new(DirectoryRepository::new(pool.clone()));
    let notifications: Arc<dyn NotificationStore> = Arc::new(NotificationRepository::new(pool));

    // Dispatch and services
    let senders = build_senders(&config.channels)?;
    let credentials = Arc::new(StaticCredentialsResolver::new(config.channels.credentials()));
    let router = DispatchRouter::new(Arc::clone(&notifications), credentials, senders);
    let orchestrator = Arc::new(NotificationOrchestrator::new(
        Arc::clone(&leases),
        Arc::clone(&notifications),
        Arc::clone(&directory),
        router,
    ));
    let renewals = Arc::new(AutoRenewalService::new(
        Arc::clone(&leases),
        Arc::clone(&directory),
    ));

    // Background jobs
    let mut scheduler = JobScheduler::new();
    scheduler.register(NotificationTickJob::new(
        orchestrator,
        config.scheduler.notification_tick_minutes,
    ));
    scheduler.register(AutoRenewalJob::new(
        renewals,
        config.scheduler.renewal_tick_minutes,
    ));
    scheduler.start();

    info!("Lease engine running");
    tokio::signal::ctrl_c().await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(30)).await;

    Ok(())
}
