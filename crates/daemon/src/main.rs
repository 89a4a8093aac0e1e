//! Shopfloor Scheduler - Main Entry Point
//! Loads the schedule, reports machine load and keeps part progress in sync

mod config;
mod logging;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use config::DaemonConfig;
use shopfloor_core::application::{ScheduleRepository, SyncPoller};
use shopfloor_core::domain::calendar::week_start_millis;
use shopfloor_core::port::id_provider::UuidProvider;
use shopfloor_core::port::time_provider::SystemTimeProvider;
use shopfloor_core::port::{MachineDirectory, TimeProvider};
use shopfloor_infra_json::{
    JsonMachineDirectory, JsonOrderStatusFeed, JsonScheduleStore, MACHINE_DATABASE_FILE,
    ORDER_STATUS_FILE,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env()?;

    // 2. Initialize logging
    let _log_guard = logging::init_logging(config.log_format, config.log_dir.as_deref())?;
    info!("Shopfloor Scheduler v{} starting...", VERSION);
    info!(
        data_dir = %config.data_dir.display(),
        poll_interval_secs = config.poll_interval.as_secs(),
        "Configuration loaded"
    );

    // 3. Open the schedule (wholesale reload)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let store = Arc::new(JsonScheduleStore::new(&config.data_dir));
    let repo = Arc::new(
        ScheduleRepository::open(store, Arc::new(UuidProvider), time_provider.clone())
            .await
            .context("Failed to load schedule")?,
    );

    // 4. Machine directory
    let machines = JsonMachineDirectory::open(config.data_dir.join(MACHINE_DATABASE_FILE))
        .await
        .context("Failed to load machine directory")?;

    // 5. Startup report: weekly load per machine and residual conflicts
    report_schedule(&repo, &machines, time_provider.now_millis()).await?;

    // 6. Event log
    let mut events = repo.subscribe();
    let event_logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => debug!(event = event.name(), "Schedule event"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event log lagging"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // 7. Start the sync poller
    info!("Starting sync poller...");
    let feed = Arc::new(JsonOrderStatusFeed::new(config.data_dir.join(ORDER_STATUS_FILE)));
    let poller = SyncPoller::new(repo.clone(), feed, config.poll_interval).spawn();

    info!("System ready.");
    info!("Press Ctrl+C to shutdown");

    // 8. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 9. Graceful shutdown (bounded)
    if !poller.stop(config.shutdown_timeout).await {
        error!(
            timeout_secs = config.shutdown_timeout.as_secs(),
            "Sync poller did not stop in time, abandoning it"
        );
    }
    event_logger.abort();

    info!("Shutdown complete.");
    Ok(())
}

async fn report_schedule(
    repo: &ScheduleRepository,
    machines: &JsonMachineDirectory,
    now: i64,
) -> Result<()> {
    let week_start = week_start_millis(now, &chrono::Local)?;

    for machine in machines.list_machines().await? {
        let utilization = repo.utilization(&machine.id, week_start).await;
        info!(
            machine_id = %machine.id,
            name = %machine.name,
            utilization_pct = utilization,
            "Machine load this week"
        );
    }

    let overlaps = repo.find_overlaps().await;
    for overlap in &overlaps {
        warn!(
            machine_id = %overlap.machine_id,
            first = %overlap.first,
            second = %overlap.second,
            "Overlapping parts on machine"
        );
    }
    if overlaps.is_empty() {
        info!("No overlapping parts");
    }
    Ok(())
}
