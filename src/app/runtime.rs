use std::sync::Arc;
use std::time::Duration;

use crate::adapters::station_tcp::CollectorLink;
use crate::app::config::{CollectorConfig, ReporterConfig};
use crate::app::error::AppError;
use crate::app::handler::{ConnectionHandler, HandlerSettings};
use crate::app::listener::Listener;
use crate::app::reporter::Reporter;
use crate::app::services::SqliteStationStore;
use crate::app::shutdown::StopSignal;
use crate::app::worker_pool::WorkerPool;
use crate::domain::clock::SystemClock;

pub fn run_collector(config: CollectorConfig) -> Result<(), AppError> {
    let store = SqliteStationStore::open(
        &config.db_path,
        Duration::from_millis(config.store_busy_timeout_ms),
        config.store_busy_retries,
    )
    .map_err(AppError::database_init)?;

    let settings = HandlerSettings {
        read_timeout: config.read_timeout(),
        max_message_bytes: config.max_message_bytes,
        send_ack: config.send_ack,
    };
    let handler = Arc::new(ConnectionHandler::new(store, SystemClock, settings));

    let listener = Listener::bind(&config.bind)?;
    let pool = WorkerPool::new(config.worker_pool_size, config.dispatch_queue_capacity)
        .map_err(AppError::runtime)?;
    let signal = StopSignal::install().map_err(AppError::runtime)?;

    let summary = listener.serve(handler, pool, &signal.flag());

    tracing::info!(
        accepted = summary.accepted,
        dispatched = summary.dispatched,
        accept_errors = summary.accept_errors,
        "collector shut down"
    );

    Ok(())
}

pub fn run_reporter(config: ReporterConfig) -> Result<(), AppError> {
    let link = CollectorLink::new(
        &config.collector_addr,
        Duration::from_millis(config.connect_timeout_ms),
    )
    .map_err(AppError::config)?;
    let reporter = Reporter::new(
        &config.status_file,
        link,
        Duration::from_secs(config.report_interval_secs),
    );
    let signal = StopSignal::install().map_err(AppError::runtime)?;

    reporter.run(&signal.flag());

    Ok(())
}
