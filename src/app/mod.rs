pub mod config;
mod error;
pub mod handler;
pub mod listener;
mod logging;
pub mod reporter;
mod runtime;
pub mod services;
pub mod shutdown;
pub mod worker_pool;

pub use error::AppError;

pub fn run_collector() -> Result<(), AppError> {
    logging::init()?;

    let config = config::CollectorConfig::from_env()?;

    tracing::info!(
        bind = %config.bind,
        db_path = %config.db_path,
        worker_pool_size = config.worker_pool_size,
        dispatch_queue_capacity = config.dispatch_queue_capacity,
        read_timeout_ms = config.read_timeout_ms,
        send_ack = config.send_ack,
        "collector bootstrap initialized"
    );

    runtime::run_collector(config)
}

pub fn run_reporter() -> Result<(), AppError> {
    logging::init()?;

    let config = config::ReporterConfig::from_env()?;

    tracing::info!(
        collector_addr = %config.collector_addr,
        status_file = %config.status_file,
        report_interval_secs = config.report_interval_secs,
        "reporter bootstrap initialized"
    );

    runtime::run_reporter(config)
}
