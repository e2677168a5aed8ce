use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::adapters::station_tcp::{CollectorLink, LinkError};
use crate::adapters::status_file::{StatusFileError, read_station_status};
use crate::domain::message::encode;

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("station status unavailable: {0}")]
    Status(#[from] StatusFileError),
    #[error("failed to send report: {0}")]
    Send(#[from] LinkError),
}

pub struct Reporter {
    status_file: PathBuf,
    link: CollectorLink,
    interval: Duration,
}

impl Reporter {
    pub fn new(status_file: impl Into<PathBuf>, link: CollectorLink, interval: Duration) -> Self {
        Self {
            status_file: status_file.into(),
            link,
            interval,
        }
    }

    pub fn tick(&self) -> Result<Option<String>, ReporterError> {
        let status = read_station_status(&self.status_file)?;
        let payload = encode(status.station_id, status.alarm1, status.alarm2);
        let ack = self.link.send(&payload)?;
        Ok(ack)
    }

    pub fn run(&self, stop: &AtomicBool) {
        tracing::info!(
            collector = %self.link.target(),
            status_file = %self.status_file.display(),
            interval_secs = self.interval.as_secs(),
            "reporter started"
        );

        while !stop.load(Ordering::SeqCst) {
            let started = Instant::now();

            match self.tick() {
                Ok(Some(ack)) => tracing::info!(response = %ack, "report delivered"),
                Ok(None) => tracing::info!("report delivered without acknowledgment"),
                Err(ReporterError::Status(error)) => {
                    tracing::warn!(error = %error, "no valid status to send; skipping cycle");
                }
                Err(error) => tracing::error!(error = %error, "report cycle failed"),
            }

            sleep_unless_stopped(remaining_wait(self.interval, started.elapsed()), stop);
        }

        tracing::info!("reporter stopped");
    }
}

pub fn remaining_wait(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + total;
    while !stop.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep((deadline - now).min(STOP_POLL_INTERVAL));
    }
}
