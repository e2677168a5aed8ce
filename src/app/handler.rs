use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::adapters::station_tcp::{FrameError, read_message, write_ack};
use crate::app::services::{StationStatusStore, StoreError};
use crate::domain::clock::{Clock, format_last_seen};
use crate::domain::message::{DecodeError, decode};
use crate::domain::models::StationReport;
use crate::domain::validation::{ValidationError, validate};

#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub read_timeout: Option<Duration>,
    pub max_message_bytes: usize,
    pub send_ack: bool,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            read_timeout: Some(Duration::from_secs(5)),
            max_message_bytes: 1024,
            send_ack: true,
        }
    }
}

#[derive(Debug)]
pub enum HandlerOutcome {
    Stored(StationReport),
    ReadFailed(FrameError),
    Malformed(DecodeError),
    Rejected(ValidationError),
    StoreFailed(StoreError),
}

pub struct ConnectionHandler<S, C> {
    store: S,
    clock: C,
    settings: HandlerSettings,
}

impl<S, C> ConnectionHandler<S, C>
where
    S: StationStatusStore,
    C: Clock,
{
    pub fn new(store: S, clock: C, settings: HandlerSettings) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    // The stream is dropped, and so closed, on every return path.
    pub fn handle(&self, mut stream: TcpStream, peer: SocketAddr) -> HandlerOutcome {
        if let Err(error) = stream.set_read_timeout(self.settings.read_timeout) {
            tracing::warn!(%peer, error = %error, "failed to set read timeout");
        }

        let bytes = match read_message(&mut stream, self.settings.max_message_bytes) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!(%peer, error = %error, "no report read from connection");
                return HandlerOutcome::ReadFailed(error);
            }
        };

        tracing::debug!(%peer, payload = %String::from_utf8_lossy(&bytes), "report received");

        let message = match decode(&bytes) {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(%peer, error = %error, "malformed report dropped");
                return HandlerOutcome::Malformed(error);
            }
        };

        let parsed = match validate(&message) {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::warn!(%peer, error = %error, "invalid report dropped");
                return HandlerOutcome::Rejected(error);
            }
        };

        let report = StationReport::from_parsed(parsed, format_last_seen(self.clock.now()));
        if let Err(error) = self.store.upsert(&report) {
            tracing::error!(
                %peer,
                station_id = report.station_id,
                error = %error,
                "failed to persist station report"
            );
            return HandlerOutcome::StoreFailed(error);
        }

        tracing::info!(
            %peer,
            station_id = report.station_id,
            alarm1 = report.alarm1,
            alarm2 = report.alarm2,
            last_seen = %report.last_seen,
            "station status updated"
        );

        if self.settings.send_ack
            && let Err(error) = write_ack(&mut stream)
        {
            tracing::debug!(%peer, error = %error, "acknowledgment not delivered");
        }

        HandlerOutcome::Stored(report)
    }
}
