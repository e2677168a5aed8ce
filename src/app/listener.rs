use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::app::AppError;
use crate::app::handler::ConnectionHandler;
use crate::app::services::StationStatusStore;
use crate::app::worker_pool::WorkerPool;
use crate::domain::clock::Clock;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub accepted: u64,
    pub dispatched: u64,
    pub accept_errors: u64,
}

pub struct Listener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    pub fn bind(address: &str) -> Result<Self, AppError> {
        let listener = TcpListener::bind(address)
            .map_err(|error| AppError::runtime(format!("failed to bind {address}: {error}")))?;
        listener
            .set_nonblocking(true)
            .map_err(|error| AppError::runtime(format!("failed to configure listener: {error}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|error| AppError::runtime(format!("failed to read listener address: {error}")))?;

        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn serve<S, C>(
        self,
        handler: Arc<ConnectionHandler<S, C>>,
        pool: WorkerPool,
        stop: &AtomicBool,
    ) -> ServeSummary
    where
        S: StationStatusStore + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let mut summary = ServeSummary::default();
        tracing::info!(
            bind = %self.local_addr,
            workers = pool.size(),
            "collector accepting connections"
        );

        while !stop.load(Ordering::SeqCst) {
            let (stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                    continue;
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    summary.accept_errors += 1;
                    tracing::warn!(error = %error, "failed to accept connection");
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                    continue;
                }
            };
            summary.accepted += 1;
            tracing::debug!(%peer, "connection accepted");

            if let Err(error) = stream.set_nonblocking(false) {
                tracing::warn!(%peer, error = %error, "failed to configure accepted stream");
                continue;
            }

            let handler = Arc::clone(&handler);
            match pool.execute(move || {
                handler.handle(stream, peer);
            }) {
                Ok(()) => summary.dispatched += 1,
                Err(error) => {
                    tracing::error!(%peer, error = %error, "failed to dispatch connection");
                }
            }
        }

        tracing::info!(
            accepted = summary.accepted,
            dispatched = summary.dispatched,
            "collector stopped accepting; draining workers"
        );
        pool.shutdown();
        drop(self.listener);
        tracing::info!("collector listener released");

        summary
    }
}
