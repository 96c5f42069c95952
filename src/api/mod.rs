//! HTTP boundary.
//!
//! Maps routes onto [`HashService`] calls:
//!
//! | route              | service call        |
//! |--------------------|---------------------|
//! | `POST /hash`       | `submit`            |
//! | `GET /hash/{id}`   | `lookup_str`        |
//! | `GET /stats`       | `stats`             |
//! | `/shutdown`        | `drain_and_stop`    |
//!
//! Shutdown drains the queue first, then stops the listener. Connections
//! still open after the grace period are cut.

mod handlers;

pub use handlers::{CreateResponse, ErrorResponse, ShutdownResponse, StatsResponse};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::engine::HashService;
use crate::error::{Error, Result};

#[derive(Clone)]
pub(crate) struct AppState {
    service: HashService,
    shutdown: ShutdownHandle,
}

/// Triggers a graceful stop: drain the queue, then close the listener.
#[derive(Clone)]
pub struct ShutdownHandle {
    service: HashService,
    stop: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Drain pending work, then tell the server to stop. Idempotent.
    pub async fn drain_and_stop(&self) -> Result<()> {
        self.service.drain_and_stop().await?;
        self.stop.send_replace(true);
        Ok(())
    }
}

/// Build the router for `service`.
pub fn router(service: HashService, shutdown: ShutdownHandle) -> Router {
    Router::new()
        .route("/hash", post(handlers::create_hash))
        .route("/hash/{id}", get(handlers::get_hash))
        .route("/stats", get(handlers::get_stats))
        .route(
            "/shutdown",
            get(handlers::shutdown).post(handlers::shutdown),
        )
        .with_state(AppState { service, shutdown })
}

/// A bound, not yet running HTTP server.
pub struct Server {
    listener: TcpListener,
    service: HashService,
    grace: Duration,
    stop: Arc<watch::Sender<bool>>,
}

impl Server {
    /// Bind `addr`. Use port 0 to pick a free port.
    pub async fn bind(addr: SocketAddr, service: HashService, grace: Duration) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| {
                error!(%addr, error = %e, "failed to bind listener");
                Error::Io(e)
            })?;
        let (stop, _) = watch::channel(false);
        Ok(Self {
            listener,
            service,
            grace,
            stop: Arc::new(stop),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            service: self.service.clone(),
            stop: Arc::clone(&self.stop),
        }
    }

    /// Serve until a [`ShutdownHandle`] fires, then allow in-flight requests
    /// up to the grace period to finish.
    pub async fn run(self) -> Result<()> {
        let addr = self.local_addr()?;
        let handle = self.shutdown_handle();
        let Server {
            listener,
            service,
            grace,
            stop,
        } = self;
        let app = router(service, handle);

        let mut stopped = stop.subscribe();
        let signal = async move {
            let _ = stopped.wait_for(|stop| *stop).await;
        };

        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
        });
        info!(%addr, "hash service listening");

        let mut stopped = stop.subscribe();
        let deadline = async move {
            let _ = stopped.wait_for(|stop| *stop).await;
            tokio::time::sleep(grace).await;
        };

        tokio::select! {
            joined = &mut server => {
                joined
                    .map_err(|e| Error::Other(format!("server task failed: {e}")))?
                    .map_err(|e| {
                        error!(error = %e, "server error");
                        Error::Io(e)
                    })?;
            }
            _ = deadline => {
                warn!(
                    grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
                    "grace period elapsed, closing remaining connections"
                );
                server.abort();
            }
        }

        info!("hash service stopped");
        Ok(())
    }
}
