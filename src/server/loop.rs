// Server loop module
// Bounded accept loop and graceful drain on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use super::connection::serve_connection;
use super::listener::create_listener;
use crate::config::AppState;
use crate::logger;

/// Accept loop over one listener with a bounded worker pool
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    workers: Arc<Semaphore>,
    capacity: usize,
}

impl Server {
    /// Bind the configured address
    pub fn bind(state: Arc<AppState>) -> std::io::Result<Self> {
        let addr = state
            .config
            .get_socket_addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let listener = create_listener(addr, state.config.server.backlog)?;
        Ok(Self::from_listener(listener, state))
    }

    /// Serve on an already bound listener
    pub fn from_listener(listener: TcpListener, state: Arc<AppState>) -> Self {
        let capacity = state.config.server.max_concurrent_requests.max(1);
        Self {
            listener,
            state,
            workers: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run until shutdown is requested, then wait for in-flight workers
    ///
    /// A worker slot is taken before each accept: with every slot busy,
    /// new connections wait in the listen backlog instead of piling up as
    /// tasks. Accept errors are logged and the loop keeps going.
    pub async fn run(self) {
        let shutdown = self.state.shutdown.clone();

        loop {
            let permit = tokio::select! {
                () = shutdown.wait() => break,
                permit = Arc::clone(&self.workers).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            tokio::select! {
                () = shutdown.wait() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        serve_connection(stream, peer_addr, Arc::clone(&self.state), permit);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                },
            }
        }

        // Stop accepting; queued connections are refused
        drop(self.listener);
        let unfinished = drain(&self.workers, self.capacity, self.state.config.server.shutdown_grace).await;
        logger::log_shutdown_complete(unfinished);
    }
}

/// Wait up to `grace_secs` for every worker slot to come back
///
/// Returns how many workers were still busy when the wait ended.
async fn drain(workers: &Semaphore, capacity: usize, grace_secs: u64) -> usize {
    let Ok(total) = u32::try_from(capacity) else {
        return capacity.saturating_sub(workers.available_permits());
    };

    match tokio::time::timeout(Duration::from_secs(grace_secs), workers.acquire_many(total)).await {
        Ok(Ok(_all)) => 0,
        _ => capacity.saturating_sub(workers.available_permits()),
    }
}
