// Server loop module
// Accepts connections until shutdown is requested, then drains in-flight connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Poll interval while waiting for connections to finish
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Main accept loop
///
/// Returns once `shutdown` is notified and in-flight connections have finished
/// or the grace period has elapsed.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                break;
            }
        }
    }

    // Stop accepting before waiting on the remaining connections
    drop(listener);

    let grace = Duration::from_secs(state.config.performance.shutdown_grace_period);
    let remaining = drain_connections(&active_connections, grace).await;
    logger::log_shutdown_complete(remaining);
    Ok(())
}

/// Wait until no connection is active or `grace` has elapsed
///
/// Returns the number of connections still open.
pub async fn drain_connections(active_connections: &AtomicUsize, grace: Duration) -> usize {
    logger::log_shutdown_started(active_connections.load(Ordering::SeqCst));

    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let active = active_connections.load(Ordering::SeqCst);
        if active == 0 || tokio::time::Instant::now() >= deadline {
            return active;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
