// Server loop module
// Accepts connections until shutdown, then drains the open ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How often the drain checks the open connection count
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept connections until `shutdown` is notified
///
/// Must run inside a `LocalSet`. After the signal the listener is closed and
/// open connections get up to `performance.shutdown_grace` seconds to finish.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = shutdown.notified() => break,
        }
    }

    drop(listener);
    let open = active_connections.load(Ordering::SeqCst);
    logger::log_shutdown(open);

    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    if drain(&active_connections, grace).await {
        logger::log_info("[Shutdown] All connections closed");
    } else {
        logger::log_warning(&format!(
            "[Shutdown] Grace period of {}s elapsed with {} connection(s) still open",
            grace.as_secs(),
            active_connections.load(Ordering::SeqCst)
        ));
    }

    Ok(())
}

/// Wait until no connection is open, or `grace` passes
///
/// Returns whether every connection finished in time.
async fn drain(active_connections: &AtomicUsize, grace: Duration) -> bool {
    let wait = async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    };
    tokio::time::timeout(grace, wait).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let counter = AtomicUsize::new(0);
        assert!(drain(&counter, Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let counter = AtomicUsize::new(2);
        assert!(!drain(&counter, Duration::from_millis(120)).await);
    }

    #[tokio::test]
    async fn test_drain_waits_for_close() {
        let counter = Arc::new(AtomicUsize::new(1));
        let closer = Arc::clone(&counter);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            closer.fetch_sub(1, Ordering::SeqCst);
        });
        assert!(drain(&counter, Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from("definitely-missing-config").unwrap();
        config.storage.public_dir = dir.path().display().to_string();
        config.storage.uploads_dir = dir.path().join("uploads").display().to_string();
        config.logging.access_log = false;
        config.performance.shutdown_grace = 1;
        let state = Arc::new(AppState::new(config).unwrap());

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async move {
                let server =
                    tokio::task::spawn_local(start_server_loop(listener, state, Arc::clone(&shutdown)));

                let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(b"GET /about HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .await
                    .unwrap();
                let mut response = String::new();
                stream.read_to_string(&mut response).await.unwrap();
                assert!(response.starts_with("HTTP/1.1 200 OK"));
                assert!(response.contains("<title>About Page</title>"));

                shutdown.notify_one();
                server.await.unwrap().unwrap();
            })
            .await;
    }
}
