use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ridepool_server::matching::{LockRegistry, Matcher, MatchingConfig};
use ridepool_server::store::{MemoryStore, SnapshotFile};
use ridepool_server::web::{AppState, create_router};

/// Address used when `RIDEPOOL_ADDR` is unset or invalid.
const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = match std::env::var("RIDEPOOL_ADDR") {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("RIDEPOOL_ADDR={raw} is not a socket address ({e}); using default");
            SocketAddr::from(DEFAULT_ADDR)
        }),
        Err(_) => SocketAddr::from(DEFAULT_ADDR),
    };

    // Restore the previous store, if snapshots are enabled
    let snapshot = std::env::var("RIDEPOOL_SNAPSHOT").ok().map(SnapshotFile::new);
    let store = match &snapshot {
        Some(file) => match file.load().expect("Failed to load snapshot") {
            Some(saved) => {
                info!(
                    path = %file.path().display(),
                    requests = saved.requests.len(),
                    rides = saved.rides.len(),
                    "restored snapshot"
                );
                MemoryStore::from_snapshot(saved)
            }
            None => MemoryStore::new(),
        },
        None => {
            warn!("RIDEPOOL_SNAPSHOT not set. Data will be lost on exit.");
            MemoryStore::new()
        }
    };

    // One registry for the whole process
    let locks = Arc::new(LockRegistry::new());
    let matcher = Matcher::new(Arc::new(store), locks, MatchingConfig::default());

    let state = AppState::new(matcher, snapshot);
    let app = create_router(state);

    info!("Ridepool listening on http://{addr}");
    info!("API Endpoints:");
    info!("  GET  /health                      - Health check");
    info!("  POST /requests                    - Create a ride request");
    info!("  GET  /requests/pending            - List pending requests");
    info!("  POST /requests/:id/cancel         - Cancel a pending request");
    info!("  POST /match/trigger               - Run a matching pass");
    info!("  GET  /rides/:id                   - Ride details");
    info!("  POST /rides/:id/accept            - Accept a proposed ride");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
