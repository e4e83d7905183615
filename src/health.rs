// [business] Liveness monitoring - static endpoint plus a periodic database check
use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::db::WorkerStore;

// [business] Health check endpoint for monitoring and load balancers
pub async fn health_check() -> &'static str {
    "OK"
}

// [business] One database check; failures are reported, never propagated
pub async fn check_database(store: &dyn WorkerStore) -> bool {
    match store.ping().await {
        Ok(()) => {
            info!("Health check: database reachable");
            true
        }
        Err(e) => {
            error!("Health check: database unreachable: {}", e);
            false
        }
    }
}

// [rust] Spawn the check loop on the runtime; the handle lets callers abort it
pub fn spawn_health_monitor(store: Arc<dyn WorkerStore>, interval: Duration) -> JoinHandle<()> {
    // [rust] tokio's interval panics on a zero period
    let interval = if interval.is_zero() {
        Duration::from_secs(1)
    } else {
        interval
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            check_database(store.as_ref()).await;
        }
    })
}
