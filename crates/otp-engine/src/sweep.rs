//! Background eviction of expired state.
//!
//! Both stores already check staleness on their read paths; the sweeper
//! only keeps memory bounded when phones stop coming back.

use std::sync::Arc;
use std::time::Duration;

use crate::limiter::RateLimiter;
use crate::store::OtpStore;

/// Periodically purge expired OTP records and idle rate windows until the
/// shutdown channel fires.
pub async fn sweep_worker(
    store: Arc<OtpStore>,
    limiter: Arc<RateLimiter>,
    interval: Duration,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    tracing::info!(interval_secs = interval.as_secs(), "sweeper started");

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                let expired = store.purge_expired().await;
                let idle = limiter.purge_idle().await;
                if expired > 0 || idle > 0 {
                    tracing::debug!(expired, idle, "swept expired state");
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("sweeper shutting down");
                break;
            }
        }
    }
}
