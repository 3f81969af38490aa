use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::http::{AuthenticatedClient, RefreshOutcome};

/// Handle to the proactive refresh loop.
pub struct RefreshTimer {
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    pub fn stop(self) {
        self.handle.abort();
        info!("token refresh timer stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Checks the access token immediately and then every `every`, refreshing it
/// once less than `threshold` of its lifetime remains.
pub fn start_refresh_timer(
    client: Arc<AuthenticatedClient>,
    every: Duration,
    threshold: Duration,
) -> RefreshTimer {
    let handle = tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_secs = every.as_secs(),
            threshold_secs = threshold.as_secs(),
            "token refresh timer started"
        );

        loop {
            ticker.tick().await;

            let client = Arc::clone(&client);
            let tick = tokio::spawn(async move { client.refresh_if_needed(threshold).await });
            match tick.await {
                Ok(Ok(RefreshOutcome::Refreshed)) => info!("access token refreshed ahead of expiry"),
                Ok(Ok(outcome)) => debug!(?outcome, "refresh tick"),
                Ok(Err(err)) => warn!(error = %err, "proactive token refresh failed"),
                Err(err) if err.is_panic() => error!("refresh tick panicked"),
                Err(err) => warn!(error = %err, "refresh tick cancelled"),
            }
        }
    });

    RefreshTimer { handle }
}
