use crate::domain::endpoints_controller::EndpointsController;
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub succeeded: u64,
    pub failed: u64,
}

/// Syncs the service endpoints every `period` until `shutdown` resolves. The first sync happens immediately.
///
/// A failed sync is logged and counted, the next attempt happens on the next tick.
/// A sync that is still in flight when `shutdown` resolves is abandoned.
///
/// # Panics
///
/// Panics if `period` is zero.
#[instrument(skip_all, fields(controller = name))]
pub async fn run(name: &str, controller: Box<dyn EndpointsController>, period: Duration, shutdown: impl Future<Output = ()>) -> SyncStats {
    let mut stats = SyncStats::default();
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!("🔄 Syncing service endpoints every {:?}", period);
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = interval.tick() => {}
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            result = controller.sync_service_endpoints() => match result {
                Ok(()) => {
                    stats.succeeded += 1;
                    debug!("🔄 Syncing service endpoints... OK");
                }
                Err(e) => {
                    stats.failed += 1;
                    warn!("⚠️ Syncing service endpoints... failed, {}", e);
                }
            },
        }
    }

    info!(succeeded = stats.succeeded, failed = stats.failed, "🛑 Stopped syncing service endpoints");
    stats
}
