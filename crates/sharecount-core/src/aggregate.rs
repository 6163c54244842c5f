//! Fan-out of platform dispatches and the fan-in join.
//!
//! One tokio task is spawned per applicable platform. Every task owns a clone
//! of both channel senders and reports exactly once, so the join waits on
//! both receivers until the live counter reaches zero. Should a task die
//! without reporting, the channels close once all senders are dropped and the
//! missing platforms are recorded as lost rather than waited on forever.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::CollectorConfig;
use crate::dispatch::dispatch_and_report;
use crate::error::CollectError;
use crate::http_client::HttpClientFactory;
use crate::platform::PlatformDescriptor;
use crate::stat::RawStat;

/// Everything the join collected, in arrival order.
#[derive(Debug, Default)]
pub struct JoinOutcome {
    pub stats: Vec<RawStat>,
    pub errors: Vec<CollectError>,
}

/// Dispatches every platform concurrently and waits for all of them.
pub async fn join_platforms(
    platforms: Vec<Arc<PlatformDescriptor>>,
    resolved_url: &str,
    config: Arc<CollectorConfig>,
    factory: Arc<dyn HttpClientFactory>,
) -> JoinOutcome {
    let (result_tx, mut result_rx) = mpsc::unbounded_channel();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel();
    let resolved_url: Arc<str> = Arc::from(resolved_url);

    let mut pending: Vec<String> = Vec::with_capacity(platforms.len());
    for platform in platforms {
        pending.push(platform.name().to_owned());
        tokio::spawn(dispatch_and_report(
            platform,
            Arc::clone(&resolved_url),
            Arc::clone(&config),
            Arc::clone(&factory),
            result_tx.clone(),
            error_tx.clone(),
        ));
    }
    drop(result_tx);
    drop(error_tx);

    let mut outcome = JoinOutcome::default();
    let mut remaining = pending.len();

    while remaining > 0 {
        tokio::select! {
            Some(stat) = result_rx.recv() => {
                info!(platform = %stat.name, "platform reported");
                settle(&mut pending, &stat.name);
                outcome.stats.push(stat);
            }
            Some(error) = error_rx.recv() => {
                warn!(platform = error.platform(), code = error.code(), "{error}");
                settle(&mut pending, error.platform());
                outcome.errors.push(error);
            }
            else => break,
        }
        remaining -= 1;
    }

    for platform in pending {
        let error = CollectError::TaskLost { platform };
        warn!(platform = error.platform(), code = error.code(), "{error}");
        outcome.errors.push(error);
    }

    outcome
}

fn settle(pending: &mut Vec<String>, name: &str) {
    if let Some(index) = pending.iter().position(|pending| pending == name) {
        pending.remove(index);
    }
}
