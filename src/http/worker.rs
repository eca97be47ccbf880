use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{RequestError, root_cause_message};
use crate::metrics::RequestStats;

use super::cancel::CancelFlag;
use super::execution::{Exchange, execute};
use super::request::RequestPlan;

/// What one worker needs; the client and plan are shared with its siblings.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub id: usize,
    pub client: Client,
    pub plan: Arc<RequestPlan>,
    pub cancel: Arc<CancelFlag>,
    pub duration: Duration,
}

/// Issues requests back to back until the duration elapses or the run is
/// cancelled. The stop condition is checked before every request, so a
/// cancelled worker finishes at most the request already in flight.
pub async fn run_worker(context: &WorkerContext, mut stats: RequestStats) -> RequestStats {
    let started = Instant::now();
    while started.elapsed() < context.duration && !context.cancel.is_cancelled() {
        let outcome = execute(&context.client, &context.plan).await;
        record_outcome(&mut stats, outcome);
    }
    debug!(
        worker = context.id,
        successes = stats.successes,
        failures = stats.failures,
        "Worker finished"
    );
    stats
}

/// Books one executor outcome. A success of size zero counts as a failure
/// without a tally entry; over HTTP it cannot occur, since the header block
/// alone adds at least two bytes.
pub(super) fn record_outcome(stats: &mut RequestStats, outcome: Result<Exchange, RequestError>) {
    match outcome {
        Ok(exchange) if exchange.size > 0 => {
            stats.record_success(exchange.size, exchange.latency);
        }
        Ok(_) => stats.record_empty(),
        Err(err) => stats.record_error(root_cause_message(&err)),
    }
}

/// Spawns a worker that hands its stats to `result_tx` exactly once on exit.
pub fn spawn_worker(
    context: WorkerContext,
    stats: RequestStats,
    result_tx: mpsc::Sender<RequestStats>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let stats = run_worker(&context, stats).await;
        if result_tx.send(stats).await.is_err() {
            warn!(worker = context.id, "Result receiver dropped before worker finished");
        }
    })
}
