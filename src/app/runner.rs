use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::domain::run::TestConfig;
use crate::error::{AppError, AppResult, MetricsError};
use crate::http::{self, CancelFlag, RequestPlan, WorkerContext};
use crate::metrics::RequestStats;
use crate::shutdown::ShutdownReceiver;

pub(crate) struct RunOutcome {
    pub(crate) stats: RequestStats,
    pub(crate) workers: usize,
    pub(crate) elapsed: Duration,
}

/// Runs the load test and folds every worker's stats into one.
///
/// The transport is built before any worker starts, so bad TLS material
/// aborts the run with nothing sent. A stop signal only sets the shared
/// cancellation flag; the run still waits for one result per worker.
///
/// # Errors
///
/// Returns an error when the client or request cannot be built, when stats
/// cannot be merged, or when a worker exits without reporting.
pub(crate) async fn run_load(
    config: &TestConfig,
    mut shutdown_rx: ShutdownReceiver,
) -> AppResult<RunOutcome> {
    let client = http::build_client(&config.transport)?;
    let plan = Arc::new(RequestPlan::from_config(config)?);
    let empty_stats = RequestStats::for_duration(config.duration)?;
    let mut global = empty_stats.clone();

    let workers = config.workers.get();
    let cancel = Arc::new(CancelFlag::new());
    let (result_tx, mut result_rx) = mpsc::channel::<RequestStats>(workers);

    info!(
        "Running {}s test @ {} with {} workers",
        config.duration.as_secs(),
        plan.url(),
        workers
    );

    let started = Instant::now();
    let mut handles = Vec::with_capacity(workers);
    for id in 0..workers {
        let context = WorkerContext {
            id,
            client: client.clone(),
            plan: Arc::clone(&plan),
            cancel: Arc::clone(&cancel),
            duration: config.duration,
        };
        handles.push(http::spawn_worker(
            context,
            empty_stats.clone(),
            result_tx.clone(),
        ));
    }
    drop(result_tx);

    let mut received: usize = 0;
    let mut listen_for_stop = true;
    while received < workers {
        tokio::select! {
            result = result_rx.recv() => {
                let Some(stats) = result else {
                    return Err(AppError::metrics(MetricsError::MissingWorkerResults {
                        expected: workers,
                        received,
                    }));
                };
                global.merge(&stats)?;
                received = received.saturating_add(1);
                debug!("Collected {}/{} worker results", received, workers);
            }
            signal = shutdown_rx.recv(), if listen_for_stop => {
                match signal {
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        if cancel.cancel() {
                            info!("Stop requested; waiting for in-flight requests to finish.");
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => listen_for_stop = false,
                }
            }
        }
    }
    let elapsed = started.elapsed();

    for handle in handles {
        handle.await?;
    }

    Ok(RunOutcome {
        stats: global,
        workers,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::num::NonZeroUsize;
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::domain::run::TransportConfig;
    use crate::error::ConfigError;
    use crate::metrics::RunReport;
    use crate::shutdown_handlers::shutdown_channel;
    use crate::test_support::{closed_port_url, spawn_http_server, spawn_http_server_with_delay};

    const OK_RESPONSE: &[u8] =
        b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK";

    fn run_async_test<F>(future: F) -> Result<(), String>
    where
        F: Future<Output = Result<(), String>>,
    {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|err| format!("Failed to build runtime: {}", err))?;
        runtime.block_on(future)
    }

    fn test_config(url: &str, workers: usize, duration: Duration) -> Result<TestConfig, String> {
        Ok(TestConfig {
            duration,
            workers: NonZeroUsize::new(workers).ok_or_else(|| "zero workers".to_owned())?,
            url: url.to_owned(),
            method: reqwest::Method::GET,
            body: None,
            headers: Vec::new(),
            host: None,
            transport: TransportConfig {
                timeout: Duration::from_secs(2),
                http2: true,
                ..TransportConfig::default()
            },
        })
    }

    #[test]
    fn collects_one_result_per_worker() -> Result<(), String> {
        run_async_test(async {
            let server = spawn_http_server(OK_RESPONSE)?;
            let config = test_config(&server.url, 3, Duration::from_secs(1))?;
            let (shutdown_tx, shutdown_rx) = shutdown_channel();

            let outcome = run_load(&config, shutdown_rx)
                .await
                .map_err(|err| err.to_string())?;
            drop(shutdown_tx);

            if outcome.workers != 3 {
                return Err(format!("Unexpected worker count {}", outcome.workers));
            }
            let stats = &outcome.stats;
            if stats.successes == 0 {
                return Err("Expected successful requests".to_owned());
            }
            if stats.histogram.count() != stats.successes {
                return Err("Histogram count must equal successes".to_owned());
            }
            if stats.bytes != stats.successes.saturating_mul(42) {
                return Err(format!(
                    "Unexpected bytes {} for {} successes",
                    stats.bytes, stats.successes
                ));
            }
            if outcome.elapsed < Duration::from_secs(1) {
                return Err(format!("Run ended early: {:?}", outcome.elapsed));
            }
            Ok(())
        })
    }

    #[test]
    fn stop_signal_cancels_but_still_collects_all_results() -> Result<(), String> {
        run_async_test(async {
            let server = spawn_http_server_with_delay(OK_RESPONSE, Duration::from_millis(20))?;
            let config = test_config(&server.url, 4, Duration::from_secs(60))?;
            let (shutdown_tx, shutdown_rx) = shutdown_channel();

            let stopper = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                drop(shutdown_tx.send(()));
                drop(shutdown_tx.send(()));
            });

            let outcome = tokio::time::timeout(Duration::from_secs(10), run_load(&config, shutdown_rx))
                .await
                .map_err(|_err| "Run did not stop after the stop signal".to_owned())?
                .map_err(|err| err.to_string())?;
            stopper.await.map_err(|err| err.to_string())?;

            if outcome.workers != 4 || outcome.stats.successes == 0 {
                return Err(format!(
                    "Unexpected outcome: {} workers, {} successes",
                    outcome.workers, outcome.stats.successes
                ));
            }
            Ok(())
        })
    }

    #[test]
    fn unreachable_target_is_degenerate() -> Result<(), String> {
        run_async_test(async {
            let url = closed_port_url()?;
            let config = test_config(&url, 2, Duration::from_millis(300))?;
            let (_shutdown_tx, shutdown_rx) = shutdown_channel();

            let outcome = run_load(&config, shutdown_rx)
                .await
                .map_err(|err| err.to_string())?;
            let stats = &outcome.stats;
            if stats.successes != 0 || stats.failures == 0 {
                return Err(format!("Unexpected counts {}/{}", stats.successes, stats.failures));
            }
            if stats.errors.total() != stats.failures {
                return Err("Every transport failure should be tallied".to_owned());
            }
            let report = RunReport::from_stats(stats, outcome.workers, outcome.elapsed);
            if !report.is_degenerate() {
                return Err("Expected a degenerate report".to_owned());
            }
            Ok(())
        })
    }

    #[test]
    fn bad_tls_material_aborts_before_any_request() -> Result<(), String> {
        run_async_test(async {
            let server = spawn_http_server(OK_RESPONSE)?;
            let mut config = test_config(&server.url, 2, Duration::from_secs(1))?;
            config.transport.client_cert = Some(PathBuf::from("client.pem"));
            let (_shutdown_tx, shutdown_rx) = shutdown_channel();

            match run_load(&config, shutdown_rx).await {
                Err(AppError::Config(ConfigError::MissingClientKey)) => {}
                Err(err) => return Err(format!("Unexpected error: {}", err)),
                Ok(_) => return Err("Expected configuration error".to_owned()),
            }
            if server.requests.try_recv().is_ok() {
                return Err("No request should reach the server".to_owned());
            }
            Ok(())
        })
    }
}
