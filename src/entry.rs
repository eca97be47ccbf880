use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::error;

use crate::adapters::cli::to_test_config;
use crate::app::{self, RunOutcome};
use crate::args::BenchArgs;
use crate::error::AppResult;
use crate::metrics::RunReport;
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};

/// Parses the command line, runs the load test and prints the report.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, for transport
/// setup failures, and when the run itself cannot complete.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;

    if let Some(config) = crate::config::load_config(&args)? {
        crate::config::apply_config(&mut args, &matches, &config)?;
    }

    crate::logger::init_logging(args.verbose, args.no_color);

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if args.threads > 0 {
        builder.worker_threads(args.threads);
    }
    let runtime = builder.enable_all().build()?;

    runtime.block_on(run_async(&args)).inspect_err(|err| {
        error!("{}", err);
    })
}

fn parse_args() -> AppResult<(BenchArgs, ArgMatches)> {
    let matches = BenchArgs::command().get_matches();
    let args = BenchArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

async fn run_async(args: &BenchArgs) -> AppResult<()> {
    let config = to_test_config(args)?;

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let outcome = app::run_load(&config, shutdown_rx).await;

    drop(shutdown_tx.send(()));
    signal_handle.await?;

    let RunOutcome {
        stats,
        workers,
        elapsed,
    } = outcome?;
    let report = RunReport::from_stats(&stats, workers, elapsed);
    app::summary::print_report(&report, &config.url);
    Ok(())
}
