use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global subscriber. `VOLLEY_LOG` wins over `RUST_LOG`; without
/// either, `--verbose` selects debug and the default is info.
pub fn init_logging(verbose: bool, no_color: bool) {
    let filter = std::env::var("VOLLEY_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| default_filter(verbose),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| default_filter(verbose)),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}
