use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
/// wins over the default level (`info`, or `debug` with `--verbose`).
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Ignore the error: a subscriber may already be set (tests, embedding).
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(atty::is(atty::Stream::Stderr))
                .with_target(false),
        )
        .with(filter_layer)
        .try_init();
}
