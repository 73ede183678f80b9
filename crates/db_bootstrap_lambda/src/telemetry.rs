use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

/// Installs a JSON subscriber writing one object per line to stdout.
///
/// CloudWatch stamps every line on ingestion, so the event time is omitted.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(log_filter())
        .with_ansi(false)
        .with_target(false)
        .with_current_span(false)
        .without_time()
        .init();
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
