use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "warn";

/// Installs the stderr subscriber.
///
/// `LOG_LEVEL` wins over `RUST_LOG`; with neither set only warnings show.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(filter(std::env::var("LOG_LEVEL").ok()))
        .with_writer(std::io::stderr)
        .init();
}

fn filter(log_level: Option<String>) -> EnvFilter {
    log_level
        .filter(|level| !level.trim().is_empty())
        .and_then(|level| EnvFilter::try_new(level.trim()).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}
