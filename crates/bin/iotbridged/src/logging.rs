//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter used when the configured directive cannot be parsed.
pub const DEFAULT_FILTER: &str = "iotbridged=info,iotbridge=info";

/// Install a human-readable subscriber writing to stderr.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), using {DEFAULT_FILTER:?}");
        EnvFilter::new(DEFAULT_FILTER)
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
