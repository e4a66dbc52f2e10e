pub mod config;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod perception;
pub mod proposal;

/// Install the default tracing subscriber. Hosts embedding the engine in a
/// larger process should install their own subscriber instead.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
