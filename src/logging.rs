use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout carries only rendered pages. `RUST_LOG` overrides
/// the default `warn` level.
pub fn init() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
