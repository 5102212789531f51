//! Diagnostics logging init.
//!
//! The observation report owns stdout (or the report file); everything
//! tracing-level goes to stderr so the two streams never interleave.

use tracing_subscriber::EnvFilter;

/// Initialize stderr diagnostics. `RUST_LOG` overrides the default filter.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sdm_core=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
