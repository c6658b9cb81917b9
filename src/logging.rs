//! Diagnostic logging to stderr
//!
//! Filter precedence: `TAGKEEP_LOG`, then `RUST_LOG`, then `-v` (debug),
//! then the configured `log_level`, then `warn`.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "TAGKEEP_LOG";

/// Install the global subscriber; a second call is a no-op
pub fn init(verbose: bool, configured: Option<&str>) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback_directive(verbose, configured)));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false),
    );

    // Already installed (tests, embedding hosts)
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn fallback_directive(verbose: bool, configured: Option<&str>) -> String {
    if verbose {
        return "tagkeep=debug".to_string();
    }
    configured
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or("warn")
        .to_string()
}
