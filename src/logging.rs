//! Logging setup.
//!
//! Logs go to **stderr** so that stdout stays free for whatever the host
//! reads from the provider process. Filtering follows `RUST_LOG`.
//!
//! ```bash
//! # Default: info
//! ./my-provider
//!
//! # Every HTTP call, with truncated response bodies on failure
//! RUST_LOG=minecraft_provider=debug ./my-provider
//! ```
//!
//! The API key is never part of any event.

use tracing_subscriber::{fmt, prelude::*, registry::Registry, EnvFilter};

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn subscriber(default_level: &str) -> impl tracing::Subscriber + Send + Sync + 'static {
    Registry::default().with(filter(default_level)).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Install the global subscriber at `info` unless `RUST_LOG` says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Like [`init_logging`] with a different default level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Try to install the global subscriber; `false` if one is already set.
pub fn try_init_logging() -> bool {
    subscriber("info").try_init().is_ok()
}
