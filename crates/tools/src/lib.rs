//! Variant Merge Tools
//!
//! Command-line front end for the generator.

pub mod commands;

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` environment variable to override the default filter.
/// Default is `info` everywhere and `debug` for the generator itself.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,variant_merge=debug"));

    fmt().with_env_filter(filter).with_target(false).init();
}
