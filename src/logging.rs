//! Tracing subscriber setup for binaries embedding this crate.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("sms_outbox=debug,info")
        } else {
            EnvFilter::new("sms_outbox=info,warn")
        }
    })
}

/// Human-readable compact output. `RUST_LOG` overrides the default filter.
pub fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// One JSON object per event, for log shippers.
pub fn init_json_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(tracing_subscriber::fmt::layer().with_target(true).json())
        .init();
}
