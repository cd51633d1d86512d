use std::io::IsTerminal;
use tracing_subscriber::{fmt, EnvFilter};

/// Directives used when `RUST_LOG` is unset or unparsable; sqlx statement logs stay quiet
pub const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

fn delegations_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber for the worker and the backfill binary.
pub fn init_logger() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let installed = fmt()
        .with_env_filter(delegations_filter(directives.as_deref()))
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(std::io::stdout().is_terminal())
        .try_init();

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}
