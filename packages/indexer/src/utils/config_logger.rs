use tracing::info;

use crate::config::Config;

/// Log the effective settings. The database URL carries credentials and is left out.
pub fn log_config(config: &Config) {
    info!(
        "Config settings: tzkt_base_url={}, worker_interval={}s, http_timeout={}s, db_max_connections={}",
        config.tzkt_base_url,
        config.worker_interval.as_secs(),
        config.http_timeout.as_secs(),
        config.db_max_connections
    );

    info!(
        "Startup retry settings: retry_delay={}ms, max_retries={}",
        config.retry_delay, config.max_retries
    );
}
