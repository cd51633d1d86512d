use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::scheduler::DEFAULT_WORKER_INTERVAL;
use crate::tzkt::DEFAULT_BASE_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub tzkt_base_url: String,
    pub worker_interval: Duration,
    pub http_timeout: Duration,
    pub db_max_connections: u32,
    pub retry_delay: u64,
    pub max_retries: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        let _ = dotenv::dotenv();

        let database_url = env::var("DATABASE_URL")
            .context("DATABASE_URL must be set")?;

        let tzkt_base_url = env::var("TZKT_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        // 0 falls back to the scheduler default
        let worker_interval = match parse_var::<u64>("WORKER_INTERVAL", 10)? {
            0 => DEFAULT_WORKER_INTERVAL,
            secs => Duration::from_secs(secs),
        };

        let http_timeout = Duration::from_secs(parse_var("HTTP_TIMEOUT", 45)?);

        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", 10)?;

        let retry_delay = parse_var("RETRY_DELAY", 1000)?; // ms

        let max_retries = parse_var("MAX_RETRIES", 5)?;

        Ok(Config {
            database_url,
            tzkt_base_url,
            worker_interval,
            http_timeout,
            db_max_connections,
            retry_delay,
            max_retries,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}
