use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::{DelegationResponse, DelegationsFetcher, DelegationsFilter};
use crate::sync::SyncError;

pub const DEFAULT_BASE_URL: &str = "https://api.tzkt.io/";

pub const DELEGATIONS_PATH: &str = "v1/operations/delegations";

/// HTTP client for the TzKT API
#[derive(Clone, Debug)]
pub struct TzktClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TzktClient {
    /// Create a client for `base_url` whose requests give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| SyncError::Validation(format!("invalid TzKT base url {:?}: {}", base_url, e)))?;

        // `join` replaces the last segment unless the base ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("delegations-indexer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        self.base_url
            .join(path)
            .map_err(|e| SyncError::Validation(format!("invalid endpoint {:?}: {}", path, e)))
    }

    async fn get(&self, path: &str, params: &[(&'static str, String)]) -> Result<Vec<u8>, SyncError> {
        let url = self.endpoint(path)?;
        debug!("GET {} {:?}", url, params);

        let response = self.http.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Http(format!(
                "{} returned {}: {}",
                path,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl DelegationsFetcher for TzktClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_delegations(
        &self,
        filter: &DelegationsFilter,
    ) -> Result<Vec<DelegationResponse>, SyncError> {
        filter.validate()?;

        let body = self.get(DELEGATIONS_PATH, &filter.query_params()).await?;

        // An empty body is treated the same as an empty page
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let delegations: Vec<DelegationResponse> = serde_json::from_slice(&body)?;
        debug!("Fetched {} delegations", delegations.len());

        Ok(delegations)
    }
}
