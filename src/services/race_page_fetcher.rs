use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::configuration::{FetcherSettings, VenueSettings};

const RETRY_STATUSES: [StatusCode; 3] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::GATEWAY_TIMEOUT,
];

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("race page answered with {0}")]
    Status(StatusCode),
}

impl FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            FetchError::Status(status) => RETRY_STATUSES.contains(status),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// Delay before the `retry`-th retry (1-based): base, 2 * base, 4 * base, ...
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff_base.saturating_mul(factor)
    }
}

#[derive(Serialize)]
struct RaceListQuery<'a> {
    jcd: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hd: Option<String>,
}

pub struct RacePageFetcher {
    client: Client,
    url: String,
    venue_code: String,
    include_date: bool,
    retry_policy: RetryPolicy,
}

impl RacePageFetcher {
    pub fn new(settings: &FetcherSettings, venue: &VenueSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.clone())
            .build()?;

        let retry_policy = RetryPolicy {
            max_retries: settings.max_retries,
            backoff_base: settings.backoff_base(),
        };

        Ok(RacePageFetcher::with_client(client, venue, retry_policy))
    }

    pub fn with_client(client: Client, venue: &VenueSettings, retry_policy: RetryPolicy) -> Self {
        RacePageFetcher {
            client,
            url: venue.url.clone(),
            venue_code: venue.code.clone(),
            include_date: venue.include_date,
            retry_policy,
        }
    }

    pub async fn fetch(&self, today: NaiveDate) -> Result<String, FetchError> {
        let query = RaceListQuery {
            jcd: &self.venue_code,
            hd: match self.include_date {
                true => Some(today.format("%Y%m%d").to_string()),
                false => None,
            },
        };

        let mut retry_count = 0;

        loop {
            match self.fetch_once(&query).await {
                Ok(page_source) => return Ok(page_source),
                Err(e) if e.is_retryable() && retry_count < self.retry_policy.max_retries => {
                    retry_count += 1;
                    let delay = self.retry_policy.backoff(retry_count);
                    log::warn!(
                        "Fetching race page failed, retry {}/{} in {:?}. Error: {}",
                        retry_count,
                        self.retry_policy.max_retries,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, query: &RaceListQuery<'_>) -> Result<String, FetchError> {
        let res = self.client.get(&self.url).query(query).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        Ok(res.text().await?)
    }
}
