//! Schedule page retrieval.

use thiserror::Error;

pub const DEFAULT_SCHEDULE_BASE_URL: &str = "https://www.firstshowing.net";

const USER_AGENT: &str = concat!("movie-calendar/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Schedule page for {year} returned HTTP {status}")]
    Status { year: i32, status: u16 },
}

/// Source of raw schedule markup, one page per year.
#[allow(async_fn_in_trait)]
pub trait ScheduleSource {
    async fn fetch_year(&self, year: i32) -> Result<String, FetchError>;
}

/// Fetches `{base_url}/schedule{year}` over HTTP.
pub struct HttpScheduleFetcher {
    http: reqwest::Client,
    base_url: String,
}

impl HttpScheduleFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_SCHEDULE_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn schedule_url(&self, year: i32) -> String {
        format!("{}/schedule{}", self.base_url, year)
    }
}

impl ScheduleSource for HttpScheduleFetcher {
    async fn fetch_year(&self, year: i32) -> Result<String, FetchError> {
        let resp = self.http.get(self.schedule_url(year)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                year,
                status: status.as_u16(),
            });
        }
        Ok(resp.text().await?)
    }
}
