//! Bearer-token HTTP client for the TMDb v3 API.

use serde::de::DeserializeOwned;

use crate::error::TmdbError;
use crate::provider::MetadataProvider;
use crate::types::{
    CreditsResponse, Genre, GenreListResponse, MovieDetails, ReleaseDatesResponse,
    SearchResponse, VideosResponse,
};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

const USER_AGENT: &str = concat!("movie-calendar/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the TMDb v3 API, authenticated with a bearer token.
///
/// A client without an API key is valid: every call fails fast with
/// [`TmdbError::MissingApiKey`] and no request is sent.
pub struct TmdbClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: Option<String>) -> Result<Self, TmdbError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a different API root (e.g. a local mock).
    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Result<Self, TmdbError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        let key = self.api_key.as_deref().ok_or(TmdbError::MissingApiKey)?;

        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TmdbError::Unauthorized(status.as_u16()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TmdbError::RateLimit);
        }

        let text = resp.text().await?;
        if !status.is_success() {
            return Err(TmdbError::ServerError {
                status: status.as_u16(),
                message: truncate(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            TmdbError::Api(format!(
                "Failed to parse {path}: {e}. Response: {}",
                truncate(&text)
            ))
        })
    }
}

impl MetadataProvider for TmdbClient {
    async fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
        let list: GenreListResponse = self
            .get_json("/genre/movie/list", &[("language", "en".to_string())])
            .await?;
        Ok(list.genres)
    }

    async fn search_movies(&self, query: &str, year: i32) -> Result<SearchResponse, TmdbError> {
        self.get_json(
            "/search/movie",
            &[
                ("query", query.to_string()),
                ("language", "en-US".to_string()),
                ("year", year.to_string()),
            ],
        )
        .await
    }

    async fn credits(&self, movie_id: u64) -> Result<CreditsResponse, TmdbError> {
        self.get_json(&format!("/movie/{movie_id}/credits"), &[])
            .await
    }

    async fn details(&self, movie_id: u64) -> Result<MovieDetails, TmdbError> {
        self.get_json(&format!("/movie/{movie_id}"), &[]).await
    }

    async fn release_dates(&self, movie_id: u64) -> Result<ReleaseDatesResponse, TmdbError> {
        self.get_json(&format!("/movie/{movie_id}/release_dates"), &[])
            .await
    }

    async fn videos(&self, movie_id: u64) -> Result<VideosResponse, TmdbError> {
        self.get_json(&format!("/movie/{movie_id}/videos"), &[])
            .await
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(200).collect()
}
