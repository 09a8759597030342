//! The metadata provider capability consumed by enrichment.

use crate::error::TmdbError;
use crate::types::{
    CreditsResponse, Genre, MovieDetails, ReleaseDatesResponse, SearchResponse, VideosResponse,
};

/// Read-only movie metadata lookups.
///
/// [`TmdbClient`](crate::TmdbClient) is the production implementation; tests
/// substitute canned responses.
#[allow(async_fn_in_trait)]
pub trait MetadataProvider {
    /// The genre id to name table.
    async fn genres(&self) -> Result<Vec<Genre>, TmdbError>;

    /// Search by title, restricted to a release year.
    async fn search_movies(&self, query: &str, year: i32) -> Result<SearchResponse, TmdbError>;

    async fn credits(&self, movie_id: u64) -> Result<CreditsResponse, TmdbError>;

    /// Detail record, used for the IMDb cross-reference id.
    async fn details(&self, movie_id: u64) -> Result<MovieDetails, TmdbError>;

    async fn release_dates(&self, movie_id: u64) -> Result<ReleaseDatesResponse, TmdbError>;

    async fn videos(&self, movie_id: u64) -> Result<VideosResponse, TmdbError>;
}

impl<P: MetadataProvider> MetadataProvider for &P {
    async fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
        (**self).genres().await
    }

    async fn search_movies(&self, query: &str, year: i32) -> Result<SearchResponse, TmdbError> {
        (**self).search_movies(query, year).await
    }

    async fn credits(&self, movie_id: u64) -> Result<CreditsResponse, TmdbError> {
        (**self).credits(movie_id).await
    }

    async fn details(&self, movie_id: u64) -> Result<MovieDetails, TmdbError> {
        (**self).details(movie_id).await
    }

    async fn release_dates(&self, movie_id: u64) -> Result<ReleaseDatesResponse, TmdbError> {
        (**self).release_dates(movie_id).await
    }

    async fn videos(&self, movie_id: u64) -> Result<VideosResponse, TmdbError> {
        (**self).videos(movie_id).await
    }
}
