//! Candidate-by-candidate title search.

use crate::error::TmdbError;
use crate::provider::MetadataProvider;
use crate::types::SearchResult;

/// Result of a successful title search.
#[derive(Debug, Clone)]
pub struct LookupResult {
    /// First hit returned for the winning candidate.
    pub movie: SearchResult,
    /// The candidate string that produced the hit.
    pub candidate: String,
}

/// Search each candidate in order until one returns at least one result.
///
/// Later candidates are not tried once a match is found. An empty candidate
/// list, or no hits for any candidate, yields [`TmdbError::NotFound`]. Any
/// provider failure stops the search and is returned as-is. `is_disabled` is
/// consulted before each request so a tripped breaker halts the loop without
/// another call.
pub async fn find_movie<P: MetadataProvider>(
    provider: &P,
    candidates: &[String],
    year: i32,
    is_disabled: impl Fn() -> bool,
) -> Result<LookupResult, TmdbError> {
    let mut warnings = Vec::new();

    for candidate in candidates {
        if is_disabled() {
            return Err(TmdbError::CircuitOpen);
        }

        let response = provider.search_movies(candidate, year).await?;
        match response.results.into_iter().next() {
            Some(movie) => {
                return Ok(LookupResult {
                    movie,
                    candidate: candidate.clone(),
                });
            }
            None => {
                warnings.push(format!("'{}' ({}) not found on TMDb", candidate, year));
            }
        }
    }

    Err(TmdbError::NotFound { warnings })
}
