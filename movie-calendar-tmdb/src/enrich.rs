//! Metadata enrichment for schedule titles.
//!
//! A run starts with [`Enricher::begin_run`], which loads the genre table and
//! returns an [`EnrichContext`]. The context carries every piece of per-run
//! state, including the circuit breaker, so one enricher can serve any number
//! of runs without leakage between them.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use movie_calendar_catalog::title::search_candidates;
use movie_calendar_catalog::types::{DEFAULT_DESCRIPTION, Enrichment, TrailerLink};

use crate::client::POSTER_BASE_URL;
use crate::error::TmdbError;
use crate::lookup;
use crate::provider::MetadataProvider;
use crate::types::{
    CreditsResponse, Genre, RELEASE_THEATRICAL, RELEASE_THEATRICAL_LIMITED,
    ReleaseDatesResponse, SearchResult, VideosResponse,
};

const TOP_CAST: usize = 5;

/// Run-scoped enrichment state.
#[derive(Debug, Default)]
pub struct EnrichContext {
    genres: HashMap<u64, String>,
    disabled: AtomicBool,
    short_circuit_logged: AtomicBool,
}

impl EnrichContext {
    pub fn new(genres: Vec<Genre>) -> Self {
        let mut ctx = Self::default();
        ctx.set_genres(genres);
        ctx
    }

    fn set_genres(&mut self, genres: Vec<Genre>) {
        self.genres = genres.into_iter().map(|g| (g.id, g.name)).collect();
    }

    /// Genre name for an id, or the id itself when the table has no entry.
    pub fn genre_name(&self, id: u64) -> String {
        self.genres
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn genre_count(&self) -> usize {
        self.genres.len()
    }

    /// Whether the circuit breaker has tripped.
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Record a failed provider call.
    ///
    /// Authentication failures trip the breaker; anything else only degrades
    /// the field being fetched.
    pub fn observe(&self, err: &TmdbError, what: &str) {
        match err {
            TmdbError::CircuitOpen => self.note_short_circuit(what),
            TmdbError::NotFound { warnings } => {
                for w in warnings {
                    log::debug!("{}", w);
                }
            }
            e if e.is_auth_failure() => {
                if !self.disabled.swap(true, Ordering::Relaxed) {
                    log::error!("{e}; TMDb lookups disabled for the rest of this run");
                }
            }
            e => log::warn!("TMDb {what} failed: {e}"),
        }
    }

    fn note_short_circuit(&self, what: &str) {
        if !self.short_circuit_logged.swap(true, Ordering::Relaxed) {
            log::warn!("Skipping TMDb {what}: provider disabled for this run");
        }
    }

    /// Await a provider call unless the breaker is open.
    ///
    /// The future is never polled when the breaker is already open, so no
    /// request is issued. Failures are logged and mapped to `None`.
    pub async fn guard<T>(
        &self,
        what: &str,
        call: impl Future<Output = Result<T, TmdbError>>,
    ) -> Option<T> {
        if self.is_disabled() {
            self.note_short_circuit(what);
            return None;
        }
        match call.await {
            Ok(value) => Some(value),
            Err(e) => {
                self.observe(&e, what);
                None
            }
        }
    }
}

/// Resolves provider metadata for a title.
#[allow(async_fn_in_trait)]
pub trait Enricher {
    /// Prepare per-run state. Never fails: an unusable provider yields a
    /// context whose lookups all degrade to defaults.
    async fn begin_run(&self) -> EnrichContext;

    /// Enrich one clean title released in `year`.
    async fn enrich(&self, ctx: &EnrichContext, title: &str, year: i32) -> Enrichment;
}

/// [`Enricher`] backed by a [`MetadataProvider`] such as TMDb.
pub struct TmdbEnricher<P> {
    provider: P,
}

impl<P: MetadataProvider> TmdbEnricher<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: MetadataProvider> Enricher for TmdbEnricher<P> {
    async fn begin_run(&self) -> EnrichContext {
        let mut ctx = EnrichContext::default();
        let genres = ctx.guard("genre list", self.provider.genres()).await;
        if let Some(genres) = genres {
            ctx.set_genres(genres);
            log::debug!("Loaded {} TMDb genres", ctx.genre_count());
        }
        ctx
    }

    async fn enrich(&self, ctx: &EnrichContext, title: &str, year: i32) -> Enrichment {
        let candidates = search_candidates(title);
        let found = match lookup::find_movie(&self.provider, &candidates, year, || {
            ctx.is_disabled()
        })
        .await
        {
            Ok(found) => found,
            Err(e) => {
                ctx.observe(&e, "search");
                return Enrichment::unresolved();
            }
        };

        if found.candidate != title {
            log::debug!("'{}' matched TMDb via '{}'", title, found.candidate);
        }

        let mut enrichment = base_enrichment(ctx, &found.movie);
        if enrichment.external_id == 0 {
            return enrichment;
        }

        let id = enrichment.external_id;
        let (credits, details, releases, videos) = futures::join!(
            ctx.guard("credits", self.provider.credits(id)),
            ctx.guard("details", self.provider.details(id)),
            ctx.guard("release dates", self.provider.release_dates(id)),
            ctx.guard("videos", self.provider.videos(id)),
        );

        if let Some(credits) = credits {
            enrichment.cast = top_cast(&credits);
            enrichment.directors = directors(&credits);
        }
        if let Some(details) = details {
            enrichment.cross_reference_id = details.imdb_id.unwrap_or_default();
        }
        if let Some(releases) = releases {
            enrichment.content_rating = us_rating(&releases);
        }
        if let Some(videos) = videos {
            enrichment.trailers = trailers(videos);
        }

        enrichment
    }
}

fn base_enrichment(ctx: &EnrichContext, movie: &SearchResult) -> Enrichment {
    let description = if movie.overview.trim().is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        movie.overview.trim().to_string()
    };
    let poster_url = movie
        .poster_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| format!("{POSTER_BASE_URL}{p}"))
        .unwrap_or_default();

    Enrichment {
        external_id: movie.id,
        description,
        genres: movie.genre_ids.iter().map(|id| ctx.genre_name(*id)).collect(),
        poster_url,
        ..Enrichment::default()
    }
}

/// First cast members in provider order.
pub fn top_cast(credits: &CreditsResponse) -> Vec<String> {
    credits
        .cast
        .iter()
        .take(TOP_CAST)
        .map(|c| c.name.clone())
        .collect()
}

pub fn directors(credits: &CreditsResponse) -> Vec<String> {
    credits
        .crew
        .iter()
        .filter(|c| c.job == "Director")
        .map(|c| c.name.clone())
        .collect()
}

/// US certification: theatrical first, then limited theatrical, else empty.
pub fn us_rating(releases: &ReleaseDatesResponse) -> String {
    let Some(us) = releases.results.iter().find(|r| r.iso_3166_1 == "US") else {
        return String::new();
    };
    let certified = |release_type: u8| {
        us.release_dates
            .iter()
            .find(|d| d.release_type == release_type && !d.certification.trim().is_empty())
            .map(|d| d.certification.trim().to_string())
    };
    certified(RELEASE_THEATRICAL)
        .or_else(|| certified(RELEASE_THEATRICAL_LIMITED))
        .unwrap_or_default()
}

/// URL for a video on a supported site, `None` for anything else.
pub fn video_url(site: &str, key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    match site {
        "YouTube" => Some(format!("https://www.youtube.com/watch?v={key}")),
        "Vimeo" => Some(format!("https://vimeo.com/{key}")),
        _ => None,
    }
}

/// English/US trailers and teasers on supported sites, oldest first,
/// undated entries last.
pub fn trailers(videos: VideosResponse) -> Vec<TrailerLink> {
    let mut links: Vec<TrailerLink> = videos
        .results
        .into_iter()
        .filter(|v| v.iso_639_1 == "en" && v.iso_3166_1 == "US")
        .filter(|v| v.video_type == "Trailer" || v.video_type == "Teaser")
        .filter_map(|v| {
            let url = video_url(&v.site, &v.key)?;
            Some(TrailerLink {
                name: v.name,
                url,
                site: v.site,
                published_at: v.published_at.as_deref().and_then(parse_timestamp),
            })
        })
        .collect();
    links.sort_by_key(|t| (t.published_at.is_none(), t.published_at));
    links
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
#[path = "tests/enrich_tests.rs"]
mod tests;
