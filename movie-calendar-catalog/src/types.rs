//! Data model types for the movie release catalog.
//!
//! These types represent the persistent record set (movies and their trailer
//! links), the provider-derived enrichment applied to them, and the result of a
//! reconciliation run.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Description stored when the metadata provider has nothing better.
pub const DEFAULT_DESCRIPTION: &str = "No description available";

// ── Schedule ────────────────────────────────────────────────────────────────

/// One surviving anchor group from a schedule page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Anchor text as it appears on the page, trimmed.
    pub raw_title: String,
    /// Link with protocol-relative URLs rewritten to `https:`.
    pub link: String,
    pub release_date: NaiveDate,
}

// ── Movie ───────────────────────────────────────────────────────────────────

/// A movie release as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    /// Identity key: `{normalized title}_{YYYY-MM-DD}`.
    pub id: String,
    pub title: String,
    pub release_date: NaiveDate,
    pub source_url: String,
    pub description: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub poster_url: String,
    /// Provider numeric id, 0 when unresolved.
    pub external_id: u64,
    /// Cross-reference id (IMDb), empty when unresolved.
    pub cross_reference_id: String,
    /// US certification, empty when unresolved.
    pub content_rating: String,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub trailers: Vec<TrailerLink>,
    pub scraped_at: DateTime<Utc>,
}

impl MovieRecord {
    /// Build a freshly enriched record.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        release_date: NaiveDate,
        source_url: impl Into<String>,
        enrichment: Enrichment,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        let mut record = Self {
            id: id.into(),
            title: title.into(),
            release_date,
            source_url: source_url.into(),
            description: String::new(),
            genres: Vec::new(),
            poster_url: String::new(),
            external_id: 0,
            cross_reference_id: String::new(),
            content_rating: String::new(),
            directors: Vec::new(),
            cast: Vec::new(),
            trailers: Vec::new(),
            scraped_at,
        };
        record.apply(enrichment, scraped_at);
        record
    }

    /// Merge provider-derived fields into the record.
    ///
    /// A field is only replaced when the enrichment carries a value for it, so
    /// a degraded lookup never erases metadata resolved by an earlier run.
    /// Returns whether anything changed; the enrichment time is stamped only
    /// then.
    pub fn apply(&mut self, enrichment: Enrichment, scraped_at: DateTime<Utc>) -> bool {
        let mut changed = false;

        let description = enrichment.description.trim();
        if !description.is_empty()
            && (description != DEFAULT_DESCRIPTION || self.description.trim().is_empty())
        {
            changed |= replace(&mut self.description, description.to_string());
        }
        if enrichment.external_id != 0 {
            changed |= replace(&mut self.external_id, enrichment.external_id);
        }
        changed |= replace_non_empty(&mut self.genres, enrichment.genres);
        changed |= replace_non_empty(&mut self.poster_url, enrichment.poster_url);
        changed |= replace_non_empty(&mut self.cross_reference_id, enrichment.cross_reference_id);
        changed |= replace_non_empty(&mut self.content_rating, enrichment.content_rating);
        changed |= replace_non_empty(&mut self.directors, enrichment.directors);
        changed |= replace_non_empty(&mut self.cast, enrichment.cast);
        changed |= replace_non_empty(&mut self.trailers, enrichment.trailers);

        if changed {
            self.scraped_at = scraped_at;
        }
        changed
    }

    pub fn release_year(&self) -> i32 {
        self.release_date.year()
    }

    /// Whether the record is missing any provider-derived field and should be
    /// re-enriched on the next run.
    pub fn is_stale(&self) -> bool {
        self.description.trim().is_empty()
            || self.description == DEFAULT_DESCRIPTION
            || self.poster_url.trim().is_empty()
            || self.genres.is_empty()
            || self.external_id == 0
            || self.cross_reference_id.trim().is_empty()
            || self.directors.is_empty()
            || self.cast.is_empty()
            || self.content_rating.trim().is_empty()
            || self.trailers.is_empty()
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Values that count as "nothing resolved".
trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

fn replace_non_empty<T: PartialEq + Blank>(slot: &mut T, value: T) -> bool {
    !value.is_blank() && replace(slot, value)
}

/// A trailer or teaser hosted on a supported video site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailerLink {
    pub name: String,
    pub url: String,
    pub site: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

// ── Enrichment ──────────────────────────────────────────────────────────────

/// Fields resolved from the metadata provider for one title.
///
/// Any subset may be missing: a failed sub-lookup leaves its field at the
/// default while the rest are still applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Enrichment {
    pub external_id: u64,
    pub description: String,
    pub genres: Vec<String>,
    pub poster_url: String,
    pub cross_reference_id: String,
    pub content_rating: String,
    pub directors: Vec<String>,
    pub cast: Vec<String>,
    pub trailers: Vec<TrailerLink>,
}

impl Enrichment {
    /// The result for a title the provider could not match.
    pub fn unresolved() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            ..Self::default()
        }
    }
}

// ── Run outcome ─────────────────────────────────────────────────────────────

/// Result of one reconciliation run.
///
/// A run always produces an outcome. Records committed before a failure are
/// still reported; `error` is the only signal of degradation.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOutcome {
    pub new_records: Vec<MovieRecord>,
    pub updated_records: Vec<MovieRecord>,
    /// Identities removed because they disappeared from the source.
    pub deleted_ids: Vec<String>,
    /// Years whose page was fetched and fully processed.
    pub years_reconciled: Vec<i32>,
    pub error: Option<String>,
}

impl ScrapeOutcome {
    pub fn has_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }

    /// True when the run changed nothing in the store.
    pub fn is_unchanged(&self) -> bool {
        self.new_records.is_empty() && self.updated_records.is_empty() && self.deleted_ids.is_empty()
    }
}
