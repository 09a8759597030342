//! Response payloads from the TMDb v3 API.
//!
//! Every field is defaulted: TMDb omits keys freely and a partial payload is
//! still useful for enrichment.

use serde::Deserialize;

/// Response from `/search/movie`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub total_results: u64,
}

/// One movie hit from a search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub genre_ids: Vec<u64>,
    pub poster_path: Option<String>,
    pub release_date: String,
}

/// Response from `/genre/movie/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenreListResponse {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Response from `/movie/{id}/credits`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreditsResponse {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CastMember {
    pub name: String,
    pub character: String,
    pub order: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrewMember {
    pub name: String,
    pub job: String,
    pub department: String,
}

/// Response from `/movie/{id}`. Only the fields enrichment reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovieDetails {
    pub id: u64,
    pub imdb_id: Option<String>,
}

/// Response from `/movie/{id}/release_dates`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseDatesResponse {
    pub results: Vec<CountryReleases>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CountryReleases {
    pub iso_3166_1: String,
    pub release_dates: Vec<ReleaseDateEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseDateEntry {
    pub certification: String,
    /// 1 premiere, 2 limited theatrical, 3 theatrical, 4 digital, 5 physical, 6 TV.
    #[serde(rename = "type")]
    pub release_type: u8,
}

/// Theatrical release type code.
pub const RELEASE_THEATRICAL: u8 = 3;
/// Limited theatrical release type code.
pub const RELEASE_THEATRICAL_LIMITED: u8 = 2;

/// Response from `/movie/{id}/videos`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VideosResponse {
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Video {
    pub iso_639_1: String,
    pub iso_3166_1: String,
    pub name: String,
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    pub official: bool,
    /// RFC 3339 timestamp, e.g. `2024-05-01T16:00:12.000Z`.
    pub published_at: Option<String>,
}
