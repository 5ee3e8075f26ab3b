use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::models::Movie;

/// Topical terms used to approximate a popular listing; the first hit of each
/// search contributes one entry.
const POPULAR_TERMS: [&str; 6] = ["avengers", "star wars", "marvel", "batman", "superman", "spider"];

/// Raw search page as the provider returns it. Success is signalled by the
/// `Response` flag, not HTTP status.
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<SearchHit>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
}

/// Raw single-movie record. String-typed throughout; absent fields arrive as
/// the literal sentinel `"N/A"`.
#[derive(Debug, Default, Deserialize)]
pub struct OmdbRecord {
    #[serde(rename = "Response", default)]
    pub response: String,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Plot", default)]
    pub plot: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    #[serde(rename = "Released", default)]
    pub released: String,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: String,
    #[serde(rename = "imdbVotes", default)]
    pub imdb_votes: String,
    #[serde(rename = "Genre", default)]
    pub genre: String,
    #[serde(rename = "Runtime")]
    pub runtime: Option<String>,
    #[serde(rename = "Director")]
    pub director: Option<String>,
    #[serde(rename = "Actors")]
    pub actors: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Rated")]
    pub rated: Option<String>,
}

/// HTTP client for the provider, query-string authenticated.
pub struct OmdbClient {
    http: Client,
    base_url: String,
    api_key: String,
    request_delay: Duration,
}

impl OmdbClient {
    pub fn new(config: &ProviderConfig) -> Self {
        OmdbClient {
            http: Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }

    /// Search by title, hydrating each hit through a detail lookup so results
    /// carry full plots and genres. Any transport or provider failure degrades
    /// to an empty list; it is never surfaced raw.
    pub async fn search(&self, term: &str) -> Vec<Movie> {
        let page = match self.fetch_search_page(&[("s", term), ("type", "movie")]).await {
            Ok(page) => page,
            Err(err) => {
                warn!("Provider search for {:?} failed: {}", term, err);
                return Vec::new();
            }
        };

        self.hydrate_hits(page.search).await
    }

    /// Fetch one movie by its provider identifier. Both "absent" and "provider
    /// error" come back as `None`; callers cannot and must not distinguish.
    pub async fn lookup(&self, id: &str) -> Option<Movie> {
        let request = self
            .http
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str()), ("i", id), ("plot", "full")]);

        let record: OmdbRecord = match request.send().await {
            Ok(response) => match response.json().await {
                Ok(record) => record,
                Err(err) => {
                    warn!("Provider returned malformed record for {}: {}", id, err);
                    return None;
                }
            },
            Err(err) => {
                warn!("Provider lookup for {} failed: {}", id, err);
                return None;
            }
        };

        if record.response != "True" {
            debug!("Provider has no record for {}", id);
            return None;
        }

        Some(normalize(record))
    }

    /// List movies released in a given year.
    pub async fn by_year(&self, year: u16) -> Vec<Movie> {
        let year = year.to_string();
        let page = match self
            .fetch_search_page(&[("y", year.as_str()), ("type", "movie")])
            .await
        {
            Ok(page) => page,
            Err(err) => {
                warn!("Provider year listing for {} failed: {}", year, err);
                return Vec::new();
            }
        };

        self.hydrate_hits(page.search).await
    }

    /// Approximate popular listing: first hit of each topical term, with a
    /// fixed inter-request delay to stay under the provider's rate limit. A
    /// failing term is skipped, so the result may be a partial list.
    pub async fn popular(&self) -> Vec<Movie> {
        let mut movies = Vec::new();

        for term in POPULAR_TERMS {
            let mut results = self.search(term).await;
            if results.is_empty() {
                warn!("Skipping popular term {:?}: no results", term);
            } else {
                movies.push(results.remove(0));
            }
            tokio::time::sleep(self.request_delay).await;
        }

        debug!("Assembled {} popular movies", movies.len());
        movies
    }

    async fn fetch_search_page(&self, params: &[(&str, &str)]) -> anyhow::Result<SearchPage> {
        let mut request = self
            .http
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str())]);
        request = request.query(params);

        let page: SearchPage = request.send().await?.json().await?;
        if page.response != "True" {
            anyhow::bail!(
                "provider refused search: {}",
                page.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
        Ok(page)
    }

    // Hydrates concurrently; a failed lookup drops its hit while the rest of
    // the page survives.
    async fn hydrate_hits(&self, hits: Vec<SearchHit>) -> Vec<Movie> {
        let lookups = hits.iter().map(|hit| self.lookup(&hit.imdb_id));
        futures::future::join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Normalization boundary: maps every provider sentinel to a safe default so
/// nothing downstream special-cases "N/A" or missing fields.
pub fn normalize(record: OmdbRecord) -> Movie {
    let vote_count = if is_absent(&record.imdb_votes) {
        0
    } else {
        record.imdb_votes.replace(',', "").parse().unwrap_or(0)
    };

    let vote_average = if is_absent(&record.imdb_rating) {
        0.0
    } else {
        record.imdb_rating.parse().unwrap_or(0.0)
    };

    let genres = if is_absent(&record.genre) {
        Vec::new()
    } else {
        record
            .genre
            .split(',')
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .collect()
    };

    Movie {
        id: record.imdb_id,
        title: text_or(record.title, "Unknown Title"),
        overview: text_or(record.plot, "No description available."),
        poster_path: opt_text(record.poster),
        // The provider carries no backdrop images.
        backdrop_path: None,
        release_date: text_or(record.released, "Unknown"),
        vote_average,
        vote_count,
        popularity: vote_count as f64,
        genres,
        runtime: record.runtime.and_then(opt_text),
        director: record.director.and_then(opt_text),
        actors: record.actors.and_then(opt_text),
        year: record.year.and_then(opt_text),
        rated: record.rated.and_then(opt_text),
    }
}

fn is_absent(value: &str) -> bool {
    value.is_empty() || value == "N/A"
}

fn text_or(value: String, fallback: &str) -> String {
    if is_absent(&value) {
        fallback.to_string()
    } else {
        value
    }
}

fn opt_text(value: String) -> Option<String> {
    if is_absent(&value) {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> OmdbRecord {
        OmdbRecord {
            response: "True".to_string(),
            imdb_id: "tt0468569".to_string(),
            title: "The Dark Knight".to_string(),
            plot: "Batman faces the Joker.".to_string(),
            poster: "https://example.com/poster.jpg".to_string(),
            released: "18 Jul 2008".to_string(),
            imdb_rating: "9.0".to_string(),
            imdb_votes: "2,654,264".to_string(),
            genre: "Action, Crime, Drama".to_string(),
            runtime: Some("152 min".to_string()),
            director: Some("Christopher Nolan".to_string()),
            actors: Some("Christian Bale, Heath Ledger".to_string()),
            year: Some("2008".to_string()),
            rated: Some("PG-13".to_string()),
        }
    }

    #[test]
    fn normalizes_populated_record() {
        let movie = normalize(record());
        assert_eq!(movie.id, "tt0468569");
        assert_eq!(movie.vote_average, 9.0);
        assert_eq!(movie.vote_count, 2_654_264);
        assert_eq!(movie.popularity, 2_654_264.0);
        assert_eq!(movie.genres, vec!["Action", "Crime", "Drama"]);
        assert_eq!(movie.rated.as_deref(), Some("PG-13"));
        assert!(movie.backdrop_path.is_none());
    }

    #[test]
    fn na_rating_normalizes_to_zero() {
        let mut raw = record();
        raw.imdb_rating = "N/A".to_string();
        raw.imdb_votes = "N/A".to_string();
        let movie = normalize(raw);
        assert_eq!(movie.vote_average, 0.0);
        assert_eq!(movie.vote_count, 0);
    }

    #[test]
    fn genre_string_splits_into_trimmed_labels() {
        let mut raw = record();
        raw.genre = "Action, Drama".to_string();
        assert_eq!(normalize(raw).genres, vec!["Action", "Drama"]);
    }

    #[test]
    fn na_genre_normalizes_to_empty() {
        let mut raw = record();
        raw.genre = "N/A".to_string();
        assert!(normalize(raw).genres.is_empty());
    }

    #[test]
    fn absent_text_fields_get_fallbacks() {
        let mut raw = record();
        raw.title = String::new();
        raw.plot = "N/A".to_string();
        raw.poster = "N/A".to_string();
        raw.released = "N/A".to_string();
        raw.director = Some("N/A".to_string());
        let movie = normalize(raw);
        assert_eq!(movie.title, "Unknown Title");
        assert_eq!(movie.overview, "No description available.");
        assert!(movie.poster_path.is_none());
        assert_eq!(movie.release_date, "Unknown");
        assert!(movie.director.is_none());
    }

    #[test]
    fn search_page_parses_failure_flag() {
        let page: SearchPage =
            serde_json::from_str(r#"{"Response":"False","Error":"Movie not found!"}"#)
                .expect("parse");
        assert_eq!(page.response, "False");
        assert_eq!(page.error.as_deref(), Some("Movie not found!"));
        assert!(page.search.is_empty());
    }
}
