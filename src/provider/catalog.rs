use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::{CacheConfig, ProviderConfig};
use crate::models::Movie;
use crate::provider::OmdbClient;

/// Catalog read path over the provider client. Keeps a small in-memory LRU of
/// hydrated movies for the lifetime of the process; nothing is persisted.
pub struct MovieCatalog {
    client: OmdbClient,
    cache: Arc<Mutex<LruCache<String, Movie>>>,
}

impl MovieCatalog {
    pub fn new(provider: &ProviderConfig, cache: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(cache.capacity).unwrap_or(NonZeroUsize::MIN);
        MovieCatalog {
            client: OmdbClient::new(provider),
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Approximate popular listing; see the module docs in [`crate::provider`]
    /// for the limitation.
    pub async fn list_popular(&self) -> Vec<Movie> {
        let movies = self.client.popular().await;
        self.remember(&movies).await;
        movies
    }

    /// Title search. A blank term short-circuits to an empty list without
    /// touching the network.
    pub async fn search(&self, term: &str) -> Vec<Movie> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }

        let movies = self.client.search(term).await;
        debug!("Search {:?} produced {} movies", term, movies.len());
        self.remember(&movies).await;
        movies
    }

    /// Movies released in a given year.
    pub async fn by_year(&self, year: u16) -> Vec<Movie> {
        let movies = self.client.by_year(year).await;
        self.remember(&movies).await;
        movies
    }

    /// Single movie by provider id; `None` covers both "absent" and "provider
    /// failed", per the adapter contract.
    pub async fn get(&self, id: &str) -> Option<Movie> {
        if let Some(movie) = self.cache.lock().await.get(id).cloned() {
            return Some(movie);
        }

        let movie = self.client.lookup(id).await?;
        self.cache.lock().await.put(id.to_string(), movie.clone());
        Some(movie)
    }

    async fn remember(&self, movies: &[Movie]) {
        let mut cache = self.cache.lock().await;
        for movie in movies {
            cache.put(movie.id.clone(), movie.clone());
        }
    }
}
