// Seeds the legacy `movies` collection with a handful of sample records.
// Nothing in the primary read path consumes this collection; it exists so a
// fresh database is not empty when poked at directly.

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::{DocumentStore, MOVIES};

pub async fn seed_sample_movies(store: Arc<DocumentStore>) -> Result<()> {
    if store.count(MOVIES).await? > 0 {
        return Ok(());
    }

    let samples = [
        json!({
            "title": "Inception",
            "overview": "A thief who steals corporate secrets through the use of dream-sharing technology is given the inverse task of planting an idea into the mind of a C.E.O.",
            "release_date": "2010-07-16",
            "vote_average": 8.4,
            "vote_count": 35000,
            "popularity": 100.5,
        }),
        json!({
            "title": "The Shawshank Redemption",
            "overview": "Two imprisoned men bond over a number of years, finding solace and eventual redemption through acts of common decency.",
            "release_date": "1994-09-23",
            "vote_average": 9.3,
            "vote_count": 28000,
            "popularity": 95.2,
        }),
        json!({
            "title": "The Dark Knight",
            "overview": "When the menace known as the Joker wreaks havoc and chaos on the people of Gotham, Batman must accept one of the greatest psychological and physical tests of his ability to fight injustice.",
            "release_date": "2008-07-18",
            "vote_average": 9.0,
            "vote_count": 30000,
            "popularity": 110.3,
        }),
    ];

    for movie in &samples {
        store.insert(MOVIES, movie).await?;
    }
    info!("Seeded {} sample movies", samples.len());

    Ok(())
}
