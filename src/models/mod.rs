// Canonical record types shared across the crate. Provider responses and store
// documents are parsed into these at the boundary; nothing downstream handles
// raw provider sentinels or untyped document fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A movie as the rest of the application sees it. Always fully populated:
/// the provider adapter maps absent numeric fields to 0 and absent text to
/// fallback strings, so consumers never branch on "missing".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Opaque identifier from the source provider (IMDb id). Stable across
    /// repeated fetches from the same provider.
    pub id: String,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    /// The provider carries no backdrop images; kept for shape compatibility.
    pub backdrop_path: Option<String>,
    /// Free text, not guaranteed parseable as a date.
    pub release_date: String,
    pub vote_average: f64,
    pub vote_count: u64,
    /// Popularity proxy; the provider has no native popularity metric, so the
    /// vote count stands in for it.
    pub popularity: f64,
    pub genres: Vec<String>,
    pub runtime: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub year: Option<String>,
    pub rated: Option<String>,
}

/// A stored review. One review per (movie, author) pair is a client-side
/// convention, not enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Assigned by the store on creation.
    #[serde(default)]
    pub id: String,
    pub movie_id: String,
    pub movie_title: String,
    pub user_id: String,
    pub user_email: String,
    pub user_display_name: String,
    /// Integer stars, 1..=5 inclusive.
    pub rating: u8,
    pub review_text: String,
    // Optional because the store is schemaless and legacy documents may lack
    // timestamps; such entries sort as oldest.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields a caller supplies when creating a review; the store fills in id and
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub movie_id: String,
    pub movie_title: String,
    pub user_id: String,
    pub user_email: String,
    pub user_display_name: String,
    pub rating: u8,
    pub review_text: String,
}

/// Mutable subset of a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    pub rating: u8,
    pub review_text: String,
}

/// Stored user profile document, keyed by the authenticated account id.
/// `review_count` is a denormalized counter maintained incrementally by the
/// review store; it is eventually consistent with the review collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
    // Absent on legacy documents; readers fall back to counting reviews.
    #[serde(default)]
    pub review_count: Option<i64>,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "user".to_string()
}

/// Append-only contact form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The authenticated principal as reported by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: String,
}
