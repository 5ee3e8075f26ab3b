// Profile assembler: joins the stored profile document with the user's review
// list into one display-ready view model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::aggregate;
use crate::error::AppResult;
use crate::models::{Review, UserProfile};
use crate::reviews::ReviewStore;
use crate::store::{DocumentStore, USERS};

/// Display-ready statistics for one user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    /// Profile creation time; defaults to now when the stored document lacks
    /// one. A fallback for rendering, not a guarantee of accuracy.
    pub join_date: DateTime<Utc>,
    /// Stored denormalized counter, falling back to the live review-list
    /// length when the counter is absent.
    pub review_count: i64,
    /// Mean of this user's own ratings, one decimal.
    pub average_given: f64,
    pub role: String,
    pub reviews: Vec<Review>,
}

pub struct ProfileService {
    store: Arc<DocumentStore>,
    reviews: Arc<ReviewStore>,
}

impl ProfileService {
    pub fn new(store: Arc<DocumentStore>, reviews: Arc<ReviewStore>) -> Self {
        ProfileService { store, reviews }
    }

    /// Fetch the profile document and review list concurrently and join them.
    /// Either fetch failing fails the whole call; there is no partial view.
    pub async fn assemble(&self, uid: &str) -> AppResult<ProfileView> {
        let (profile, reviews) =
            tokio::try_join!(self.fetch_profile(uid), self.reviews.list_by_author(uid))?;

        let display_name = profile
            .as_ref()
            .map(|p| p.display_name.clone())
            .or_else(|| reviews.first().map(|r| r.user_display_name.clone()))
            .unwrap_or_default();
        let email = profile
            .as_ref()
            .map(|p| p.email.clone())
            .or_else(|| reviews.first().map(|r| r.user_email.clone()))
            .unwrap_or_default();
        let join_date = profile
            .as_ref()
            .and_then(|p| p.created_at)
            .unwrap_or_else(Utc::now);
        let review_count = profile
            .as_ref()
            .and_then(|p| p.review_count)
            .unwrap_or(reviews.len() as i64);
        let role = profile
            .as_ref()
            .map(|p| p.role.clone())
            .unwrap_or_else(|| "user".to_string());

        Ok(ProfileView {
            uid: uid.to_string(),
            display_name,
            email,
            join_date,
            review_count,
            average_given: aggregate::average_rating(&reviews),
            role,
            reviews,
        })
    }

    async fn fetch_profile(&self, uid: &str) -> AppResult<Option<UserProfile>> {
        match self.store.get(USERS, uid).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc.data)?)),
            None => Ok(None),
        }
    }
}
