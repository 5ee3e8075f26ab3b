// Review store client. CRUD over the `reviews` collection plus maintenance of
// the denormalized per-user review counter. The counter writes are best-effort
// secondaries: a failure is logged and swallowed, never rolled into the
// primary outcome. Review data is authoritative; the counter is a cache of it.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{Review, ReviewDraft, ReviewPatch};
use crate::store::{Document, DocumentStore, REVIEWS, USERS};

pub struct ReviewStore {
    store: Arc<DocumentStore>,
}

impl ReviewStore {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        ReviewStore { store }
    }

    /// Persist a new review. Validation happens before any write; the counter
    /// increment happens after, and its failure does not undo the review.
    pub async fn create(&self, draft: ReviewDraft) -> AppResult<Review> {
        validate_submission(draft.rating, &draft.review_text)?;

        let now = Utc::now();
        let mut review = Review {
            id: String::new(),
            movie_id: draft.movie_id,
            movie_title: draft.movie_title,
            user_id: draft.user_id,
            user_email: draft.user_email,
            user_display_name: draft.user_display_name,
            rating: draft.rating,
            review_text: draft.review_text.trim().to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };

        let mut data = serde_json::to_value(&review)?;
        if let Some(fields) = data.as_object_mut() {
            fields.remove("id");
        }
        review.id = self.store.insert(REVIEWS, &data).await?;
        info!("Created review {} for movie {}", review.id, review.movie_id);

        // Best-effort secondary write. A stale counter is preferred over
        // losing the review.
        if let Err(err) = self.adjust_review_count(&review.user_id, 1, true).await {
            warn!("Could not update review count for {}: {}", review.user_id, err);
        }

        Ok(review)
    }

    /// Apply a patch to an existing review. Re-stamps `updated_at`, leaves
    /// `created_at` untouched. Authorship is the caller's concern.
    pub async fn update(&self, id: &str, patch: ReviewPatch) -> AppResult<Review> {
        validate_submission(patch.rating, &patch.review_text)?;

        if self.store.get(REVIEWS, id).await?.is_none() {
            return Err(AppError::NotFound(format!("Review {} not found", id)));
        }

        let fields = json!({
            "rating": patch.rating,
            "reviewText": patch.review_text.trim(),
            "updatedAt": Utc::now(),
        });
        self.store.merge(REVIEWS, id, &fields).await?;

        let doc = self
            .store
            .get(REVIEWS, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))?;
        document_to_review(doc)
    }

    /// Remove a review, then best-effort decrement of the author's counter.
    pub async fn delete(&self, id: &str, author_id: &str) -> AppResult<()> {
        let removed = self.store.delete(REVIEWS, id).await?;
        if !removed {
            return Err(AppError::NotFound(format!("Review {} not found", id)));
        }
        info!("Deleted review {}", id);

        if let Err(err) = self.adjust_review_count(author_id, -1, false).await {
            warn!("Could not update review count for {}: {}", author_id, err);
        }

        Ok(())
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<Review>> {
        match self.store.get(REVIEWS, id).await? {
            Some(doc) => Ok(Some(document_to_review(doc)?)),
            None => Ok(None),
        }
    }

    /// All reviews for a movie, newest first. The store returns no particular
    /// order, so sorting happens here; documents without a timestamp sort as
    /// oldest.
    pub async fn list_by_movie(&self, movie_id: &str) -> AppResult<Vec<Review>> {
        let docs = self.store.find_eq(REVIEWS, "movieId", movie_id).await?;
        Ok(sorted_reviews(docs))
    }

    /// All reviews by an author, newest first.
    pub async fn list_by_author(&self, author_id: &str) -> AppResult<Vec<Review>> {
        let docs = self.store.find_eq(REVIEWS, "userId", author_id).await?;
        Ok(sorted_reviews(docs))
    }

    /// One-review-per-(movie, author) is a client-side convention; this is the
    /// check callers run before allowing a second submission.
    pub async fn find_by_movie_and_author(
        &self,
        movie_id: &str,
        author_id: &str,
    ) -> AppResult<Option<Review>> {
        let reviews = self.list_by_movie(movie_id).await?;
        Ok(reviews.into_iter().find(|r| r.user_id == author_id))
    }

    /// Read-modify-write of the denormalized counter. Not atomic; concurrent
    /// adjustments can race, which the design accepts for a best-effort cache.
    async fn adjust_review_count(
        &self,
        user_id: &str,
        delta: i64,
        touch_activity: bool,
    ) -> anyhow::Result<()> {
        let doc = self
            .store
            .get(USERS, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("No profile document for {}", user_id))?;

        let current = doc
            .data
            .get("reviewCount")
            .and_then(Value::as_i64)
            .unwrap_or(0);

        let mut patch = json!({ "reviewCount": (current + delta).max(0) });
        if touch_activity {
            patch["lastActivityAt"] = json!(Utc::now());
        }

        self.store.merge(USERS, user_id, &patch).await
    }
}

fn validate_submission(rating: u8, text: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("Review text must not be empty".to_string()));
    }
    if !(1..=5).contains(&rating) {
        return Err(AppError::Validation("Rating must be between 1 and 5".to_string()));
    }
    Ok(())
}

fn document_to_review(doc: Document) -> AppResult<Review> {
    let mut data = doc.data;
    if let Some(fields) = data.as_object_mut() {
        fields.insert("id".to_string(), json!(doc.id));
    }
    Ok(serde_json::from_value(data)?)
}

fn sorted_reviews(docs: Vec<Document>) -> Vec<Review> {
    let mut reviews: Vec<Review> = docs
        .into_iter()
        .filter_map(|doc| match document_to_review(doc) {
            Ok(review) => Some(review),
            Err(err) => {
                // Schemaless store: tolerate the odd malformed document.
                warn!("Skipping malformed review document: {}", err);
                None
            }
        })
        .collect();

    reviews.sort_by_key(|r| Reverse(r.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)));
    reviews
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_review_text() {
        assert!(validate_submission(3, "   ").is_err());
    }

    #[test]
    fn rejects_out_of_range_ratings() {
        assert!(validate_submission(0, "fine").is_err());
        assert!(validate_submission(6, "fine").is_err());
        for rating in 1..=5 {
            assert!(validate_submission(rating, "fine").is_ok());
        }
    }
}
