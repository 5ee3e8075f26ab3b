// Pure aggregation helpers over an in-memory review set.

use crate::models::Review;

/// Arithmetic mean of ratings, rounded to one decimal place. An empty set
/// averages to 0.0, never NaN.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u32 = reviews.iter().map(|r| r.rating as u32).sum();
    let mean = sum as f64 / reviews.len() as f64;
    (mean * 10.0).round() / 10.0
}

pub fn review_count(reviews: &[Review]) -> usize {
    reviews.len()
}

/// Whether the given viewer already has a review in the set. Drives the
/// submit-versus-update affordance and the one-review-per-author convention.
pub fn has_reviewed(reviews: &[Review], user_id: &str) -> bool {
    reviews.iter().any(|r| r.user_id == user_id)
}
