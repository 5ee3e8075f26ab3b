use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use cinelog::models::{ReviewDraft, ReviewPatch};
use cinelog::profile::ProfileService;
use cinelog::reviews::ReviewStore;
use cinelog::store::{DocumentStore, REVIEWS, USERS};

async fn test_store() -> (Arc<DocumentStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let store = DocumentStore::new(&url).await.expect("connect");
    store.init().await.expect("init");
    (Arc::new(store), dir)
}

async fn seed_profile(store: &DocumentStore, uid: &str) {
    store
        .put(
            USERS,
            uid,
            &json!({
                "uid": uid,
                "email": format!("{}@example.com", uid),
                "displayName": uid,
                "reviewCount": 0,
                "role": "user",
            }),
        )
        .await
        .expect("seed profile");
}

fn draft(movie_id: &str, user_id: &str, rating: u8, text: &str) -> ReviewDraft {
    ReviewDraft {
        movie_id: movie_id.to_string(),
        movie_title: "Some Movie".to_string(),
        user_id: user_id.to_string(),
        user_email: format!("{}@example.com", user_id),
        user_display_name: user_id.to_string(),
        rating,
        review_text: text.to_string(),
    }
}

async fn stored_count(store: &DocumentStore, uid: &str) -> i64 {
    store
        .get(USERS, uid)
        .await
        .expect("get profile")
        .expect("profile exists")
        .data["reviewCount"]
        .as_i64()
        .expect("counter present")
}

#[tokio::test]
async fn create_assigns_id_and_equal_timestamps() {
    let (store, _dir) = test_store().await;
    let reviews = ReviewStore::new(store.clone());
    seed_profile(&store, "alice").await;

    let review = reviews
        .create(draft("tt0111161", "alice", 5, "A classic."))
        .await
        .expect("create");

    assert!(!review.id.is_empty());
    assert_eq!(review.rating, 5);
    assert_eq!(review.created_at, review.updated_at);

    let fetched = reviews.get(&review.id).await.expect("get").expect("found");
    assert_eq!(fetched.review_text, "A classic.");
    assert_eq!(fetched.user_id, "alice");
}

#[tokio::test]
async fn create_rejects_invalid_submissions_before_writing() {
    let (store, _dir) = test_store().await;
    let reviews = ReviewStore::new(store.clone());
    seed_profile(&store, "alice").await;

    assert!(reviews.create(draft("tt1", "alice", 0, "text")).await.is_err());
    assert!(reviews.create(draft("tt1", "alice", 6, "text")).await.is_err());
    assert!(reviews.create(draft("tt1", "alice", 3, "   ")).await.is_err());

    assert!(reviews.list_by_movie("tt1").await.expect("list").is_empty());
    assert_eq!(stored_count(&store, "alice").await, 0);
}

#[tokio::test]
async fn counter_round_trips_through_create_and_delete() {
    let (store, _dir) = test_store().await;
    let reviews = ReviewStore::new(store.clone());
    seed_profile(&store, "alice").await;

    let review = reviews
        .create(draft("tt0111161", "alice", 4, "Holds up."))
        .await
        .expect("create");
    assert_eq!(stored_count(&store, "alice").await, 1);

    reviews.delete(&review.id, "alice").await.expect("delete");
    assert_eq!(stored_count(&store, "alice").await, 0);
    assert!(reviews.get(&review.id).await.expect("get").is_none());
}

#[tokio::test]
async fn create_survives_missing_profile_document() {
    let (store, _dir) = test_store().await;
    let reviews = ReviewStore::new(store.clone());

    // No profile document exists, so the counter increment fails; the review
    // write must still report success.
    let review = reviews
        .create(draft("tt0068646", "ghost", 5, "An offer you can't refuse."))
        .await
        .expect("create succeeds despite counter failure");

    assert!(!review.id.is_empty());
    let listed = reviews.list_by_movie("tt0068646").await.expect("list");
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn list_by_movie_sorts_newest_first() {
    let (store, _dir) = test_store().await;
    let reviews = ReviewStore::new(store.clone());
    for user in ["a", "b", "c"] {
        seed_profile(&store, user).await;
    }

    let first = reviews
        .create(draft("tt0133093", "a", 3, "first"))
        .await
        .expect("create");
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = reviews
        .create(draft("tt0133093", "b", 4, "second"))
        .await
        .expect("create");
    tokio::time::sleep(Duration::from_millis(5)).await;
    let third = reviews
        .create(draft("tt0133093", "c", 5, "third"))
        .await
        .expect("create");

    let listed = reviews.list_by_movie("tt0133093").await.expect("list");
    let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);
}

#[tokio::test]
async fn reviews_without_timestamps_sort_as_oldest() {
    let (store, _dir) = test_store().await;
    let reviews = ReviewStore::new(store.clone());
    seed_profile(&store, "alice").await;

    // Legacy document with no timestamps, written straight into the store.
    store
        .insert(
            REVIEWS,
            &json!({
                "movieId": "tt0120737",
                "movieTitle": "Some Movie",
                "userId": "legacy",
                "userEmail": "legacy@example.com",
                "userDisplayName": "legacy",
                "rating": 2,
                "reviewText": "old",
            }),
        )
        .await
        .expect("insert legacy");

    let fresh = reviews
        .create(draft("tt0120737", "alice", 5, "new"))
        .await
        .expect("create");

    let listed = reviews.list_by_movie("tt0120737").await.expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, fresh.id);
    assert_eq!(listed[1].user_id, "legacy");
}

#[tokio::test]
async fn update_restamps_modification_time_only() {
    let (store, _dir) = test_store().await;
    let reviews = ReviewStore::new(store.clone());
    seed_profile(&store, "alice").await;

    let review = reviews
        .create(draft("tt0816692", "alice", 3, "decent"))
        .await
        .expect("create");
    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = reviews
        .update(
            &review.id,
            ReviewPatch {
                rating: 5,
                review_text: "grew on me".to_string(),
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.rating, 5);
    assert_eq!(updated.review_text, "grew on me");
    assert_eq!(updated.created_at, review.created_at);
    assert!(updated.updated_at > review.updated_at);
}

#[tokio::test]
async fn update_of_unknown_review_is_not_found() {
    let (store, _dir) = test_store().await;
    let reviews = ReviewStore::new(store);

    let result = reviews
        .update(
            "no-such-id",
            ReviewPatch {
                rating: 4,
                review_text: "text".to_string(),
            },
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn duplicate_check_finds_existing_review() {
    let (store, _dir) = test_store().await;
    let reviews = ReviewStore::new(store.clone());
    seed_profile(&store, "alice").await;

    reviews
        .create(draft("tt0137523", "alice", 4, "talked about it"))
        .await
        .expect("create");

    let existing = reviews
        .find_by_movie_and_author("tt0137523", "alice")
        .await
        .expect("find");
    assert!(existing.is_some());

    let other = reviews
        .find_by_movie_and_author("tt0137523", "bob")
        .await
        .expect("find");
    assert!(other.is_none());
}

#[tokio::test]
async fn profile_view_joins_reviews_and_counter() {
    let (store, _dir) = test_store().await;
    let reviews = Arc::new(ReviewStore::new(store.clone()));
    let profiles = ProfileService::new(store.clone(), reviews.clone());
    seed_profile(&store, "alice").await;

    reviews
        .create(draft("tt0111161", "alice", 4, "good"))
        .await
        .expect("create");
    reviews
        .create(draft("tt0068646", "alice", 5, "great"))
        .await
        .expect("create");

    let view = profiles.assemble("alice").await.expect("assemble");
    assert_eq!(view.display_name, "alice");
    assert_eq!(view.review_count, 2);
    assert_eq!(view.average_given, 4.5);
    assert_eq!(view.reviews.len(), 2);
}

#[tokio::test]
async fn profile_view_falls_back_to_live_count_without_counter() {
    let (store, _dir) = test_store().await;
    let reviews = Arc::new(ReviewStore::new(store.clone()));
    let profiles = ProfileService::new(store.clone(), reviews.clone());

    // Profile document without a reviewCount field.
    store
        .put(
            USERS,
            "bob",
            &json!({
                "uid": "bob",
                "email": "bob@example.com",
                "displayName": "Bob",
                "role": "user",
            }),
        )
        .await
        .expect("put profile");

    // Review written straight into the store, so no counter maintenance ran.
    store
        .insert(
            REVIEWS,
            &json!({
                "movieId": "tt0133093",
                "movieTitle": "Some Movie",
                "userId": "bob",
                "userEmail": "bob@example.com",
                "userDisplayName": "Bob",
                "rating": 3,
                "reviewText": "fine",
            }),
        )
        .await
        .expect("insert review");

    let view = profiles.assemble("bob").await.expect("assemble");
    // The stored counter is absent, so the live review-list length is used.
    assert_eq!(view.review_count, 1);
    assert_eq!(view.average_given, 3.0);
}
