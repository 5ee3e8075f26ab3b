// HTTP surface. This is the seam where a view layer attaches; handlers stay
// thin and delegate to the catalog, review store, profile assembler, and auth
// service.

use axum::{
    extract::{Path as AxumPath, Query, State},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    aggregate,
    app_state::AppState,
    error::{AppError, AppResult},
    models::{ReviewDraft, ReviewPatch},
};

// Request/query types

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct ViewerQuery {
    pub viewer: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub user_id: String,
    pub rating: u8,
    pub review_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReviewQuery {
    pub user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

// Movie handlers

pub async fn list_movies_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let movies = state.catalog.list_popular().await;
    Ok(Json(json!({ "movies": movies })))
}

pub async fn search_movies_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Value>> {
    let term = params.q.unwrap_or_default();
    let movies = state.catalog.search(&term).await;
    Ok(Json(json!({ "movies": movies })))
}

pub async fn movies_by_year_handler(
    State(state): State<AppState>,
    AxumPath(year): AxumPath<u16>,
) -> AppResult<Json<Value>> {
    let movies = state.catalog.by_year(year).await;
    Ok(Json(json!({ "movies": movies })))
}

pub async fn get_movie_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> AppResult<Json<Value>> {
    match state.catalog.get(&id).await {
        Some(movie) => Ok(Json(json!({ "movie": movie }))),
        None => Err(AppError::NotFound(format!("Movie {} not found", id))),
    }
}

/// Reviews for a movie plus the derived stats the detail view renders. When a
/// viewer id is supplied, reports whether that viewer already reviewed the
/// movie so the caller can switch between submit and update affordances.
pub async fn movie_reviews_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Query(params): Query<ViewerQuery>,
) -> AppResult<Json<Value>> {
    let reviews = state.reviews.list_by_movie(&id).await?;

    let mut body = json!({
        "reviews": reviews,
        "averageRating": aggregate::average_rating(&reviews),
        "reviewCount": aggregate::review_count(&reviews),
    });
    if let Some(viewer) = params.viewer {
        body["hasReviewed"] = json!(aggregate::has_reviewed(&reviews, &viewer));
    }

    Ok(Json(body))
}

// Review handlers

pub async fn create_review_handler(
    State(state): State<AppState>,
    Json(draft): Json<ReviewDraft>,
) -> AppResult<Json<Value>> {
    let review = state.reviews.create(draft).await?;
    Ok(Json(json!({ "review": review })))
}

pub async fn update_review_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<UpdateReviewRequest>,
) -> AppResult<Json<Value>> {
    authorize_author(&state, &id, &req.user_id).await?;

    let patch = ReviewPatch {
        rating: req.rating,
        review_text: req.review_text,
    };
    let review = state.reviews.update(&id, patch).await?;
    Ok(Json(json!({ "review": review })))
}

pub async fn delete_review_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Query(params): Query<DeleteReviewQuery>,
) -> AppResult<Json<Value>> {
    authorize_author(&state, &id, &params.user_id).await?;

    state.reviews.delete(&id, &params.user_id).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// Review mutations are gated by comparing the acting user id against the
/// stored author id here, at the surface; the store layer does not re-check.
async fn authorize_author(state: &AppState, review_id: &str, user_id: &str) -> AppResult<()> {
    let review = state
        .reviews
        .get(review_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review {} not found", review_id)))?;

    if review.user_id != user_id {
        return Err(AppError::Forbidden("Only the author may modify a review".to_string()));
    }
    Ok(())
}

// User handlers

pub async fn user_reviews_handler(
    State(state): State<AppState>,
    AxumPath(uid): AxumPath<String>,
) -> AppResult<Json<Value>> {
    let reviews = state.reviews.list_by_author(&uid).await?;
    Ok(Json(json!({ "reviews": reviews })))
}

pub async fn user_profile_handler(
    State(state): State<AppState>,
    AxumPath(uid): AxumPath<String>,
) -> AppResult<Json<Value>> {
    let view = state.profiles.assemble(&uid).await?;
    Ok(Json(json!({ "profile": view })))
}

// Auth handlers

pub async fn register_handler(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<Value>> {
    let user = state
        .auth
        .register(&req.email, &req.password, &req.confirm_password, &req.display_name)
        .await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    let user = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn logout_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.auth.logout();
    Ok(Json(json!({ "loggedOut": true })))
}

// Contact handler

pub async fn contact_handler(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> AppResult<Json<Value>> {
    let id = state.contact.submit(&req.name, &req.email, &req.message).await?;
    Ok(Json(json!({ "id": id })))
}

// Create unified router
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        // Catalog operations
        .route("/movies", get(list_movies_handler))
        .route("/movies/search", get(search_movies_handler))
        .route("/movies/year/{year}", get(movies_by_year_handler))
        .route("/movies/{id}", get(get_movie_handler))
        .route("/movies/{id}/reviews", get(movie_reviews_handler))
        // Review operations
        .route("/reviews", post(create_review_handler))
        .route("/reviews/{id}", put(update_review_handler))
        .route("/reviews/{id}", delete(delete_review_handler))
        // User operations
        .route("/users/{uid}/reviews", get(user_reviews_handler))
        .route("/users/{uid}/profile", get(user_profile_handler))
        // Auth operations
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        // Contact log
        .route("/contact", post(contact_handler))
        .with_state(state)
}
