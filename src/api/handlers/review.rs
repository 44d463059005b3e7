//! Review lookup.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ApiResponse, ReviewResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MileageError};

/// `GET /reviews/{reviewId}` — Stored review.
///
/// # Errors
///
/// Returns [`MileageError::ReviewNotFound`] if the id is malformed or unknown.
#[utoipa::path(
    get,
    path = "/api/v1/reviews/{reviewId}",
    tag = "Reviews",
    summary = "Get a review",
    params(
        ("reviewId" = String, Path, description = "Review id returned by an ADD event"),
    ),
    responses(
        (status = 200, description = "Review", body = ApiResponse<ReviewResponse>),
        (status = 404, description = "Review not found", body = ErrorResponse),
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> Result<impl IntoResponse, MileageError> {
    let review = state.review_service.get_review(&review_id).await?;
    Ok(Json(ApiResponse::ok(ReviewResponse::from(review))))
}

/// Review routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reviews/{review_id}", get(get_review))
}
