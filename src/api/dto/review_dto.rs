//! Review read DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Review;

/// A stored review as returned by `GET /api/v1/reviews/{reviewId}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    /// Review token.
    pub review_id: String,
    /// Author.
    pub user_id: String,
    /// Reviewed place.
    pub place_id: String,
    /// Review text.
    pub content: String,
    /// Attached photo ids, in submission order.
    pub attached_photo_ids: Vec<String>,
    /// Whether this review holds its place's first-review bonus.
    pub first_review_bonus: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            review_id: review.review_id.to_string(),
            user_id: review.user_id,
            place_id: review.place_id,
            content: review.content,
            attached_photo_ids: review.photo_ids,
            first_review_bonus: review.has_first_review_bonus,
            created_at: review.created_at,
            modified_at: review.modified_at,
        }
    }
}
