//! Review event intake.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{ApiResponse, EventRequest, EventResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MileageError};

/// `POST /events` — Apply one review event to the points ledger.
///
/// # Errors
///
/// Returns [`MileageError`] on validation failure, unknown or foreign
/// reviews, duplicate adds, and storage failures.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Submit a review event",
    description = "Creates, edits or deletes a review and adjusts the author's balance in the same transaction. The response reports the points credited and debited by this event.",
    request_body = EventRequest,
    responses(
        (status = 200, description = "Event applied", body = ApiResponse<EventResponse>),
        (status = 400, description = "Malformed event", body = ErrorResponse),
        (status = 403, description = "Caller is not the review author", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse),
        (status = 409, description = "User already reviewed the place", body = ErrorResponse),
    )
)]
pub async fn submit_event(
    State(state): State<AppState>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, MileageError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "event body rejected");
        MileageError::InvalidValue {
            field: "body",
            reason: "is not a valid event",
        }
    })?;
    let result = state.review_service.submit_review_event(req.into()).await?;
    Ok(Json(ApiResponse::ok(EventResponse::from(result))))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events", post(submit_event))
}
