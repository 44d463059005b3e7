//! User balance lookup.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ApiResponse, UserPointResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MileageError};

/// `GET /users/{userId}/point` — Current point balance.
///
/// # Errors
///
/// Returns [`MileageError::Persistence`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/point",
    tag = "Users",
    summary = "Get a user's point balance",
    description = "Returns the user's current balance. Users without any ledger activity have a balance of zero.",
    params(
        ("userId" = String, Path, description = "User id"),
    ),
    responses(
        (status = 200, description = "Current balance", body = ApiResponse<UserPointResponse>),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn get_user_point(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, MileageError> {
    let point = state.point_service.balance(&user_id).await?;
    Ok(Json(ApiResponse::ok(UserPointResponse { point })))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users/{user_id}/point", get(get_user_point))
}
