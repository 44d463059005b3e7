//! Review event request and response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ReviewEventParams, ReviewEventResult};

/// Request body for `POST /api/v1/events`.
///
/// Every field is optional at the wire level; which ones are required depends
/// on `action` and is checked by the service, so a missing field is reported
/// with a specific error instead of a generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    /// Event kind; only `"REVIEW"` is supported.
    #[serde(rename = "type")]
    #[schema(example = "REVIEW")]
    pub event_type: Option<String>,
    /// `"ADD"`, `"MOD"` or `"DELETE"`.
    #[schema(example = "ADD")]
    pub action: Option<String>,
    /// Target review; required for `MOD` and `DELETE`.
    pub review_id: Option<String>,
    /// Acting user.
    pub user_id: Option<String>,
    /// Reviewed place; required for `ADD`.
    pub place_id: Option<String>,
    /// Review text.
    pub content: Option<String>,
    /// Attached photo ids.
    pub attached_photo_ids: Option<Vec<String>>,
}

impl From<EventRequest> for ReviewEventParams {
    fn from(req: EventRequest) -> Self {
        Self {
            event_type: req.event_type,
            action: req.action,
            review_id: req.review_id,
            user_id: req.user_id,
            place_id: req.place_id,
            content: req.content,
            attached_photo_ids: req.attached_photo_ids,
        }
    }
}

/// Point movement caused by one event.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    /// Created or modified review; omitted for deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
    /// Points credited.
    pub increased_point: u32,
    /// Points debited.
    pub decreased_point: u32,
}

impl From<ReviewEventResult> for EventResponse {
    fn from(result: ReviewEventResult) -> Self {
        Self {
            review_id: result.review_id.map(|id| id.to_string()),
            increased_point: result.increased_point(),
            decreased_point: result.decreased_point(),
        }
    }
}
