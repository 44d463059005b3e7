//! Request-shape checks run before any store access.
//!
//! Rejections happen in a fixed order: event type, action, `userId`, then the
//! fields the action needs. A missing field and a present-but-unusable value
//! are reported as different errors.

use super::event::{
    AddReview, DeleteReview, EventAction, EventType, ModifyReview, ReviewCommand,
    ReviewEventParams,
};
use crate::error::MileageError;

/// Turns raw event parameters into a [`ReviewCommand`].
///
/// # Errors
///
/// - [`MileageError::UnknownType`] when `type` is absent or not `REVIEW`.
/// - [`MileageError::MissingField`] when a required field is absent.
/// - [`MileageError::UnknownAction`] when `action` is not recognised.
/// - [`MileageError::InvalidValue`] when `content` is the empty string.
pub fn validate_review_event(params: ReviewEventParams) -> Result<ReviewCommand, MileageError> {
    let event_type = params
        .event_type
        .as_deref()
        .and_then(|t| t.parse::<EventType>().ok());
    let Some(EventType::Review) = event_type else {
        return Err(MileageError::UnknownType(params.event_type));
    };

    let raw_action = params.action.ok_or(MileageError::MissingField("action"))?;
    let action = raw_action
        .parse::<EventAction>()
        .map_err(|()| MileageError::UnknownAction(raw_action.clone()))?;

    let user_id = params.user_id.ok_or(MileageError::MissingField("userId"))?;

    match action {
        EventAction::Add => {
            let place_id = params.place_id.ok_or(MileageError::MissingField("placeId"))?;
            let content = params.content.ok_or(MileageError::MissingField("content"))?;
            ensure_non_empty_content(&content)?;
            Ok(ReviewCommand::Add(AddReview {
                user_id,
                place_id,
                content,
                photo_ids: params.attached_photo_ids.unwrap_or_default(),
            }))
        }
        EventAction::Modify => {
            let review_id = params
                .review_id
                .ok_or(MileageError::MissingField("reviewId"))?;
            // MOD replaces both fields; an absent one clears the stored value.
            if let Some(content) = &params.content {
                ensure_non_empty_content(content)?;
            }
            Ok(ReviewCommand::Modify(ModifyReview {
                user_id,
                review_id,
                content: params.content.unwrap_or_default(),
                photo_ids: params.attached_photo_ids.unwrap_or_default(),
            }))
        }
        EventAction::Delete => {
            let review_id = params
                .review_id
                .ok_or(MileageError::MissingField("reviewId"))?;
            Ok(ReviewCommand::Delete(DeleteReview { user_id, review_id }))
        }
    }
}

fn ensure_non_empty_content(content: &str) -> Result<(), MileageError> {
    if content.is_empty() {
        return Err(MileageError::InvalidValue {
            field: "content",
            reason: "must not be empty",
        });
    }
    Ok(())
}
