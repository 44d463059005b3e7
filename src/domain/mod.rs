//! Domain layer: reviews, point rules, and review events.
//!
//! This module contains the server-side domain model: review identity and
//! state, the point calculator and ledger records, and the event types with
//! the validation that turns raw parameters into commands.

pub mod event;
pub mod point;
pub mod review;
pub mod review_id;
pub mod validation;

pub use event::{
    AddReview, DeleteReview, EventAction, EventType, ModifyReview, ReviewCommand,
    ReviewEventParams, ReviewEventResult,
};
pub use point::{
    FIRST_REVIEW_BONUS, NewPointHistory, PointDelta, PointHistory, UserPoint, points_for,
    points_held,
};
pub use review::Review;
pub use review_id::ReviewId;
pub use validation::validate_review_event;
