//! Review events: raw parameters, validated commands, and results.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::{PointDelta, ReviewId};

/// Kind of event submitted to the service. Only reviews are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Review lifecycle event.
    Review,
}

impl FromStr for EventType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REVIEW" => Ok(Self::Review),
            _ => Err(()),
        }
    }
}

/// Review lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    /// A new review was written.
    Add,
    /// An existing review was edited.
    Modify,
    /// A review was removed.
    Delete,
}

impl EventAction {
    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Modify => "MOD",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Self::Add),
            "MOD" => Ok(Self::Modify),
            "DELETE" => Ok(Self::Delete),
            _ => Err(()),
        }
    }
}

/// Unvalidated event as submitted by a caller. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewEventParams {
    /// Event type, expected to be `REVIEW`.
    pub event_type: Option<String>,
    /// Action name: `ADD`, `MOD` or `DELETE`.
    pub action: Option<String>,
    /// Target review for `MOD` and `DELETE`.
    pub review_id: Option<String>,
    /// Acting user.
    pub user_id: Option<String>,
    /// Reviewed place for `ADD`.
    pub place_id: Option<String>,
    /// Review text.
    pub content: Option<String>,
    /// Attached photo ids.
    pub attached_photo_ids: Option<Vec<String>>,
}

/// Validated `ADD` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddReview {
    /// Author.
    pub user_id: String,
    /// Reviewed place.
    pub place_id: String,
    /// Non-empty review text.
    pub content: String,
    /// Attached photo ids.
    pub photo_ids: Vec<String>,
}

/// Validated `MOD` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyReview {
    /// Acting user; must be the author.
    pub user_id: String,
    /// Client token naming the review.
    pub review_id: String,
    /// Replacement text; empty when the event carried none.
    pub content: String,
    /// Replacement photo list; empty when the event carried none.
    pub photo_ids: Vec<String>,
}

/// Validated `DELETE` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReview {
    /// Acting user; must be the author.
    pub user_id: String,
    /// Client token naming the review.
    pub review_id: String,
}

/// A review event that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    /// See [`AddReview`].
    Add(AddReview),
    /// See [`ModifyReview`].
    Modify(ModifyReview),
    /// See [`DeleteReview`].
    Delete(DeleteReview),
}

impl ReviewCommand {
    /// Action this command carries out.
    #[must_use]
    pub const fn action(&self) -> EventAction {
        match self {
            Self::Add(_) => EventAction::Add,
            Self::Modify(_) => EventAction::Modify,
            Self::Delete(_) => EventAction::Delete,
        }
    }

    /// Acting user.
    #[must_use]
    pub fn user_id(&self) -> &str {
        match self {
            Self::Add(cmd) => &cmd.user_id,
            Self::Modify(cmd) => &cmd.user_id,
            Self::Delete(cmd) => &cmd.user_id,
        }
    }
}

/// Outcome of one review event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEventResult {
    /// Affected review; absent for deletes.
    pub review_id: Option<ReviewId>,
    /// Net point change applied to the author's balance.
    pub delta: PointDelta,
}

impl ReviewEventResult {
    /// Points added by the event.
    #[must_use]
    pub const fn increased_point(&self) -> u32 {
        self.delta.increased
    }

    /// Points removed by the event.
    #[must_use]
    pub const fn decreased_point(&self) -> u32 {
        self.delta.decreased
    }
}
