//! Point calculation and ledger records.
//!
//! A review earns one point for non-empty content and one for having at least
//! one photo. The earliest review of a place earns one more, once.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Review;

/// Points granted once to the earliest review of a place.
pub const FIRST_REVIEW_BONUS: u32 = 1;

/// Scores a review's current content and attachments.
///
/// Does not include [`FIRST_REVIEW_BONUS`]; the bonus depends on the other
/// reviews of the place, not on this review's state.
#[must_use]
pub fn points_for(review: &Review) -> u32 {
    let mut points = 0;
    if !review.content.is_empty() {
        points += 1;
    }
    if !review.photo_ids.is_empty() {
        points += 1;
    }
    points
}

/// Points a review is currently worth on the ledger, bonus included.
#[must_use]
pub fn points_held(review: &Review) -> u32 {
    let bonus = if review.has_first_review_bonus {
        FIRST_REVIEW_BONUS
    } else {
        0
    };
    points_for(review) + bonus
}

/// Net effect of one event on a user's balance.
///
/// At most one side is non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PointDelta {
    /// Points added to the balance.
    pub increased: u32,
    /// Points removed from the balance.
    pub decreased: u32,
}

impl PointDelta {
    /// A pure increase.
    #[must_use]
    pub const fn increase(points: u32) -> Self {
        Self {
            increased: points,
            decreased: 0,
        }
    }

    /// A pure decrease.
    #[must_use]
    pub const fn decrease(points: u32) -> Self {
        Self {
            increased: 0,
            decreased: points,
        }
    }

    /// Splits `new - old` into its increasing or decreasing side.
    #[must_use]
    pub const fn between(old: u32, new: u32) -> Self {
        if new >= old {
            Self::increase(new - old)
        } else {
            Self::decrease(old - new)
        }
    }

    /// Signed change to apply to a balance.
    #[must_use]
    pub fn signed(&self) -> i64 {
        i64::from(self.increased) - i64::from(self.decreased)
    }

    /// Returns `true` when the event leaves the balance untouched.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.increased == 0 && self.decreased == 0
    }
}

/// One balance row per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPoint {
    /// Owner of the balance (unique).
    pub user_id: String,
    /// Current balance.
    pub balance: i64,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last balance change.
    pub modified_at: DateTime<Utc>,
}

impl UserPoint {
    /// A fresh zero balance for `user_id`.
    #[must_use]
    pub fn empty(user_id: String, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            balance: 0,
            created_at: now,
            modified_at: now,
        }
    }
}

/// Immutable audit record of one balance movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointHistory {
    /// Store-assigned identifier.
    pub id: i64,
    /// User whose balance moved.
    pub user_id: String,
    /// Points added, zero for a decrease.
    pub increased_amount: i64,
    /// Points removed, zero for an increase.
    pub decreased_amount: i64,
    /// When the movement was recorded.
    pub created_at: DateTime<Utc>,
}

/// A history record that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPointHistory {
    /// User whose balance moved.
    pub user_id: String,
    /// Points added.
    pub increased_amount: i64,
    /// Points removed.
    pub decreased_amount: i64,
    /// When the movement was recorded.
    pub created_at: DateTime<Utc>,
}

impl NewPointHistory {
    /// Builds the audit record for `delta`.
    #[must_use]
    pub fn from_delta(user_id: &str, delta: PointDelta, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            increased_amount: i64::from(delta.increased),
            decreased_amount: i64::from(delta.decreased),
            created_at: now,
        }
    }
}
