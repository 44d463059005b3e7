//! Review aggregate as stored by the review store.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ReviewId;

/// A user's review of a place.
///
/// `user_id` and `place_id` never change after creation. At most one review
/// exists per `(user_id, place_id)`; the store enforces that, not this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    /// Unique review identifier (immutable after creation).
    pub review_id: ReviewId,

    /// Author of the review (immutable after creation).
    pub user_id: String,

    /// Reviewed place (immutable after creation).
    pub place_id: String,

    /// Review text. Empty when the author wrote nothing.
    pub content: String,

    /// Attached photo ids, in the order the author supplied them.
    pub photo_ids: Vec<String>,

    /// Set when this review was the earliest one for its place at the moment
    /// it was created. Set at most once, never cleared or transferred.
    pub has_first_review_bonus: bool,

    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last content or photo change.
    pub modified_at: DateTime<Utc>,
}

impl Review {
    /// Creates a new review stamped with `now` and without the bonus flag.
    #[must_use]
    pub fn new(
        user_id: String,
        place_id: String,
        content: String,
        photo_ids: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            review_id: ReviewId::new(),
            user_id,
            place_id,
            content,
            photo_ids,
            has_first_review_bonus: false,
            created_at: now,
            modified_at: now,
        }
    }

    /// Returns `true` if `user_id` wrote this review.
    #[must_use]
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Replaces the text and the photo list. The bonus flag is untouched.
    pub fn apply_edit(&mut self, content: String, photo_ids: Vec<String>, now: DateTime<Utc>) {
        self.content = content;
        self.photo_ids = photo_ids;
        self.modified_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_review() -> Review {
        Review::new(
            "foo".to_string(),
            "bar".to_string(),
            "hello".to_string(),
            vec!["p1".to_string()],
            Utc::now(),
        )
    }

    #[test]
    fn new_review_has_no_bonus() {
        let review = make_review();
        assert!(!review.has_first_review_bonus);
        assert_eq!(review.created_at, review.modified_at);
    }

    #[test]
    fn authorship_is_exact_match() {
        let review = make_review();
        assert!(review.is_authored_by("foo"));
        assert!(!review.is_authored_by("Foo"));
        assert!(!review.is_authored_by(""));
    }

    #[test]
    fn apply_edit_replaces_both_fields() {
        let mut review = make_review();
        review.has_first_review_bonus = true;
        let later = review.created_at + chrono::Duration::seconds(5);
        review.apply_edit(String::new(), vec!["p2".to_string()], later);

        assert!(review.content.is_empty());
        assert_eq!(review.photo_ids, vec!["p2".to_string()]);
        assert!(review.has_first_review_bonus);
        assert_eq!(review.modified_at, later);
        assert_ne!(review.created_at, review.modified_at);
    }
}
