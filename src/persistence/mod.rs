//! Persistence layer: review store and point ledger store.
//!
//! Writes go through a [`UnitOfWork`], one per event, which spans both the
//! review mutation and the ledger update and is committed or rolled back as a
//! whole. Dropping a unit of work without calling [`UnitOfWork::commit`]
//! discards everything it did.
//!
//! Two backends implement [`Store`]: [`postgres::PostgresStore`] on
//! `sqlx::PgPool`, and [`memory::MemoryStore`] for tests and local runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{NewPointHistory, PointHistory, Review, ReviewId, UserPoint};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Constraint that keeps one review per `(user_id, place_id)`.
///
/// Matches the constraint name in `migrations/`; the in-memory backend reports
/// the same name.
pub const REVIEW_USER_PLACE_CONSTRAINT: &str = "uq_reviews_user_id_place_id";

/// Failures reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A write collided with a uniqueness constraint.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation {
        /// Name of the violated constraint.
        constraint: String,
    },

    /// Any other storage fault.
    #[error("database error: {0}")]
    Database(String),
}

/// Review rows, as seen from inside a unit of work.
#[async_trait]
pub trait ReviewRepository: Send {
    /// Serializes first-review decisions for `place_id` until the unit of work
    /// ends.
    async fn lock_place(&mut self, place_id: &str) -> Result<(), StoreError>;

    /// Inserts a new review.
    ///
    /// Returns [`StoreError::UniqueViolation`] if the user already has a
    /// review for the place.
    async fn insert_review(&mut self, review: &Review) -> Result<(), StoreError>;

    /// Reads a review without locking it.
    async fn find_review(&mut self, review_id: ReviewId) -> Result<Option<Review>, StoreError>;

    /// Reads a review and holds an exclusive lock on it until the unit of work
    /// ends.
    async fn find_review_for_update(
        &mut self,
        review_id: ReviewId,
    ) -> Result<Option<Review>, StoreError>;

    /// Earliest existing review of `place_id` by `(created_at, review_id)`,
    /// locked until the unit of work ends.
    async fn first_review_for_place(
        &mut self,
        place_id: &str,
    ) -> Result<Option<Review>, StoreError>;

    /// Writes back the mutable fields of an existing review.
    async fn update_review(&mut self, review: &Review) -> Result<(), StoreError>;

    /// Permanently removes a review.
    async fn delete_review(&mut self, review_id: ReviewId) -> Result<(), StoreError>;
}

/// Balances and their audit trail, as seen from inside a unit of work.
#[async_trait]
pub trait LedgerRepository: Send {
    /// Returns the user's balance row, creating a zero row if none exists.
    ///
    /// Concurrent first calls for the same user converge on a single row; the
    /// losing writer reads the winner's row instead of failing.
    async fn get_or_create_user_point(&mut self, user_id: &str) -> Result<UserPoint, StoreError>;

    /// Adds `delta` (which may be negative) to the user's balance.
    ///
    /// Fails with [`StoreError::Database`] if the user has no balance row.
    async fn adjust_balance(&mut self, user_id: &str, delta: i64) -> Result<(), StoreError>;

    /// Appends an audit record.
    async fn append_history(&mut self, entry: &NewPointHistory)
    -> Result<PointHistory, StoreError>;
}

/// Atomic scope covering one event.
#[async_trait]
pub trait UnitOfWork: ReviewRepository + LedgerRepository {
    /// Makes every change in this unit of work durable.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Entry point to a storage backend.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Opens a unit of work.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    /// Reads a review outside any unit of work.
    async fn find_review(&self, review_id: ReviewId) -> Result<Option<Review>, StoreError>;

    /// Reads a user's balance row.
    async fn find_user_point(&self, user_id: &str) -> Result<Option<UserPoint>, StoreError>;

    /// All audit records of a user, oldest first.
    async fn list_point_history(&self, user_id: &str) -> Result<Vec<PointHistory>, StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
