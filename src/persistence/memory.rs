//! In-memory implementation of the persistence layer.
//!
//! The whole state sits behind one [`tokio::sync::Mutex`]. A unit of work
//! holds the owned guard for its lifetime and edits the state in place,
//! recording an undo entry for every change. Commit forgets the undo log;
//! dropping the unit of work without committing replays it backwards. Units
//! of work are fully serialized, which covers every row and place lock the
//! engine asks for.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    LedgerRepository, REVIEW_USER_PLACE_CONSTRAINT, ReviewRepository, Store, StoreError,
    UnitOfWork,
};
use crate::domain::{NewPointHistory, PointHistory, Review, ReviewId, UserPoint};

#[derive(Debug, Default)]
struct MemoryState {
    reviews: HashMap<ReviewId, Review>,
    // (user_id, place_id) -> review; the uniqueness constraint.
    by_user_place: HashMap<(String, String), ReviewId>,
    // place_id -> reviews ordered by (created_at, review_id).
    by_place: HashMap<String, BTreeSet<(DateTime<Utc>, ReviewId)>>,
    user_points: HashMap<String, UserPoint>,
    history: HashMap<String, Vec<PointHistory>>,
    next_history_id: i64,
}

impl MemoryState {
    fn insert_review(&mut self, review: Review) {
        self.by_user_place.insert(
            (review.user_id.clone(), review.place_id.clone()),
            review.review_id,
        );
        self.by_place
            .entry(review.place_id.clone())
            .or_default()
            .insert((review.created_at, review.review_id));
        self.reviews.insert(review.review_id, review);
    }

    fn remove_review(&mut self, review_id: ReviewId) -> Option<Review> {
        let review = self.reviews.remove(&review_id)?;
        self.by_user_place
            .remove(&(review.user_id.clone(), review.place_id.clone()));
        if let Some(place) = self.by_place.get_mut(&review.place_id) {
            place.remove(&(review.created_at, review.review_id));
            if place.is_empty() {
                self.by_place.remove(&review.place_id);
            }
        }
        Some(review)
    }
}

/// One reversible change made inside a unit of work.
#[derive(Debug)]
enum Undo {
    ReviewInserted(ReviewId),
    ReviewUpdated(Review),
    ReviewDeleted(Review),
    UserPointCreated(String),
    BalanceAdjusted(UserPoint),
    HistoryAppended(String),
}

/// Process-local store, lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reviews.
    pub async fn review_count(&self) -> usize {
        self.state.lock().await.reviews.len()
    }
}

#[derive(Debug)]
struct MemoryUnitOfWork {
    state: OwnedMutexGuard<MemoryState>,
    undo: Vec<Undo>,
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        while let Some(entry) = self.undo.pop() {
            match entry {
                Undo::ReviewInserted(review_id) => {
                    self.state.remove_review(review_id);
                }
                Undo::ReviewUpdated(previous) => {
                    self.state.reviews.insert(previous.review_id, previous);
                }
                Undo::ReviewDeleted(review) => self.state.insert_review(review),
                Undo::UserPointCreated(user_id) => {
                    self.state.user_points.remove(&user_id);
                }
                Undo::BalanceAdjusted(previous) => {
                    self.state
                        .user_points
                        .insert(previous.user_id.clone(), previous);
                }
                Undo::HistoryAppended(user_id) => {
                    if let Some(entries) = self.state.history.get_mut(&user_id) {
                        entries.pop();
                    }
                }
            }
        }
    }
}

#[async_trait]
impl ReviewRepository for MemoryUnitOfWork {
    async fn lock_place(&mut self, _place_id: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_review(&mut self, review: &Review) -> Result<(), StoreError> {
        let key = (review.user_id.clone(), review.place_id.clone());
        if self.state.by_user_place.contains_key(&key)
            || self.state.reviews.contains_key(&review.review_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: REVIEW_USER_PLACE_CONSTRAINT.to_string(),
            });
        }
        self.state.insert_review(review.clone());
        self.undo.push(Undo::ReviewInserted(review.review_id));
        Ok(())
    }

    async fn find_review(&mut self, review_id: ReviewId) -> Result<Option<Review>, StoreError> {
        Ok(self.state.reviews.get(&review_id).cloned())
    }

    async fn find_review_for_update(
        &mut self,
        review_id: ReviewId,
    ) -> Result<Option<Review>, StoreError> {
        Ok(self.state.reviews.get(&review_id).cloned())
    }

    async fn first_review_for_place(
        &mut self,
        place_id: &str,
    ) -> Result<Option<Review>, StoreError> {
        let first = self
            .state
            .by_place
            .get(place_id)
            .and_then(|place| place.first())
            .and_then(|(_, review_id)| self.state.reviews.get(review_id))
            .cloned();
        Ok(first)
    }

    async fn update_review(&mut self, review: &Review) -> Result<(), StoreError> {
        let Some(stored) = self.state.reviews.get_mut(&review.review_id) else {
            return Err(StoreError::Database(format!(
                "review {} vanished during update",
                review.review_id
            )));
        };
        let previous = stored.clone();
        stored.content.clone_from(&review.content);
        stored.photo_ids.clone_from(&review.photo_ids);
        stored.has_first_review_bonus = review.has_first_review_bonus;
        stored.modified_at = review.modified_at;
        self.undo.push(Undo::ReviewUpdated(previous));
        Ok(())
    }

    async fn delete_review(&mut self, review_id: ReviewId) -> Result<(), StoreError> {
        if let Some(removed) = self.state.remove_review(review_id) {
            self.undo.push(Undo::ReviewDeleted(removed));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for MemoryUnitOfWork {
    async fn get_or_create_user_point(&mut self, user_id: &str) -> Result<UserPoint, StoreError> {
        if let Some(row) = self.state.user_points.get(user_id) {
            return Ok(row.clone());
        }
        let row = UserPoint::empty(user_id.to_string(), Utc::now());
        self.state
            .user_points
            .insert(user_id.to_string(), row.clone());
        self.undo.push(Undo::UserPointCreated(user_id.to_string()));
        Ok(row)
    }

    async fn adjust_balance(&mut self, user_id: &str, delta: i64) -> Result<(), StoreError> {
        let Some(row) = self.state.user_points.get_mut(user_id) else {
            return Err(StoreError::Database(format!(
                "no balance row for user {user_id}"
            )));
        };
        let previous = row.clone();
        row.balance += delta;
        row.modified_at = Utc::now();
        self.undo.push(Undo::BalanceAdjusted(previous));
        Ok(())
    }

    async fn append_history(
        &mut self,
        entry: &NewPointHistory,
    ) -> Result<PointHistory, StoreError> {
        self.state.next_history_id += 1;
        let stored = PointHistory {
            id: self.state.next_history_id,
            user_id: entry.user_id.clone(),
            increased_amount: entry.increased_amount,
            decreased_amount: entry.decreased_amount,
            created_at: entry.created_at,
        };
        self.state
            .history
            .entry(entry.user_id.clone())
            .or_default()
            .push(stored.clone());
        self.undo.push(Undo::HistoryAppended(entry.user_id.clone()));
        Ok(stored)
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut this = self;
        this.undo.clear();
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let state = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            state,
            undo: Vec::new(),
        }))
    }

    async fn find_review(&self, review_id: ReviewId) -> Result<Option<Review>, StoreError> {
        Ok(self.state.lock().await.reviews.get(&review_id).cloned())
    }

    async fn find_user_point(&self, user_id: &str) -> Result<Option<UserPoint>, StoreError> {
        Ok(self.state.lock().await.user_points.get(user_id).cloned())
    }

    async fn list_point_history(&self, user_id: &str) -> Result<Vec<PointHistory>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .history
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::PointDelta;

    fn review(user: &str, place: &str) -> Review {
        Review::new(
            user.to_string(),
            place.to_string(),
            "hello".to_string(),
            Vec::new(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn committed_insert_is_visible() {
        let store = MemoryStore::new();
        let r = review("foo", "bar");

        let Ok(mut uow) = store.begin().await else {
            panic!("begin failed");
        };
        assert!(uow.insert_review(&r).await.is_ok());
        assert!(uow.commit().await.is_ok());

        let found = store.find_review(r.review_id).await;
        assert_eq!(found, Ok(Some(r)));
    }

    #[tokio::test]
    async fn dropped_unit_of_work_rolls_back() {
        let store = MemoryStore::new();
        let r = review("foo", "bar");

        {
            let Ok(mut uow) = store.begin().await else {
                panic!("begin failed");
            };
            assert!(uow.insert_review(&r).await.is_ok());
            assert!(uow.get_or_create_user_point("foo").await.is_ok());
        }

        assert_eq!(store.review_count().await, 0);
        assert_eq!(store.find_user_point("foo").await, Ok(None));
    }

    #[tokio::test]
    async fn duplicate_user_place_is_unique_violation() {
        let store = MemoryStore::new();
        let Ok(mut uow) = store.begin().await else {
            panic!("begin failed");
        };
        assert!(uow.insert_review(&review("foo", "bar")).await.is_ok());

        let err = uow.insert_review(&review("foo", "bar")).await;
        assert!(matches!(err, Err(StoreError::UniqueViolation { .. })));

        // Same user, other place is fine.
        assert!(uow.insert_review(&review("foo", "baz")).await.is_ok());
    }

    #[tokio::test]
    async fn first_review_orders_by_creation_time() {
        let store = MemoryStore::new();
        let early = Utc::now();
        let mut first = review("a", "bar");
        first.created_at = early;
        let mut second = review("b", "bar");
        second.created_at = early + chrono::Duration::milliseconds(1);

        let Ok(mut uow) = store.begin().await else {
            panic!("begin failed");
        };
        assert!(uow.insert_review(&second).await.is_ok());
        assert!(uow.insert_review(&first).await.is_ok());

        let Ok(Some(found)) = uow.first_review_for_place("bar").await else {
            panic!("expected a first review");
        };
        assert_eq!(found.review_id, first.review_id);
        assert_eq!(uow.first_review_for_place("elsewhere").await, Ok(None));
    }

    #[tokio::test]
    async fn ledger_rows_and_history() {
        let store = MemoryStore::new();
        let Ok(mut uow) = store.begin().await else {
            panic!("begin failed");
        };
        let Ok(row) = uow.get_or_create_user_point("foo").await else {
            panic!("row creation failed");
        };
        assert_eq!(row.balance, 0);

        assert!(uow.adjust_balance("foo", 3).await.is_ok());
        let entry = NewPointHistory::from_delta("foo", PointDelta::increase(3), Utc::now());
        let Ok(stored) = uow.append_history(&entry).await else {
            panic!("append failed");
        };
        assert_eq!(stored.id, 1);

        // A second call returns the existing row rather than resetting it.
        let Ok(row) = uow.get_or_create_user_point("foo").await else {
            panic!("row lookup failed");
        };
        assert_eq!(row.balance, 3);
        assert!(uow.commit().await.is_ok());

        let history = store.list_point_history("foo").await.unwrap_or_default();
        assert_eq!(history.len(), 1);
        assert!(store.list_point_history("bar").await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn dropped_unit_of_work_restores_edits_deletes_and_ledger() {
        let store = MemoryStore::new();
        let kept = review("foo", "bar");
        let removed = review("baz", "bar");

        let Ok(mut uow) = store.begin().await else {
            panic!("begin failed");
        };
        assert!(uow.insert_review(&kept).await.is_ok());
        assert!(uow.insert_review(&removed).await.is_ok());
        assert!(uow.get_or_create_user_point("foo").await.is_ok());
        assert!(uow.adjust_balance("foo", 2).await.is_ok());
        let entry = NewPointHistory::from_delta("foo", PointDelta::increase(2), Utc::now());
        assert!(uow.append_history(&entry).await.is_ok());
        assert!(uow.commit().await.is_ok());

        {
            let Ok(mut uow) = store.begin().await else {
                panic!("begin failed");
            };
            let mut edited = kept.clone();
            edited.apply_edit(String::new(), vec!["p1".to_string()], Utc::now());
            assert!(uow.update_review(&edited).await.is_ok());
            assert!(uow.delete_review(removed.review_id).await.is_ok());
            assert!(uow.adjust_balance("foo", -2).await.is_ok());
            let entry = NewPointHistory::from_delta("foo", PointDelta::decrease(2), Utc::now());
            assert!(uow.append_history(&entry).await.is_ok());
            assert!(uow.insert_review(&review("qux", "bar")).await.is_ok());
        }

        assert_eq!(store.find_review(kept.review_id).await, Ok(Some(kept.clone())));
        assert_eq!(
            store.find_review(removed.review_id).await,
            Ok(Some(removed.clone()))
        );
        assert_eq!(store.review_count().await, 2);
        let Ok(Some(row)) = store.find_user_point("foo").await else {
            panic!("balance row should survive");
        };
        assert_eq!(row.balance, 2);
        assert_eq!(store.list_point_history("foo").await.unwrap_or_default().len(), 1);

        // Indexes were restored too.
        let Ok(mut uow) = store.begin().await else {
            panic!("begin failed");
        };
        let dup = uow.insert_review(&review("baz", "bar")).await;
        assert!(matches!(dup, Err(StoreError::UniqueViolation { .. })));
        let Ok(Some(first)) = uow.first_review_for_place("bar").await else {
            panic!("place should still have reviews");
        };
        assert!(first.review_id == kept.review_id || first.review_id == removed.review_id);
    }

    #[tokio::test]
    async fn adjusting_a_missing_balance_row_fails() {
        let store = MemoryStore::new();
        let Ok(mut uow) = store.begin().await else {
            panic!("begin failed");
        };
        let result = uow.adjust_balance("nobody", 1).await;
        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}
