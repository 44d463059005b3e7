//! Review service: turns review events into review mutations and ledger
//! movements.

use std::sync::Arc;

use chrono::Utc;

use super::ledger::apply_point_delta;
use crate::domain::{
    AddReview, DeleteReview, ModifyReview, PointDelta, Review, ReviewCommand, ReviewEventParams,
    ReviewEventResult, ReviewId, points_for, points_held, validate_review_event,
};
use crate::error::MileageError;
use crate::persistence::{REVIEW_USER_PLACE_CONSTRAINT, Store, StoreError, UnitOfWork};

/// Orchestration layer for review events.
///
/// Every event runs in its own unit of work: the review mutation, the balance
/// change and the history record are committed together or not at all.
/// Every mutation method follows the pattern: open unit of work → load and
/// authorize → lock → mutate review → apply ledger delta → commit.
#[derive(Debug, Clone)]
pub struct ReviewService {
    store: Arc<dyn Store>,
}

impl ReviewService {
    /// Creates a new `ReviewService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Validates raw event parameters and executes the resulting command.
    ///
    /// # Errors
    ///
    /// Returns the validation error for malformed events, otherwise whatever
    /// the executed command returns.
    pub async fn submit_review_event(
        &self,
        params: ReviewEventParams,
    ) -> Result<ReviewEventResult, MileageError> {
        let command = validate_review_event(params)?;
        tracing::debug!(
            action = %command.action(),
            user_id = command.user_id(),
            "review event accepted"
        );
        self.execute(command).await
    }

    /// Executes an already validated command.
    ///
    /// # Errors
    ///
    /// See [`Self::add_review`], [`Self::modify_review`] and
    /// [`Self::delete_review`].
    pub async fn execute(&self, command: ReviewCommand) -> Result<ReviewEventResult, MileageError> {
        match command {
            ReviewCommand::Add(cmd) => self.add_review(cmd).await,
            ReviewCommand::Modify(cmd) => self.modify_review(cmd).await,
            ReviewCommand::Delete(cmd) => self.delete_review(cmd).await,
        }
    }

    /// Creates a review and credits its author.
    ///
    /// The author earns [`points_for`] the review, plus the
    /// [`FIRST_REVIEW_BONUS`](crate::domain::FIRST_REVIEW_BONUS) if the place
    /// had no review yet. The check runs under a per-place lock, so at most
    /// one review of a place ever carries the bonus.
    ///
    /// # Errors
    ///
    /// Returns [`MileageError::DuplicateReview`] if the user already reviewed
    /// the place, or [`MileageError::Persistence`] on storage failure. Nothing
    /// is written in either case.
    pub async fn add_review(&self, cmd: AddReview) -> Result<ReviewEventResult, MileageError> {
        let mut uow = self.store.begin().await?;
        uow.lock_place(&cmd.place_id).await?;

        // Under the place lock, "no review yet" is the same as "earliest".
        let is_first = uow.first_review_for_place(&cmd.place_id).await?.is_none();

        let mut review = Review::new(
            cmd.user_id,
            cmd.place_id,
            cmd.content,
            cmd.photo_ids,
            Utc::now(),
        );
        review.has_first_review_bonus = is_first;

        if let Err(e) = uow.insert_review(&review).await {
            let err = insert_error(e);
            if matches!(err, MileageError::DuplicateReview) {
                tracing::warn!(
                    user_id = %review.user_id,
                    place_id = %review.place_id,
                    "duplicate review rejected"
                );
            }
            return Err(err);
        }

        let points = points_held(&review);
        if is_first {
            tracing::debug!(
                review_id = %review.review_id,
                place_id = %review.place_id,
                "first review bonus awarded"
            );
        }

        let delta = PointDelta::increase(points);
        apply_point_delta(uow.as_mut(), &review.user_id, delta).await?;
        uow.commit().await?;

        tracing::info!(
            review_id = %review.review_id,
            user_id = %review.user_id,
            increased = delta.increased,
            "review added"
        );
        Ok(ReviewEventResult {
            review_id: Some(review.review_id),
            delta,
        })
    }

    /// Edits a review and settles the point difference.
    ///
    /// The difference is computed against the locked, freshly read row. The
    /// first-review bonus is neither gained nor lost by editing.
    ///
    /// # Errors
    ///
    /// Returns [`MileageError::ReviewNotFound`], [`MileageError::NotAuthor`]
    /// (nothing is written), or [`MileageError::Persistence`].
    pub async fn modify_review(
        &self,
        cmd: ModifyReview,
    ) -> Result<ReviewEventResult, MileageError> {
        let review_id = ReviewId::parse(&cmd.review_id).ok_or(MileageError::ReviewNotFound)?;
        let mut uow = self.store.begin().await?;
        let mut review = load_authored_for_update(uow.as_mut(), review_id, &cmd.user_id).await?;

        let old_points = points_for(&review);
        review.apply_edit(cmd.content, cmd.photo_ids, Utc::now());
        uow.update_review(&review).await?;
        let new_points = points_for(&review);

        let delta = PointDelta::between(old_points, new_points);
        apply_point_delta(uow.as_mut(), &review.user_id, delta).await?;
        uow.commit().await?;

        tracing::info!(
            %review_id,
            user_id = %review.user_id,
            increased = delta.increased,
            decreased = delta.decreased,
            "review modified"
        );
        Ok(ReviewEventResult {
            review_id: Some(review_id),
            delta,
        })
    }

    /// Deletes a review and takes back every point it earned, bonus
    /// included.
    ///
    /// The bonus is not handed on to the next-earliest review of the place.
    ///
    /// # Errors
    ///
    /// Returns [`MileageError::ReviewNotFound`], [`MileageError::NotAuthor`]
    /// (nothing is written), or [`MileageError::Persistence`].
    pub async fn delete_review(
        &self,
        cmd: DeleteReview,
    ) -> Result<ReviewEventResult, MileageError> {
        let review_id = ReviewId::parse(&cmd.review_id).ok_or(MileageError::ReviewNotFound)?;
        let mut uow = self.store.begin().await?;
        let review = load_authored_for_update(uow.as_mut(), review_id, &cmd.user_id).await?;

        let delta = PointDelta::decrease(points_held(&review));
        uow.delete_review(review_id).await?;
        apply_point_delta(uow.as_mut(), &review.user_id, delta).await?;
        uow.commit().await?;

        tracing::info!(
            %review_id,
            user_id = %review.user_id,
            decreased = delta.decreased,
            "review deleted"
        );
        Ok(ReviewEventResult {
            review_id: None,
            delta,
        })
    }

    /// Looks up a review by its client token.
    ///
    /// # Errors
    ///
    /// Returns [`MileageError::ReviewNotFound`] if the token is malformed or
    /// names no review, or [`MileageError::Persistence`].
    pub async fn get_review(&self, token: &str) -> Result<Review, MileageError> {
        let review_id = ReviewId::parse(token).ok_or(MileageError::ReviewNotFound)?;
        self.store
            .find_review(review_id)
            .await?
            .ok_or(MileageError::ReviewNotFound)
    }
}

/// Only the `(user_id, place_id)` constraint means the user already reviewed
/// the place; any other collision is a storage fault.
fn insert_error(err: StoreError) -> MileageError {
    match err {
        StoreError::UniqueViolation { constraint }
            if constraint == REVIEW_USER_PLACE_CONSTRAINT =>
        {
            MileageError::DuplicateReview
        }
        other => other.into(),
    }
}

/// Loads a review, checks authorship, then re-reads it under an exclusive
/// lock held until `uow` ends.
async fn load_authored_for_update(
    uow: &mut dyn UnitOfWork,
    review_id: ReviewId,
    user_id: &str,
) -> Result<Review, MileageError> {
    let review = uow
        .find_review(review_id)
        .await?
        .ok_or(MileageError::ReviewNotFound)?;

    if !review.is_authored_by(user_id) {
        tracing::warn!(%review_id, user_id, "review change by non-author rejected");
        return Err(MileageError::NotAuthor);
    }

    // A concurrent delete may have won the lock.
    uow.find_review_for_update(review_id)
        .await?
        .ok_or(MileageError::ReviewNotFound)
}
