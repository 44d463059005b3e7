//! Ledger updates shared by every review event.

use chrono::Utc;

use crate::domain::{NewPointHistory, PointDelta};
use crate::error::MileageError;
use crate::persistence::UnitOfWork;

/// Applies `delta` to the user's balance inside `uow`.
///
/// The balance row is created first if the user has none yet. A zero delta
/// touches nothing else; any other delta moves the balance and appends exactly
/// one history record, both inside the caller's unit of work.
///
/// # Errors
///
/// Returns [`MileageError::Persistence`] on storage failure.
pub async fn apply_point_delta(
    uow: &mut dyn UnitOfWork,
    user_id: &str,
    delta: PointDelta,
) -> Result<(), MileageError> {
    uow.get_or_create_user_point(user_id).await?;

    if delta.is_zero() {
        return Ok(());
    }

    uow.adjust_balance(user_id, delta.signed()).await?;
    uow.append_history(&NewPointHistory::from_delta(user_id, delta, Utc::now()))
        .await?;
    Ok(())
}
