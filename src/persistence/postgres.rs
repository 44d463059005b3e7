//! PostgreSQL implementation of the persistence layer.
//!
//! Each unit of work is one `sqlx` transaction. Row locks use
//! `SELECT ... FOR UPDATE`; the first-review decision for a place is
//! serialized with a transaction-scoped advisory lock on the place id, so a
//! concurrent insert for the same place cannot slip in between the insert and
//! the "am I first" check. Schema lives in `migrations/`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{LedgerRepository, ReviewRepository, Store, StoreError, UnitOfWork};
use crate::config::MileageConfig;
use crate::domain::{NewPointHistory, PointHistory, Review, ReviewId, UserPoint};

type ReviewRow = (
    Uuid,
    String,
    String,
    String,
    Vec<String>,
    bool,
    DateTime<Utc>,
    DateTime<Utc>,
);

type UserPointRow = (String, i64, DateTime<Utc>, DateTime<Utc>);

type HistoryRow = (i64, String, i64, i64, DateTime<Utc>);

const REVIEW_COLUMNS: &str = "review_id, user_id, place_id, content, photo_ids, \
     has_first_review_bonus, created_at, modified_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the database cannot be reached.
    pub async fn connect(config: &MileageConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

/// Maps a driver error, singling out unique-constraint violations.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error()
        && db_err.is_unique_violation()
    {
        return StoreError::UniqueViolation {
            constraint: db_err.constraint().unwrap_or("unknown").to_string(),
        };
    }
    StoreError::Database(err.to_string())
}

fn review_from_row(row: ReviewRow) -> Review {
    let (
        review_id,
        user_id,
        place_id,
        content,
        photo_ids,
        has_first_review_bonus,
        created_at,
        modified_at,
    ) = row;
    Review {
        review_id: ReviewId::from_uuid(review_id),
        user_id,
        place_id,
        content,
        photo_ids,
        has_first_review_bonus,
        created_at,
        modified_at,
    }
}

fn user_point_from_row((user_id, balance, created_at, modified_at): UserPointRow) -> UserPoint {
    UserPoint {
        user_id,
        balance,
        created_at,
        modified_at,
    }
}

fn history_from_row(
    (id, user_id, increased_amount, decreased_amount, created_at): HistoryRow,
) -> PointHistory {
    PointHistory {
        id,
        user_id,
        increased_amount,
        decreased_amount,
        created_at,
    }
}

struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ReviewRepository for PostgresUnitOfWork {
    async fn lock_place(&mut self, place_id: &str) -> Result<(), StoreError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(place_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn insert_review(&mut self, review: &Review) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO reviews (review_id, user_id, place_id, content, photo_ids, \
             has_first_review_bonus, created_at, modified_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(review.review_id.as_uuid())
        .bind(&review.user_id)
        .bind(&review.place_id)
        .bind(&review.content)
        .bind(&review.photo_ids)
        .bind(review.has_first_review_bonus)
        .bind(review.created_at)
        .bind(review.modified_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_review(&mut self, review_id: ReviewId) -> Result<Option<Review>, StoreError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = $1"
        ))
        .bind(review_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(review_from_row))
    }

    async fn find_review_for_update(
        &mut self,
        review_id: ReviewId,
    ) -> Result<Option<Review>, StoreError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = $1 FOR UPDATE"
        ))
        .bind(review_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(review_from_row))
    }

    async fn first_review_for_place(
        &mut self,
        place_id: &str,
    ) -> Result<Option<Review>, StoreError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE place_id = $1 \
             ORDER BY created_at ASC, review_id ASC LIMIT 1 FOR UPDATE"
        ))
        .bind(place_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(review_from_row))
    }

    async fn update_review(&mut self, review: &Review) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE reviews SET content = $2, photo_ids = $3, has_first_review_bonus = $4, \
             modified_at = $5 WHERE review_id = $1",
        )
        .bind(review.review_id.as_uuid())
        .bind(&review.content)
        .bind(&review.photo_ids)
        .bind(review.has_first_review_bonus)
        .bind(review.modified_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Database(format!(
                "review {} vanished during update",
                review.review_id
            )));
        }
        Ok(())
    }

    async fn delete_review(&mut self, review_id: ReviewId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM reviews WHERE review_id = $1")
            .bind(review_id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for PostgresUnitOfWork {
    async fn get_or_create_user_point(&mut self, user_id: &str) -> Result<UserPoint, StoreError> {
        // A concurrent creator blocks this insert until it commits; after that
        // the insert is a no-op and the read below sees the winner's row.
        sqlx::query(
            "INSERT INTO user_points (user_id, balance, created_at, modified_at) \
             VALUES ($1, 0, NOW(), NOW()) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, UserPointRow>(
            "SELECT user_id, balance, created_at, modified_at FROM user_points WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(user_point_from_row(row))
    }

    async fn adjust_balance(&mut self, user_id: &str, delta: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE user_points SET balance = balance + $2, modified_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(delta)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Database(format!(
                "no balance row for user {user_id}"
            )));
        }
        Ok(())
    }

    async fn append_history(
        &mut self,
        entry: &NewPointHistory,
    ) -> Result<PointHistory, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO point_histories (user_id, increased_amount, decreased_amount, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&entry.user_id)
        .bind(entry.increased_amount)
        .bind(entry.decreased_amount)
        .bind(entry.created_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(PointHistory {
            id,
            user_id: entry.user_id.clone(),
            increased_amount: entry.increased_amount,
            decreased_amount: entry.decreased_amount,
            created_at: entry.created_at,
        })
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }

    async fn find_review(&self, review_id: ReviewId) -> Result<Option<Review>, StoreError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = $1"
        ))
        .bind(review_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(review_from_row))
    }

    async fn find_user_point(&self, user_id: &str) -> Result<Option<UserPoint>, StoreError> {
        let row = sqlx::query_as::<_, UserPointRow>(
            "SELECT user_id, balance, created_at, modified_at FROM user_points WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(user_point_from_row))
    }

    async fn list_point_history(&self, user_id: &str) -> Result<Vec<PointHistory>, StoreError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT id, user_id, increased_amount, decreased_amount, created_at \
             FROM point_histories WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(history_from_row).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
