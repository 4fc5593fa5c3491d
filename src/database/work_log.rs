use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::work_log::{EntryFilter, WorkLog, WorkLogRequest};

/// Every query is scoped by `user_id`; an entry owned by someone else is
/// indistinguishable from a missing one.
///
/// Description search is case-insensitive via `LOWER()`, so non-ASCII folding
/// depends on the database using UTF-8 with a non-C collation.
/// [`EntryFilter::matches`] applies the same rule in memory.
#[async_trait::async_trait]
pub trait WorkLogRepository {
    async fn create_entry(&self, user_id: i64, request: &WorkLogRequest) -> Result<WorkLog, AppError>;
    async fn get_entry(&self, id: i64, user_id: i64) -> Result<Option<WorkLog>, AppError>;
    /// Newest first.
    async fn list_entries(&self, user_id: i64, filter: &EntryFilter) -> Result<Vec<WorkLog>, AppError>;
    /// Oldest first, for reporting.
    async fn list_entries_chronological(&self, user_id: i64) -> Result<Vec<WorkLog>, AppError>;
    /// Returns false when no entry with this id belongs to the user.
    async fn update_entry(&self, id: i64, user_id: i64, request: &WorkLogRequest) -> Result<bool, AppError>;
    /// Returns false when no entry with this id belongs to the user.
    async fn delete_entry(&self, id: i64, user_id: i64) -> Result<bool, AppError>;
}

#[async_trait::async_trait]
impl WorkLogRepository for PostgresRepository {
    async fn create_entry(&self, user_id: i64, request: &WorkLogRequest) -> Result<WorkLog, AppError> {
        let entry = sqlx::query_as::<_, WorkLog>(
            r#"
            INSERT INTO work_logs (user_id, date, description, hours)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, date, description, hours
            "#,
        )
        .bind(user_id)
        .bind(request.date)
        .bind(&request.description)
        .bind(request.hours)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn get_entry(&self, id: i64, user_id: i64) -> Result<Option<WorkLog>, AppError> {
        let entry = sqlx::query_as::<_, WorkLog>(
            r#"
            SELECT id, user_id, date, description, hours
            FROM work_logs
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn list_entries(&self, user_id: i64, filter: &EntryFilter) -> Result<Vec<WorkLog>, AppError> {
        // POSITION keeps the search literal: '%' and '_' are not wildcards.
        let entries = sqlx::query_as::<_, WorkLog>(
            r#"
            SELECT id, user_id, date, description, hours
            FROM work_logs
            WHERE user_id = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
              AND ($4::text IS NULL OR POSITION(LOWER($4) IN LOWER(description)) > 0)
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.search.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn list_entries_chronological(&self, user_id: i64) -> Result<Vec<WorkLog>, AppError> {
        let entries = sqlx::query_as::<_, WorkLog>(
            r#"
            SELECT id, user_id, date, description, hours
            FROM work_logs
            WHERE user_id = $1
            ORDER BY date ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn update_entry(&self, id: i64, user_id: i64, request: &WorkLogRequest) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE work_logs
            SET date = $1, description = $2, hours = $3
            WHERE id = $4 AND user_id = $5
            "#,
        )
        .bind(request.date)
        .bind(&request.description)
        .bind(request.hours)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_entry(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM work_logs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
