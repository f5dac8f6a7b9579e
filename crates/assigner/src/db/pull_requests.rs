use api_types::{PullRequest, PullRequestShort, PullRequestStatus};
use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use super::StoreError;

pub struct NewPullRequest<'a> {
    pub pull_request_id: &'a str,
    pub pull_request_name: &'a str,
    pub author_id: &'a str,
    pub assigned_reviewers: &'a [String],
    pub created_at: DateTime<Utc>,
}

pub struct PullRequestRepository;

impl PullRequestRepository {
    pub async fn exists<'e, E>(executor: E, pull_request_id: &str) -> Result<bool, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM pull_requests WHERE pull_request_id = $1)",
        )
        .bind(pull_request_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    /// Inserts an OPEN pull request with no merge timestamp.
    pub async fn create<'e, E>(
        executor: E,
        new: NewPullRequest<'_>,
    ) -> Result<PullRequest, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, PullRequest>(
            r#"
            INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id, status,
                assigned_reviewers, created_at, merged_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, NULL)
            RETURNING
                pull_request_id, pull_request_name, author_id, status,
                assigned_reviewers, created_at, merged_at
            "#,
        )
        .bind(new.pull_request_id)
        .bind(new.pull_request_name)
        .bind(new.author_id)
        .bind(PullRequestStatus::Open)
        .bind(new.assigned_reviewers)
        .bind(new.created_at)
        .fetch_one(executor)
        .await?;
        Ok(record)
    }

    /// Loads a pull request and takes a row-level write lock on it.
    ///
    /// Concurrent callers locking the same row block until this transaction
    /// commits or rolls back. Outside a transaction the lock is released as
    /// soon as the statement finishes.
    pub async fn find_by_id_for_update<'e, E>(
        executor: E,
        pull_request_id: &str,
    ) -> Result<PullRequest, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PullRequest>(
            r#"
            SELECT
                pull_request_id, pull_request_name, author_id, status,
                assigned_reviewers, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = $1
            FOR UPDATE
            "#,
        )
        .bind(pull_request_id)
        .fetch_optional(executor)
        .await?
        .ok_or(StoreError::NotFound("pull request"))
    }

    pub async fn update_reviewers<'e, E>(
        executor: E,
        pull_request_id: &str,
        reviewers: &[String],
    ) -> Result<(), StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE pull_requests SET assigned_reviewers = $1 WHERE pull_request_id = $2",
        )
        .bind(reviewers)
        .bind(pull_request_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("pull request"));
        }
        Ok(())
    }

    /// Marks a pull request MERGED. `merged_at` is only written when unset,
    /// so the first merge timestamp is kept.
    pub async fn mark_merged<'e, E>(
        executor: E,
        pull_request_id: &str,
        merged_at: DateTime<Utc>,
    ) -> Result<PullRequest, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PullRequest>(
            r#"
            UPDATE pull_requests
            SET status = $1,
                merged_at = COALESCE(merged_at, $2)
            WHERE pull_request_id = $3
            RETURNING
                pull_request_id, pull_request_name, author_id, status,
                assigned_reviewers, created_at, merged_at
            "#,
        )
        .bind(PullRequestStatus::Merged)
        .bind(merged_at)
        .bind(pull_request_id)
        .fetch_optional(executor)
        .await?
        .ok_or(StoreError::NotFound("pull request"))
    }

    /// Pull requests of any status whose reviewer set contains `user_id`.
    pub async fn list_by_reviewer<'e, E>(
        executor: E,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, PullRequestShort>(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status
            FROM pull_requests
            WHERE assigned_reviewers @> ARRAY[$1::text]
            ORDER BY created_at, pull_request_id
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(records)
    }
}
