use std::collections::BTreeMap;

use api_types::{PullRequestStatus, ReviewerLoad, Stats};
use sqlx::PgPool;

use super::StoreError;

pub struct StatsRepository;

impl StatsRepository {
    /// Runs the reporting aggregates straight against the pool.
    ///
    /// The queries are not wrapped in a transaction, so counts taken by
    /// different statements may observe different commits.
    pub async fn collect(pool: &PgPool) -> Result<Stats, StoreError> {
        let by_status = sqlx::query_as::<_, (PullRequestStatus, i64)>(
            "SELECT status, COUNT(*) FROM pull_requests GROUP BY status",
        )
        .fetch_all(pool)
        .await?;

        let mut prs_by_status: BTreeMap<PullRequestStatus, i64> =
            PullRequestStatus::ALL.iter().map(|status| (*status, 0)).collect();
        let mut total_prs = 0;
        for (status, count) in by_status {
            prs_by_status.insert(status, count);
            total_prs += count;
        }

        let reviews_by_user = sqlx::query_as::<_, ReviewerLoad>(
            r#"
            SELECT reviewer AS user_id, COUNT(*) AS review_count
            FROM pull_requests, UNNEST(assigned_reviewers) AS reviewer
            GROUP BY reviewer
            ORDER BY review_count DESC, reviewer
            "#,
        )
        .fetch_all(pool)
        .await?;

        let active_users =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_active")
                .fetch_one(pool)
                .await?;

        let total_teams =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT team_name) FROM users")
                .fetch_one(pool)
                .await?;

        Ok(Stats {
            total_prs,
            prs_by_status,
            reviews_by_user,
            active_users,
            total_teams,
        })
    }
}
