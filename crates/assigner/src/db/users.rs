use std::collections::HashMap;

use api_types::{TeamMember, User};
use sqlx::{Executor, Postgres};

use super::StoreError;

pub struct UserRepository;

impl UserRepository {
    pub async fn count_by_team<'e, E>(executor: E, team_name: &str) -> Result<i64, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE team_name = $1")
            .bind(team_name)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    /// Inserts or overwrites every member as belonging to `team_name`.
    ///
    /// A user already known under another team is moved to this one. When the
    /// same `user_id` appears twice, the later entry wins.
    pub async fn upsert_members<'e, E>(
        executor: E,
        team_name: &str,
        members: &[TeamMember],
    ) -> Result<(), StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if members.is_empty() {
            return Ok(());
        }

        // ON CONFLICT cannot touch the same row twice in one statement.
        let mut order: Vec<&str> = Vec::with_capacity(members.len());
        let mut latest: HashMap<&str, &TeamMember> = HashMap::with_capacity(members.len());
        for member in members {
            if latest.insert(member.user_id.as_str(), member).is_none() {
                order.push(member.user_id.as_str());
            }
        }

        let user_ids: Vec<String> = order.iter().map(|id| id.to_string()).collect();
        let usernames: Vec<String> = order.iter().map(|id| latest[id].username.clone()).collect();
        let actives: Vec<bool> = order.iter().map(|id| latest[id].is_active).collect();

        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, team_name, is_active)
            SELECT t.user_id, t.username, $4, t.is_active
            FROM UNNEST($1::text[], $2::text[], $3::bool[]) AS t(user_id, username, is_active)
            ON CONFLICT (user_id) DO UPDATE SET
                username  = EXCLUDED.username,
                team_name = EXCLUDED.team_name,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(&user_ids)
        .bind(&usernames)
        .bind(&actives)
        .bind(team_name)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Lists every member of `team_name`, ordered by `user_id`.
    pub async fn list_team_members<'e, E>(
        executor: E,
        team_name: &str,
    ) -> Result<Vec<TeamMember>, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let members = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT user_id, username, is_active
            FROM users
            WHERE team_name = $1
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(executor)
        .await?;

        if members.is_empty() {
            return Err(StoreError::TeamNotFound);
        }
        Ok(members)
    }

    pub async fn find_by_id<'e, E>(executor: E, user_id: &str) -> Result<Option<User>, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    pub async fn get_by_id<'e, E>(executor: E, user_id: &str) -> Result<User, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        Self::find_by_id(executor, user_id)
            .await?
            .ok_or(StoreError::NotFound("user"))
    }

    pub async fn set_active<'e, E>(
        executor: E,
        user_id: &str,
        is_active: bool,
    ) -> Result<User, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = $1
            WHERE user_id = $2
            RETURNING user_id, username, team_name, is_active
            "#,
        )
        .bind(is_active)
        .bind(user_id)
        .fetch_optional(executor)
        .await?
        .ok_or(StoreError::NotFound("user"))
    }

    /// Active members of `team_name` other than `exclude_user_id`, ordered by `user_id`.
    pub async fn list_active_teammates<'e, E>(
        executor: E,
        team_name: &str,
        exclude_user_id: &str,
    ) -> Result<Vec<String>, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT user_id
            FROM users
            WHERE team_name = $1
              AND is_active
              AND user_id <> $2
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .bind(exclude_user_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    /// Active members of `team_name` eligible to replace `old_reviewer_id` on
    /// `pull_request_id`: not the old reviewer, not `author_id`, and not
    /// already assigned to that pull request. Ordered by `user_id`.
    pub async fn list_replacement_candidates<'e, E>(
        executor: E,
        team_name: &str,
        old_reviewer_id: &str,
        author_id: &str,
        pull_request_id: &str,
    ) -> Result<Vec<TeamMember>, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let candidates = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT u.user_id, u.username, u.is_active
            FROM users u
            WHERE u.team_name = $1
              AND u.is_active
              AND u.user_id <> $2
              AND u.user_id <> $3
              AND NOT EXISTS (
                  SELECT 1
                  FROM pull_requests pr
                  WHERE pr.pull_request_id = $4
                    AND pr.assigned_reviewers @> ARRAY[u.user_id]
              )
            ORDER BY u.user_id
            "#,
        )
        .bind(team_name)
        .bind(old_reviewer_id)
        .bind(author_id)
        .bind(pull_request_id)
        .fetch_all(executor)
        .await?;
        Ok(candidates)
    }
}
