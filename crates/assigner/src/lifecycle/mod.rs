//! Transactional use cases: teams, user activity, pull request lifecycle and
//! reviewer reassignment.
//!
//! Each operation re-reads the state it depends on inside its own
//! transaction. Locks are transaction-scoped (advisory lock per team name,
//! `FOR UPDATE` per pull request row) and end on commit or rollback.

mod context;
mod error;

use std::sync::{Mutex, PoisonError};

pub use context::OpContext;
pub use error::AssignerError;

use api_types::{
    DeactivateUserResponse, PullRequest, PullRequestShort, PullRequestStatus,
    ReviewerReplacement, SkippedReassignment, Stats, Team, User, replace_reviewer,
};
use chrono::Utc;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use sqlx::{Connection, PgConnection, PgPool};
use tracing::{info, instrument, warn};

use crate::{
    assignment,
    db::{
        StoreError, acquire_xact_lock,
        pull_requests::{NewPullRequest, PullRequestRepository},
        stats::StatsRepository,
        team_lock_key,
        users::UserRepository,
    },
};

/// Outcome of a successful reviewer swap.
#[derive(Debug, Clone)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    pub replaced_by: String,
}

pub struct ReviewService {
    pool: PgPool,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self::with_rng(pool, StdRng::from_os_rng())
    }

    /// Uses `rng` for initial reviewer selection. Seed it to make picks reproducible.
    pub fn with_rng(pool: PgPool, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            pool,
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Creates `team` by upserting all of its members.
    ///
    /// Fails with `TeamExists` when any user already carries the team name.
    /// The check runs under a team-name advisory lock, so concurrent creates
    /// of the same name are serialized and exactly one of them wins.
    #[instrument(
        name = "lifecycle.create_team",
        skip(self, ctx, team),
        fields(team_name = %team.team_name, members = team.members.len())
    )]
    pub async fn create_team(&self, ctx: &OpContext, team: Team) -> Result<Team, AssignerError> {
        ctx.run(self.create_team_tx(team)).await
    }

    #[instrument(name = "lifecycle.get_team", skip(self, ctx))]
    pub async fn get_team(&self, ctx: &OpContext, team_name: &str) -> Result<Team, AssignerError> {
        ctx.run(async {
            let members = UserRepository::list_team_members(&self.pool, team_name).await?;
            Ok::<_, AssignerError>(Team {
                team_name: team_name.to_string(),
                members,
            })
        })
        .await
    }

    /// Flips the active flag without touching any reviewer assignment.
    #[instrument(name = "lifecycle.set_user_active", skip(self, ctx))]
    pub async fn set_user_active(
        &self,
        ctx: &OpContext,
        user_id: &str,
        is_active: bool,
    ) -> Result<User, AssignerError> {
        ctx.run(async {
            let user = UserRepository::set_active(&self.pool, user_id, is_active).await?;
            info!("user activity updated");
            Ok::<_, AssignerError>(user)
        })
        .await
    }

    /// Deactivates a user after handing their open reviews to teammates.
    ///
    /// Each reassignment is best effort: it runs in its own savepoint, and a
    /// failure is logged, reported in `skipped`, and leaves that pull request
    /// as it was, storage errors included. Deactivation itself only fails when
    /// the user does not exist or the final update cannot be committed.
    #[instrument(name = "lifecycle.deactivate_user", skip(self, ctx))]
    pub async fn deactivate_user(
        &self,
        ctx: &OpContext,
        user_id: &str,
    ) -> Result<DeactivateUserResponse, AssignerError> {
        ctx.run(self.deactivate_user_tx(user_id)).await
    }

    /// Opens a pull request and assigns up to two active teammates of the author.
    #[instrument(name = "lifecycle.create_pull_request", skip(self, ctx, pull_request_name))]
    pub async fn create_pull_request(
        &self,
        ctx: &OpContext,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> Result<PullRequest, AssignerError> {
        ctx.run(self.create_pull_request_tx(pull_request_id, pull_request_name, author_id))
            .await
    }

    /// Marks a pull request MERGED. Merging an already merged pull request
    /// returns it unchanged without writing.
    #[instrument(name = "lifecycle.merge_pull_request", skip(self, ctx))]
    pub async fn merge_pull_request(
        &self,
        ctx: &OpContext,
        pull_request_id: &str,
    ) -> Result<PullRequest, AssignerError> {
        ctx.run(self.merge_pull_request_tx(pull_request_id)).await
    }

    /// Replaces `old_user_id` on an open pull request with an active teammate
    /// of `old_user_id`. The pull request row stays locked until commit.
    #[instrument(name = "lifecycle.reassign_reviewer", skip(self, ctx))]
    pub async fn reassign_reviewer(
        &self,
        ctx: &OpContext,
        pull_request_id: &str,
        old_user_id: &str,
    ) -> Result<Reassignment, AssignerError> {
        ctx.run(self.reassign_reviewer_tx(pull_request_id, old_user_id))
            .await
    }

    /// Pull requests of any status reviewed by `user_id`. An unknown user
    /// simply has none.
    #[instrument(name = "lifecycle.user_reviews", skip(self, ctx))]
    pub async fn user_reviews(
        &self,
        ctx: &OpContext,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, AssignerError> {
        ctx.run(async {
            let reviews = PullRequestRepository::list_by_reviewer(&self.pool, user_id).await?;
            Ok::<_, AssignerError>(reviews)
        })
        .await
    }

    #[instrument(name = "lifecycle.stats", skip(self, ctx))]
    pub async fn stats(&self, ctx: &OpContext) -> Result<Stats, AssignerError> {
        ctx.run(async {
            let stats = StatsRepository::collect(&self.pool).await?;
            Ok::<_, AssignerError>(stats)
        })
        .await
    }

    async fn create_team_tx(&self, team: Team) -> Result<Team, AssignerError> {
        let mut tx = self.pool.begin().await?;

        acquire_xact_lock(&mut *tx, &team_lock_key(&team.team_name)).await?;

        if UserRepository::count_by_team(&mut *tx, &team.team_name).await? > 0 {
            return Err(AssignerError::TeamExists);
        }

        UserRepository::upsert_members(&mut *tx, &team.team_name, &team.members).await?;
        tx.commit().await?;

        info!("team created");
        Ok(team)
    }

    async fn deactivate_user_tx(
        &self,
        user_id: &str,
    ) -> Result<DeactivateUserResponse, AssignerError> {
        let mut tx = self.pool.begin().await?;

        UserRepository::get_by_id(&mut *tx, user_id).await?;

        let reviews = PullRequestRepository::list_by_reviewer(&mut *tx, user_id).await?;
        let mut reassigned = Vec::new();
        let mut skipped = Vec::new();

        for pr in reviews
            .into_iter()
            .filter(|pr| pr.status == PullRequestStatus::Open)
        {
            let mut savepoint = Connection::begin(&mut *tx).await?;
            match reassign_in_tx(&mut savepoint, &pr.pull_request_id, user_id).await {
                Ok(reassignment) => {
                    savepoint.commit().await?;
                    reassigned.push(ReviewerReplacement {
                        pull_request_id: pr.pull_request_id,
                        replaced_by: reassignment.replaced_by,
                    });
                }
                Err(error) => {
                    savepoint.rollback().await?;
                    warn!(
                        pull_request_id = %pr.pull_request_id,
                        %error,
                        "skipping reviewer reassignment during deactivation"
                    );
                    skipped.push(SkippedReassignment {
                        pull_request_id: pr.pull_request_id,
                        reason: error.to_string(),
                    });
                }
            }
        }

        let user = UserRepository::set_active(&mut *tx, user_id, false).await?;
        tx.commit().await?;

        info!(
            reassigned = reassigned.len(),
            skipped = skipped.len(),
            "user deactivated"
        );
        Ok(DeactivateUserResponse {
            user,
            reassigned,
            skipped,
        })
    }

    async fn create_pull_request_tx(
        &self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> Result<PullRequest, AssignerError> {
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        if PullRequestRepository::exists(&mut *tx, pull_request_id).await? {
            return Err(AssignerError::PrExists);
        }

        let author = UserRepository::find_by_id(&mut *tx, author_id)
            .await?
            .ok_or(AssignerError::NotFound("author"))?;

        let teammates =
            UserRepository::list_active_teammates(&mut *tx, &author.team_name, &author.user_id)
                .await?;
        let reviewers = self.pick_initial_reviewers(teammates);

        let pr = PullRequestRepository::create(
            &mut *tx,
            NewPullRequest {
                pull_request_id,
                pull_request_name,
                author_id,
                assigned_reviewers: &reviewers,
                created_at,
            },
        )
        .await
        .map_err(|error| {
            // Another request inserted the same id after our existence check.
            if error.is_unique_violation() {
                AssignerError::PrExists
            } else {
                AssignerError::from(error)
            }
        })?;
        tx.commit().await?;

        info!(reviewers = ?pr.assigned_reviewers, "pull request created");
        Ok(pr)
    }

    async fn merge_pull_request_tx(
        &self,
        pull_request_id: &str,
    ) -> Result<PullRequest, AssignerError> {
        let merged_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let pr = PullRequestRepository::find_by_id_for_update(&mut *tx, pull_request_id).await?;
        if pr.is_merged() {
            tx.commit().await?;
            return Ok(pr);
        }

        let pr = PullRequestRepository::mark_merged(&mut *tx, pull_request_id, merged_at).await?;
        tx.commit().await?;

        info!("pull request merged");
        Ok(pr)
    }

    async fn reassign_reviewer_tx(
        &self,
        pull_request_id: &str,
        old_user_id: &str,
    ) -> Result<Reassignment, AssignerError> {
        let mut tx = self.pool.begin().await?;
        let reassignment = reassign_in_tx(&mut tx, pull_request_id, old_user_id).await?;
        tx.commit().await?;
        Ok(reassignment)
    }

    fn pick_initial_reviewers(&self, candidates: Vec<String>) -> Vec<String> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        assignment::select_initial_reviewers(candidates, &mut **rng)
    }
}

/// Reassignment steps shared by the public operation and the deactivation
/// cascade. `conn` must be inside a transaction so the row lock taken here
/// holds until the caller commits.
async fn reassign_in_tx(
    conn: &mut PgConnection,
    pull_request_id: &str,
    old_user_id: &str,
) -> Result<Reassignment, AssignerError> {
    let pr = PullRequestRepository::find_by_id_for_update(&mut *conn, pull_request_id).await?;
    assignment::ensure_reassignable(&pr, old_user_id)?;

    let old_reviewer = UserRepository::find_by_id(&mut *conn, old_user_id)
        .await?
        .ok_or(StoreError::NotFound("user"))?;

    let roster = UserRepository::list_replacement_candidates(
        &mut *conn,
        &old_reviewer.team_name,
        old_user_id,
        &pr.author_id,
        pull_request_id,
    )
    .await?;
    let replaced_by = assignment::choose_replacement(&pr, old_user_id, &roster)?;

    let reviewers = replace_reviewer(&pr.assigned_reviewers, old_user_id, &replaced_by);
    PullRequestRepository::update_reviewers(&mut *conn, pull_request_id, &reviewers).await?;

    info!(
        %pull_request_id,
        %old_user_id,
        new_user_id = %replaced_by,
        "reviewer reassigned"
    );

    Ok(Reassignment {
        pull_request: PullRequest {
            assigned_reviewers: reviewers,
            ..pr
        },
        replaced_by,
    })
}
