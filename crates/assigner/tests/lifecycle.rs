//! Lifecycle operations against a real PostgreSQL.
//!
//! Set `TEST_DATABASE_URL` to run these; without it every test returns early.
//! Each test namespaces its ids so runs can share one database.

use std::collections::HashSet;

use api_types::{PullRequest, PullRequestStatus, Team, TeamMember};
use rand::{SeedableRng, rngs::StdRng};
use review_assigner::{
    db::{MIGRATOR, pull_requests::PullRequestRepository, users::UserRepository},
    lifecycle::{AssignerError, OpContext, ReviewService},
};
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");
    MIGRATOR.run(&pool).await.expect("run migrations");
    Some(pool)
}

macro_rules! require_db {
    () => {
        match test_pool().await {
            Some(pool) => pool,
            None => {
                eprintln!("TEST_DATABASE_URL not set, skipping");
                return;
            }
        }
    };
}

/// Per-test id namespace.
struct Ns(String);

impl Ns {
    fn new() -> Self {
        Ns(Uuid::new_v4().simple().to_string()[..12].to_string())
    }

    fn id(&self, name: &str) -> String {
        format!("{}-{}", self.0, name)
    }

    fn ids(&self, names: &[&str]) -> Vec<String> {
        names.iter().map(|name| self.id(name)).collect()
    }
}

fn service(pool: &PgPool) -> ReviewService {
    ReviewService::with_rng(pool.clone(), StdRng::seed_from_u64(17))
}

fn ctx() -> OpContext {
    OpContext::default()
}

fn team(ns: &Ns, name: &str, members: &[(&str, bool)]) -> Team {
    Team {
        team_name: ns.id(name),
        members: members
            .iter()
            .map(|(user, is_active)| TeamMember {
                user_id: ns.id(user),
                username: format!("user {user}"),
                is_active: *is_active,
            })
            .collect(),
    }
}

async fn load_pr(pool: &PgPool, pull_request_id: &str) -> PullRequest {
    PullRequestRepository::find_by_id_for_update(pool, pull_request_id)
        .await
        .expect("pull request exists")
}

fn assert_reviewer_invariants(pr: &PullRequest) {
    let unique: HashSet<&String> = pr.assigned_reviewers.iter().collect();
    assert_eq!(unique.len(), pr.assigned_reviewers.len(), "duplicate reviewer");
    assert!(!pr.has_reviewer(&pr.author_id), "author assigned to own PR");
    assert!(pr.assigned_reviewers.len() <= 2);
}

#[tokio::test]
async fn create_pr_assigns_two_teammates() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(
        &ctx(),
        team(&ns, "core", &[("u1", true), ("u2", true), ("u3", true), ("u4", true)]),
    )
    .await
    .unwrap();

    let pr = svc
        .create_pull_request(&ctx(), &ns.id("pr1"), "Add search", &ns.id("u1"))
        .await
        .unwrap();

    assert_eq!(pr.status, PullRequestStatus::Open);
    assert!(pr.merged_at.is_none());
    assert_eq!(pr.assigned_reviewers.len(), 2);
    let allowed = ns.ids(&["u2", "u3", "u4"]);
    assert!(pr.assigned_reviewers.iter().all(|r| allowed.contains(r)));
    assert_reviewer_invariants(&pr);
    assert_eq!(load_pr(&pool, &ns.id("pr1")).await, pr);
}

#[tokio::test]
async fn create_pr_in_small_team_assigns_the_only_teammate() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(&ctx(), team(&ns, "infra", &[("u1", true), ("u2", true)]))
        .await
        .unwrap();

    let pr = svc
        .create_pull_request(&ctx(), &ns.id("pr1"), "Bump deps", &ns.id("u1"))
        .await
        .unwrap();

    assert_eq!(pr.assigned_reviewers, ns.ids(&["u2"]));
}

#[tokio::test]
async fn create_pr_without_active_teammates_has_no_reviewers() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(&ctx(), team(&ns, "solo", &[("u1", true), ("u2", false)]))
        .await
        .unwrap();

    let pr = svc
        .create_pull_request(&ctx(), &ns.id("pr1"), "Lonely change", &ns.id("u1"))
        .await
        .unwrap();

    assert!(pr.assigned_reviewers.is_empty());
}

#[tokio::test]
async fn create_pr_rejects_duplicate_id_and_unknown_author() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(&ctx(), team(&ns, "core", &[("u1", true), ("u2", true)]))
        .await
        .unwrap();
    svc.create_pull_request(&ctx(), &ns.id("pr1"), "First", &ns.id("u1"))
        .await
        .unwrap();

    let err = svc
        .create_pull_request(&ctx(), &ns.id("pr1"), "Again", &ns.id("u2"))
        .await
        .unwrap_err();
    assert!(matches!(err, AssignerError::PrExists));

    let err = svc
        .create_pull_request(&ctx(), &ns.id("pr2"), "Ghost", &ns.id("nobody"))
        .await
        .unwrap_err();
    assert!(matches!(err, AssignerError::NotFound(_)));
}

#[tokio::test]
async fn merge_is_idempotent() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(&ctx(), team(&ns, "core", &[("u1", true), ("u2", true)]))
        .await
        .unwrap();
    let created = svc
        .create_pull_request(&ctx(), &ns.id("pr1"), "Ship it", &ns.id("u1"))
        .await
        .unwrap();

    let first = svc.merge_pull_request(&ctx(), &ns.id("pr1")).await.unwrap();
    let second = svc.merge_pull_request(&ctx(), &ns.id("pr1")).await.unwrap();

    assert_eq!(first.status, PullRequestStatus::Merged);
    assert_eq!(second.status, PullRequestStatus::Merged);
    assert!(first.merged_at.is_some());
    assert_eq!(first.merged_at, second.merged_at);
    assert_eq!(first.assigned_reviewers, created.assigned_reviewers);
    assert_eq!(first.created_at, created.created_at);

    let err = svc
        .merge_pull_request(&ctx(), &ns.id("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, AssignerError::NotFound(_)));
}

#[tokio::test]
async fn reassign_replaces_reviewer_with_free_teammate() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(
        &ctx(),
        team(&ns, "core", &[("u1", true), ("u2", true), ("u3", false)]),
    )
    .await
    .unwrap();
    let pr = svc
        .create_pull_request(&ctx(), &ns.id("pr1"), "Refactor", &ns.id("u1"))
        .await
        .unwrap();
    assert_eq!(pr.assigned_reviewers, ns.ids(&["u2"]));
    svc.set_user_active(&ctx(), &ns.id("u3"), true).await.unwrap();

    let reassignment = svc
        .reassign_reviewer(&ctx(), &ns.id("pr1"), &ns.id("u2"))
        .await
        .unwrap();

    assert_eq!(reassignment.replaced_by, ns.id("u3"));
    assert_eq!(reassignment.pull_request.assigned_reviewers, ns.ids(&["u3"]));
    assert_eq!(load_pr(&pool, &ns.id("pr1")).await.assigned_reviewers, ns.ids(&["u3"]));
}

#[tokio::test]
async fn reassign_picks_lowest_user_id() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(
        &ctx(),
        team(
            &ns,
            "core",
            &[("u1", true), ("u2", true), ("u5", false), ("u4", false)],
        ),
    )
    .await
    .unwrap();
    svc.create_pull_request(&ctx(), &ns.id("pr1"), "Tidy", &ns.id("u1"))
        .await
        .unwrap();
    svc.set_user_active(&ctx(), &ns.id("u5"), true).await.unwrap();
    svc.set_user_active(&ctx(), &ns.id("u4"), true).await.unwrap();

    let reassignment = svc
        .reassign_reviewer(&ctx(), &ns.id("pr1"), &ns.id("u2"))
        .await
        .unwrap();

    assert_eq!(reassignment.replaced_by, ns.id("u4"));
}

#[tokio::test]
async fn reassign_without_candidates_leaves_reviewers_unchanged() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(
        &ctx(),
        team(
            &ns,
            "core",
            &[("u1", true), ("u2", true), ("u3", true), ("u4", false)],
        ),
    )
    .await
    .unwrap();
    let pr = svc
        .create_pull_request(&ctx(), &ns.id("pr1"), "Wide change", &ns.id("u1"))
        .await
        .unwrap();
    assert_eq!(
        pr.assigned_reviewers.iter().collect::<HashSet<_>>(),
        ns.ids(&["u2", "u3"]).iter().collect::<HashSet<_>>()
    );

    let err = svc
        .reassign_reviewer(&ctx(), &ns.id("pr1"), &ns.id("u2"))
        .await
        .unwrap_err();

    assert!(matches!(err, AssignerError::NoCandidate));
    assert_eq!(
        load_pr(&pool, &ns.id("pr1")).await.assigned_reviewers,
        pr.assigned_reviewers
    );
}

#[tokio::test]
async fn reassign_checks_preconditions() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(
        &ctx(),
        team(&ns, "core", &[("u1", true), ("u2", true), ("u3", false)]),
    )
    .await
    .unwrap();
    svc.create_pull_request(&ctx(), &ns.id("pr1"), "Feature", &ns.id("u1"))
        .await
        .unwrap();

    let err = svc
        .reassign_reviewer(&ctx(), &ns.id("missing"), &ns.id("u2"))
        .await
        .unwrap_err();
    assert!(matches!(err, AssignerError::NotFound(_)));

    for not_reviewer in ["u1", "u3", "stranger"] {
        let err = svc
            .reassign_reviewer(&ctx(), &ns.id("pr1"), &ns.id(not_reviewer))
            .await
            .unwrap_err();
        assert!(matches!(err, AssignerError::NotAssigned), "{not_reviewer}");
    }

    svc.merge_pull_request(&ctx(), &ns.id("pr1")).await.unwrap();
    svc.set_user_active(&ctx(), &ns.id("u3"), true).await.unwrap();
    let err = svc
        .reassign_reviewer(&ctx(), &ns.id("pr1"), &ns.id("u2"))
        .await
        .unwrap_err();
    assert!(matches!(err, AssignerError::PrMerged));
    assert_eq!(
        load_pr(&pool, &ns.id("pr1")).await.status,
        PullRequestStatus::Merged
    );
}

#[tokio::test]
async fn concurrent_reassignments_never_pick_the_same_replacement() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = std::sync::Arc::new(service(&pool));
    svc.create_team(
        &ctx(),
        team(
            &ns,
            "core",
            &[
                ("a", true),
                ("r1", true),
                ("r2", true),
                ("c1", false),
                ("c2", false),
            ],
        ),
    )
    .await
    .unwrap();
    svc.create_pull_request(&ctx(), &ns.id("pr1"), "Race", &ns.id("a"))
        .await
        .unwrap();
    svc.set_user_active(&ctx(), &ns.id("c1"), true).await.unwrap();
    svc.set_user_active(&ctx(), &ns.id("c2"), true).await.unwrap();

    let pr_id = ns.id("pr1");
    let first = {
        let svc = std::sync::Arc::clone(&svc);
        let (pr_id, old) = (pr_id.clone(), ns.id("r1"));
        tokio::spawn(async move { svc.reassign_reviewer(&ctx(), &pr_id, &old).await })
    };
    let second = {
        let svc = std::sync::Arc::clone(&svc);
        let (pr_id, old) = (pr_id.clone(), ns.id("r2"));
        tokio::spawn(async move { svc.reassign_reviewer(&ctx(), &pr_id, &old).await })
    };

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_ne!(first.replaced_by, second.replaced_by);

    let pr = load_pr(&pool, &pr_id).await;
    assert_reviewer_invariants(&pr);
    assert_eq!(
        pr.assigned_reviewers.iter().collect::<HashSet<_>>(),
        ns.ids(&["c1", "c2"]).iter().collect::<HashSet<_>>()
    );
}

#[tokio::test]
async fn concurrent_reassignments_of_the_same_reviewer_apply_once() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = std::sync::Arc::new(service(&pool));
    svc.create_team(
        &ctx(),
        team(
            &ns,
            "core",
            &[("a", true), ("r1", true), ("c1", false), ("c2", false)],
        ),
    )
    .await
    .unwrap();
    svc.create_pull_request(&ctx(), &ns.id("pr1"), "Race", &ns.id("a"))
        .await
        .unwrap();
    svc.set_user_active(&ctx(), &ns.id("c1"), true).await.unwrap();
    svc.set_user_active(&ctx(), &ns.id("c2"), true).await.unwrap();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let svc = std::sync::Arc::clone(&svc);
            let (pr_id, old) = (ns.id("pr1"), ns.id("r1"));
            tokio::spawn(async move { svc.reassign_reviewer(&ctx(), &pr_id, &old).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AssignerError::NotAssigned) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);
    let pr = load_pr(&pool, &ns.id("pr1")).await;
    assert_eq!(pr.assigned_reviewers.len(), 1);
    assert_reviewer_invariants(&pr);
}

#[tokio::test]
async fn deactivation_reassigns_what_it_can() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(
        &ctx(),
        team(
            &ns,
            "core",
            &[("a", true), ("u2", true), ("x", false), ("y", false)],
        ),
    )
    .await
    .unwrap();
    let pr1 = svc
        .create_pull_request(&ctx(), &ns.id("pr1"), "First", &ns.id("a"))
        .await
        .unwrap();
    assert_eq!(pr1.assigned_reviewers, ns.ids(&["u2"]));
    svc.set_user_active(&ctx(), &ns.id("x"), true).await.unwrap();
    let pr2 = svc
        .create_pull_request(&ctx(), &ns.id("pr2"), "Second", &ns.id("a"))
        .await
        .unwrap();
    assert_eq!(pr2.assigned_reviewers.len(), 2);

    let outcome = svc.deactivate_user(&ctx(), &ns.id("u2")).await.unwrap();

    assert!(!outcome.user.is_active);
    assert_eq!(outcome.reassigned.len(), 1);
    assert_eq!(outcome.reassigned[0].pull_request_id, ns.id("pr1"));
    assert_eq!(outcome.reassigned[0].replaced_by, ns.id("x"));
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].pull_request_id, ns.id("pr2"));

    assert_eq!(load_pr(&pool, &ns.id("pr1")).await.assigned_reviewers, ns.ids(&["x"]));
    let pr2_after = load_pr(&pool, &ns.id("pr2")).await;
    assert!(pr2_after.has_reviewer(&ns.id("u2")));
    assert_eq!(pr2_after.assigned_reviewers, pr2.assigned_reviewers);

    let user = UserRepository::get_by_id(&pool, &ns.id("u2")).await.unwrap();
    assert!(!user.is_active);
}

#[tokio::test]
async fn deactivation_survives_storage_errors_on_one_pull_request() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(
        &ctx(),
        team(&ns, "core", &[("a", true), ("u2", true), ("x", false)]),
    )
    .await
    .unwrap();
    for pr in ["pr1", "pr2"] {
        let created = svc
            .create_pull_request(&ctx(), &ns.id(pr), "Locked", &ns.id("a"))
            .await
            .unwrap();
        assert_eq!(created.assigned_reviewers, ns.ids(&["u2"]));
    }
    svc.set_user_active(&ctx(), &ns.id("x"), true).await.unwrap();

    let url = std::env::var("TEST_DATABASE_URL").unwrap();
    let options: PgConnectOptions = url.parse().unwrap();
    let impatient_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options.options([("lock_timeout", "200ms")]))
        .await
        .unwrap();
    let impatient = service(&impatient_pool);

    let mut blocker = pool.begin().await.unwrap();
    sqlx::query("SELECT 1 FROM pull_requests WHERE pull_request_id = $1 FOR UPDATE")
        .bind(ns.id("pr2"))
        .execute(&mut *blocker)
        .await
        .unwrap();

    let outcome = impatient
        .deactivate_user(&ctx(), &ns.id("u2"))
        .await
        .unwrap();
    blocker.rollback().await.unwrap();

    assert!(!outcome.user.is_active);
    assert_eq!(outcome.reassigned.len(), 1);
    assert_eq!(outcome.reassigned[0].pull_request_id, ns.id("pr1"));
    assert_eq!(outcome.reassigned[0].replaced_by, ns.id("x"));
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].pull_request_id, ns.id("pr2"));

    assert_eq!(load_pr(&pool, &ns.id("pr1")).await.assigned_reviewers, ns.ids(&["x"]));
    assert_eq!(load_pr(&pool, &ns.id("pr2")).await.assigned_reviewers, ns.ids(&["u2"]));
    let user = UserRepository::get_by_id(&pool, &ns.id("u2")).await.unwrap();
    assert!(!user.is_active);
}

#[tokio::test]
async fn deactivation_skips_merged_pull_requests() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(
        &ctx(),
        team(&ns, "core", &[("a", true), ("u2", true), ("x", false)]),
    )
    .await
    .unwrap();
    svc.create_pull_request(&ctx(), &ns.id("pr1"), "Done", &ns.id("a"))
        .await
        .unwrap();
    svc.merge_pull_request(&ctx(), &ns.id("pr1")).await.unwrap();
    svc.set_user_active(&ctx(), &ns.id("x"), true).await.unwrap();

    let outcome = svc.deactivate_user(&ctx(), &ns.id("u2")).await.unwrap();

    assert!(outcome.reassigned.is_empty());
    assert!(outcome.skipped.is_empty());
    assert_eq!(load_pr(&pool, &ns.id("pr1")).await.assigned_reviewers, ns.ids(&["u2"]));

    let err = svc
        .deactivate_user(&ctx(), &ns.id("nobody"))
        .await
        .unwrap_err();
    assert!(matches!(err, AssignerError::NotFound(_)));
}

#[tokio::test]
async fn set_user_active_does_not_touch_reviews() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(
        &ctx(),
        team(&ns, "core", &[("u1", true), ("u2", true), ("u3", false)]),
    )
    .await
    .unwrap();
    svc.create_pull_request(&ctx(), &ns.id("pr1"), "Feature", &ns.id("u1"))
        .await
        .unwrap();
    svc.set_user_active(&ctx(), &ns.id("u3"), true).await.unwrap();

    let user = svc
        .set_user_active(&ctx(), &ns.id("u2"), false)
        .await
        .unwrap();

    assert!(!user.is_active);
    assert_eq!(user.team_name, ns.id("core"));
    assert_eq!(load_pr(&pool, &ns.id("pr1")).await.assigned_reviewers, ns.ids(&["u2"]));

    let err = svc
        .set_user_active(&ctx(), &ns.id("nobody"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, AssignerError::NotFound(_)));
}

#[tokio::test]
async fn team_creation_and_lookup() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    let created = svc
        .create_team(&ctx(), team(&ns, "core", &[("u2", false), ("u1", true)]))
        .await
        .unwrap();

    let fetched = svc.get_team(&ctx(), &created.team_name).await.unwrap();
    assert_eq!(fetched.team_name, ns.id("core"));
    assert_eq!(
        fetched.members.iter().map(|m| m.user_id.clone()).collect::<Vec<_>>(),
        ns.ids(&["u1", "u2"])
    );
    assert!(!fetched.members[1].is_active);

    let err = svc
        .create_team(&ctx(), team(&ns, "core", &[("u9", true)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AssignerError::TeamExists));
    assert!(
        UserRepository::find_by_id(&pool, &ns.id("u9"))
            .await
            .unwrap()
            .is_none()
    );

    let err = svc.get_team(&ctx(), &ns.id("ghosts")).await.unwrap_err();
    assert!(matches!(err, AssignerError::TeamNotFound));
}

#[tokio::test]
async fn team_creation_rehomes_existing_users() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(&ctx(), team(&ns, "old", &[("u1", true), ("u2", true)]))
        .await
        .unwrap();

    let mut new_team = team(&ns, "new", &[("u2", false)]);
    new_team.members[0].username = "renamed".into();
    svc.create_team(&ctx(), new_team).await.unwrap();

    let user = UserRepository::get_by_id(&pool, &ns.id("u2")).await.unwrap();
    assert_eq!(user.team_name, ns.id("new"));
    assert_eq!(user.username, "renamed");
    assert!(!user.is_active);
    assert_eq!(svc.get_team(&ctx(), &ns.id("old")).await.unwrap().members.len(), 1);
}

#[tokio::test]
async fn concurrent_team_creation_has_one_winner() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = std::sync::Arc::new(service(&pool));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let svc = std::sync::Arc::clone(&svc);
            let mut request = team(&ns, "race", &[("m", true)]);
            request.members[0].user_id = ns.id(&format!("m{i}"));
            tokio::spawn(async move { svc.create_team(&ctx(), request).await })
        })
        .collect();

    let mut winners = Vec::new();
    for (i, handle) in handles.into_iter().enumerate() {
        match handle.await.unwrap() {
            Ok(_) => winners.push(i),
            Err(AssignerError::TeamExists) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners.len(), 1);

    let members = svc.get_team(&ctx(), &ns.id("race")).await.unwrap().members;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, ns.id(&format!("m{}", winners[0])));
}

#[tokio::test]
async fn cancelled_operations_write_nothing() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    let token = CancellationToken::new();
    token.cancel();

    let err = svc
        .create_team(&OpContext::new(token), team(&ns, "core", &[("u1", true)]))
        .await
        .unwrap_err();

    assert!(matches!(err, AssignerError::Cancelled));
    let err = svc.get_team(&ctx(), &ns.id("core")).await.unwrap_err();
    assert!(matches!(err, AssignerError::TeamNotFound));
}

#[tokio::test]
async fn user_reviews_and_stats() {
    let pool = require_db!();
    let ns = Ns::new();
    let svc = service(&pool);
    svc.create_team(&ctx(), team(&ns, "core", &[("u1", true), ("u2", true)]))
        .await
        .unwrap();
    svc.create_pull_request(&ctx(), &ns.id("pr1"), "One", &ns.id("u1"))
        .await
        .unwrap();
    svc.create_pull_request(&ctx(), &ns.id("pr2"), "Two", &ns.id("u1"))
        .await
        .unwrap();
    svc.merge_pull_request(&ctx(), &ns.id("pr1")).await.unwrap();

    let reviews = svc.user_reviews(&ctx(), &ns.id("u2")).await.unwrap();
    assert_eq!(reviews.len(), 2);
    let statuses: HashSet<_> = reviews.iter().map(|pr| pr.status).collect();
    assert_eq!(
        statuses,
        HashSet::from([PullRequestStatus::Open, PullRequestStatus::Merged])
    );
    assert!(svc.user_reviews(&ctx(), &ns.id("u1")).await.unwrap().is_empty());
    assert!(
        svc.user_reviews(&ctx(), &ns.id("nobody"))
            .await
            .unwrap()
            .is_empty()
    );

    let stats = svc.stats(&ctx()).await.unwrap();
    assert!(stats.total_prs >= 2);
    assert_eq!(
        stats.total_prs,
        stats.prs_by_status.values().copied().sum::<i64>()
    );
    assert!(stats.prs_by_status[&PullRequestStatus::Open] >= 1);
    assert!(stats.prs_by_status[&PullRequestStatus::Merged] >= 1);
    assert!(stats.active_users >= 2);
    assert!(stats.total_teams >= 1);
    assert!(
        stats
            .reviews_by_user
            .windows(2)
            .all(|pair| pair[0].review_count >= pair[1].review_count)
    );
    let load = stats
        .reviews_by_user
        .iter()
        .find(|load| load.user_id == ns.id("u2"))
        .expect("u2 appears in reviewer loads");
    assert_eq!(load.review_count, 2);
}
