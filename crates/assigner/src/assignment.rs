//! Reviewer selection rules.
//!
//! Everything here is pure: callers load the roster and pull request state
//! (under the appropriate locks) and persist whatever is decided.

use api_types::{MAX_REVIEWERS, PullRequest, TeamMember};
use rand::{Rng, seq::SliceRandom};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("pull request is already merged")]
    PrMerged,
    #[error("user is not assigned as a reviewer")]
    NotAssigned,
    #[error("no active replacement candidate in team")]
    NoCandidate,
}

/// Picks the initial reviewers from the author's active teammates.
///
/// `candidates` must already exclude the author. Up to two candidates are
/// taken as-is; from larger pools two are drawn from a uniform random
/// permutation, so no candidate is favoured and none is picked twice.
pub fn select_initial_reviewers<R>(mut candidates: Vec<String>, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
{
    candidates.dedup();
    if candidates.len() <= MAX_REVIEWERS {
        return candidates;
    }

    candidates.shuffle(rng);
    candidates.truncate(MAX_REVIEWERS);
    candidates
}

/// Checks that `old_reviewer_id` can be swapped out of `pr`.
pub fn ensure_reassignable(pr: &PullRequest, old_reviewer_id: &str) -> Result<(), AssignmentError> {
    if pr.is_merged() {
        return Err(AssignmentError::PrMerged);
    }
    if !pr.has_reviewer(old_reviewer_id) {
        return Err(AssignmentError::NotAssigned);
    }
    Ok(())
}

/// Members of `roster` allowed to take over from `old_reviewer_id`: active,
/// not the old reviewer, not the author, not already reviewing `pr`.
/// Ordered by `user_id`.
pub fn replacement_pool<'a>(
    pr: &PullRequest,
    old_reviewer_id: &str,
    roster: &'a [TeamMember],
) -> Vec<&'a str> {
    let mut pool: Vec<&str> = roster
        .iter()
        .filter(|member| member.is_active)
        .map(|member| member.user_id.as_str())
        .filter(|user_id| *user_id != old_reviewer_id)
        .filter(|user_id| *user_id != pr.author_id)
        .filter(|user_id| !pr.has_reviewer(user_id))
        .collect();
    pool.sort_unstable();
    pool.dedup();
    pool
}

/// Chooses who replaces `old_reviewer_id` on `pr`.
///
/// Preconditions are checked first (`PrMerged`, then `NotAssigned`). The
/// replacement is the lowest `user_id` in the eligible pool.
pub fn choose_replacement(
    pr: &PullRequest,
    old_reviewer_id: &str,
    roster: &[TeamMember],
) -> Result<String, AssignmentError> {
    ensure_reassignable(pr, old_reviewer_id)?;

    replacement_pool(pr, old_reviewer_id, roster)
        .first()
        .map(|user_id| user_id.to_string())
        .ok_or(AssignmentError::NoCandidate)
}
