use crate::{
    config::ProjectConfig,
    error::FetchError,
    github_client::GitHubClient,
    github_models::{GhCommit, GhCommitActor, GhUser},
    memo::{FailurePolicy, Memo},
    repo_id::RepoId,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::debug;

#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
    pub date: DateTime<Utc>,
    pub author: Identity,
    pub committer: Identity,
}

#[derive(Serialize, PartialEq, Clone, Debug, Default)]
pub struct Identity {
    pub name: String,
    pub email: String,
    /// Missing when the commit email is not linked to a GitHub account.
    pub avatar_url: Option<String>,
    pub login: Option<String>,
}

impl Identity {
    fn new(actor: GhCommitActor, user: Option<GhUser>) -> Self {
        let (login, avatar_url) = match user {
            Some(GhUser { login, avatar_url, .. }) => (Some(login), avatar_url),
            None => (None, None),
        };
        Self {
            name: actor.name.unwrap_or_default(),
            email: actor.email.unwrap_or_default(),
            avatar_url,
            login,
        }
    }
}

impl From<GhCommit> for CommitRecord {
    fn from(GhCommit { sha, commit, author, committer }: GhCommit) -> Self {
        let date = commit.author.date;
        Self {
            sha,
            message: strip_merge_preamble(&commit.message),
            date,
            author: Identity::new(commit.author, author),
            committer: Identity::new(commit.committer, committer),
        }
    }
}

/// Removes the `Merge pull request #N from owner/branch` line GitHub writes
/// into merge commits. The rest of the message is kept as is.
pub fn strip_merge_preamble(message: &str) -> String {
    static PREAMBLE: OnceLock<Regex> = OnceLock::new();
    let preamble = PREAMBLE.get_or_init(|| {
        Regex::new(r"Merge pull request #\d+ from \S+").expect("valid merge preamble regex")
    });
    preamble.replace(message, "").into_owned()
}

type CommitKey = (RepoId, String);
type CompareKey = (RepoId, String, String);

/// Resolves commits behind tags.
pub struct CommitResolver<C> {
    client: Arc<C>,
    commits: Memo<CommitKey, CommitRecord, FetchError>,
    comparisons: Memo<CompareKey, Vec<CommitRecord>, FetchError>,
}

impl<C> CommitResolver<C>
where
    C: GitHubClient + 'static,
{
    pub fn new(client: Arc<C>, policy: FailurePolicy) -> Self {
        Self {
            client,
            commits: Memo::new(policy),
            comparisons: Memo::new(policy),
        }
    }

    /// Most recent commit reachable from `gitref`.
    pub async fn get_commit(
        &self,
        project: &ProjectConfig,
        gitref: &str,
    ) -> Result<CommitRecord, FetchError> {
        let key = (project.repo.clone(), gitref.to_owned());
        let client = self.client.clone();
        self.commits
            .get_or_fetch(key, move |(repo_id, gitref)| async move {
                let commit = client.get_head_commit(&repo_id, &gitref).await?;
                let commit = commit.ok_or_else(|| {
                    FetchError::not_found(format!("Commit for `{gitref}` of {repo_id}"))
                })?;
                debug!(repo = %repo_id, %gitref, sha = %commit.sha, "resolved commit");
                Ok(commit.into())
            })
            .await
    }

    /// Commits reachable from `new_ref` but not from `old_ref`, in the order
    /// GitHub returns them.
    pub async fn compare_refs(
        &self,
        project: &ProjectConfig,
        new_ref: &str,
        old_ref: &str,
    ) -> Result<Vec<CommitRecord>, FetchError> {
        let key = (project.repo.clone(), new_ref.to_owned(), old_ref.to_owned());
        let client = self.client.clone();
        self.comparisons
            .get_or_fetch(key, move |(repo_id, new_ref, old_ref)| async move {
                let comparison = client.compare(&repo_id, &old_ref, &new_ref).await?;
                let commits: Vec<CommitRecord> =
                    comparison.commits.into_iter().map(CommitRecord::from).collect();
                let count = commits.len();
                debug!(repo = %repo_id, %old_ref, %new_ref, count, "resolved comparison");
                Ok(commits)
            })
            .await
    }
}
