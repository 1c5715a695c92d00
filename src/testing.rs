//! In-memory GitHub used by unit tests.

use crate::{error::FetchError, github_client::GitHubClient, github_models::*, repo_id::RepoId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

#[derive(Default, Debug)]
pub struct FakeGitHub {
    default_branches: HashMap<RepoId, String>,
    trees: HashMap<(RepoId, String), GhTree>,
    blobs: HashMap<String, GhBlob>,
    tags: HashMap<RepoId, Vec<GhTag>>,
    heads: HashMap<(RepoId, String), GhCommit>,
    comparisons: HashMap<(RepoId, String, String), Vec<GhCommit>>,
    rate_limited: HashSet<RepoId>,
    calls: Mutex<Vec<&'static str>>,
}

pub fn repo(s: &str) -> RepoId {
    s.parse().unwrap()
}

pub fn gh_commit(sha: &str, date: &str, message: &str) -> GhCommit {
    let date: DateTime<Utc> = date.parse().unwrap();
    let actor = GhCommitActor {
        name: Some("Mona Lisa".to_owned()),
        email: Some("mona@example.com".to_owned()),
        date,
    };
    let user: GhUser = serde_json::from_value(serde_json::json!({
        "login": "mona",
        "id": 1,
        "avatar_url": "https://avatars.example.com/mona",
    }))
    .unwrap();
    GhCommit {
        sha: sha.to_owned(),
        commit: GhCommitDetail {
            author: actor.clone(),
            committer: actor,
            message: message.to_owned(),
        },
        author: Some(user.clone()),
        committer: Some(user),
    }
}

impl FakeGitHub {
    /// Serves `config` as `config.json` on `branch` of `repo_id`, which is also
    /// the default branch.
    pub fn with_config(mut self, repo_id: &RepoId, branch: &str, config: &str) -> Self {
        self.default_branches.insert(repo_id.clone(), branch.to_owned());
        self.with_file(repo_id, branch, "config.json", &base64::encode(config))
    }

    /// Serves a file whose blob content is `content` verbatim.
    pub fn with_file(mut self, repo_id: &RepoId, branch: &str, path: &str, content: &str) -> Self {
        let sha = format!("blob-{path}");
        let url = format!("https://api.github.com/repos/{repo_id}/git/blobs/{sha}");
        let tree = self
            .trees
            .entry((repo_id.clone(), branch.to_owned()))
            .or_insert_with(|| GhTree {
                sha: "tree".to_owned(),
                tree: Vec::new(),
                truncated: false,
            });
        tree.tree.push(GhTreeEntry {
            path: path.to_owned(),
            sha: sha.clone(),
            url: Some(url.clone()),
            r#type: "blob".to_owned(),
        });
        self.blobs.insert(
            url,
            GhBlob {
                sha,
                content: content.to_owned(),
                encoding: "base64".to_owned(),
            },
        );
        self
    }

    pub fn with_tags(mut self, repo_id: &RepoId, names: &[&str]) -> Self {
        let tags = names
            .iter()
            .map(|name| GhTag {
                name: (*name).to_owned(),
                commit: GhTagCommit { sha: format!("sha-{name}") },
            })
            .collect();
        self.tags.insert(repo_id.clone(), tags);
        self
    }

    pub fn with_head(mut self, repo_id: &RepoId, gitref: &str, commit: GhCommit) -> Self {
        self.heads.insert((repo_id.clone(), gitref.to_owned()), commit);
        self
    }

    pub fn with_comparison(
        mut self,
        repo_id: &RepoId,
        base: &str,
        head: &str,
        commits: Vec<GhCommit>,
    ) -> Self {
        self.comparisons.insert((repo_id.clone(), base.to_owned(), head.to_owned()), commits);
        self
    }

    pub fn with_rate_limit(mut self, repo_id: &RepoId) -> Self {
        self.rate_limited.insert(repo_id.clone());
        self
    }

    /// Number of requests made to `endpoint`.
    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|x| **x == endpoint).count()
    }

    async fn record(
        &self,
        endpoint: &'static str,
        repo_id: Option<&RepoId>,
    ) -> Result<(), FetchError> {
        self.calls.lock().unwrap().push(endpoint);
        // let sibling requests interleave
        tokio::task::yield_now().await;
        match repo_id {
            Some(x) if self.rate_limited.contains(x) => Err(FetchError::RateLimited),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl GitHubClient for FakeGitHub {
    async fn get_default_branch(&self, repo_id: &RepoId) -> Result<String, FetchError> {
        self.record("repo", Some(repo_id)).await?;
        self.default_branches
            .get(repo_id)
            .cloned()
            .ok_or_else(|| FetchError::not_found(format!("Repository {repo_id}")))
    }

    async fn get_tree(&self, repo_id: &RepoId, branch: &str) -> Result<GhTree, FetchError> {
        self.record("tree", Some(repo_id)).await?;
        self.trees
            .get(&(repo_id.clone(), branch.to_owned()))
            .cloned()
            .ok_or_else(|| FetchError::not_found(format!("Branch `{branch}` of {repo_id}")))
    }

    async fn get_blob(&self, url: &str) -> Result<GhBlob, FetchError> {
        self.record("blob", None).await?;
        self.blobs.get(url).cloned().ok_or_else(|| FetchError::not_found(format!("Blob `{url}`")))
    }

    async fn list_tags(&self, repo_id: &RepoId) -> Result<Vec<GhTag>, FetchError> {
        self.record("tags", Some(repo_id)).await?;
        self.tags
            .get(repo_id)
            .cloned()
            .ok_or_else(|| FetchError::not_found(format!("Tags of {repo_id}")))
    }

    async fn get_head_commit(
        &self,
        repo_id: &RepoId,
        gitref: &str,
    ) -> Result<Option<GhCommit>, FetchError> {
        self.record("commits", Some(repo_id)).await?;
        Ok(self.heads.get(&(repo_id.clone(), gitref.to_owned())).cloned())
    }

    async fn compare(
        &self,
        repo_id: &RepoId,
        base: &str,
        head: &str,
    ) -> Result<GhComparison, FetchError> {
        self.record("compare", Some(repo_id)).await?;
        let commits = self
            .comparisons
            .get(&(repo_id.clone(), base.to_owned(), head.to_owned()))
            .cloned()
            .ok_or_else(|| {
                FetchError::not_found(format!("Comparison `{base}...{head}` of {repo_id}"))
            })?;
        Ok(GhComparison {
            status: Some("ahead".to_owned()),
            total_commits: None,
            commits,
        })
    }
}
