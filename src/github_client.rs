use crate::{error::FetchError, github_models::*, repo_id::RepoId};
use anyhow::Error;
use async_trait::async_trait;
use http::header::HeaderName;
use octocrab::Octocrab;
use percent_encoding::{utf8_percent_encode, AsciiSet, PercentEncode, CONTROLS};
use sekret::Secret;
use std::fmt;
use tracing::debug;

/// Bytes escaped when a git ref goes into a request path or query. `/` is kept
/// so `release/1.0` still names the same ref.
const REF_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

fn encode_ref(gitref: &str) -> PercentEncode<'_> {
    utf8_percent_encode(gitref, REF_ESCAPES)
}

fn tree_path(RepoId { owner, name }: &RepoId, branch: &str) -> String {
    format!("repos/{owner}/{name}/git/trees/{}", encode_ref(branch))
}

fn tags_path(RepoId { owner, name }: &RepoId) -> String {
    format!("repos/{owner}/{name}/tags?per_page=100")
}

fn head_commit_path(RepoId { owner, name }: &RepoId, gitref: &str) -> String {
    format!("repos/{owner}/{name}/commits?sha={}&per_page=1", encode_ref(gitref))
}

fn compare_path(RepoId { owner, name }: &RepoId, base: &str, head: &str) -> String {
    format!("repos/{owner}/{name}/compare/{}...{}", encode_ref(base), encode_ref(head))
}

/// GitHub REST endpoints the aggregation reads.
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// https://docs.github.com/en/rest/repos/repos#get-a-repository
    async fn get_default_branch(&self, repo_id: &RepoId) -> Result<String, FetchError>;

    /// https://docs.github.com/en/rest/git/trees#get-a-tree
    async fn get_tree(&self, repo_id: &RepoId, branch: &str) -> Result<GhTree, FetchError>;

    /// https://docs.github.com/en/rest/git/blobs#get-a-blob
    ///
    /// `url` is either the absolute blob URL from a tree entry or a path relative
    /// to the API root.
    async fn get_blob(&self, url: &str) -> Result<GhBlob, FetchError>;

    /// https://docs.github.com/en/rest/repos/repos#list-repository-tags
    async fn list_tags(&self, repo_id: &RepoId) -> Result<Vec<GhTag>, FetchError>;

    /// https://docs.github.com/en/rest/commits/commits#list-commits
    ///
    /// Only the commit `gitref` points at is requested.
    async fn get_head_commit(
        &self,
        repo_id: &RepoId,
        gitref: &str,
    ) -> Result<Option<GhCommit>, FetchError>;

    /// https://docs.github.com/en/rest/commits/commits#compare-two-commits
    async fn compare(
        &self,
        repo_id: &RepoId,
        base: &str,
        head: &str,
    ) -> Result<GhComparison, FetchError>;
}

#[derive(Clone)]
pub struct GitHubClientImpl {
    client: Octocrab,
}

impl GitHubClientImpl {
    pub fn new(token: impl Into<Secret<String>>) -> Result<Self, Error> {
        let user_agent =
            concat!(env!("CARGO_PKG_NAME"), concat!("/", env!("CARGO_PKG_VERSION"))).to_owned();
        let token: Secret<_> = token.into();
        let client = Octocrab::builder()
            .add_header(HeaderName::from_static("user-agent"), user_agent)
            .personal_token(token.0)
            .build()?;
        let s = Self { client };
        Ok(s)
    }
}

impl fmt::Debug for GitHubClientImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClientImpl").finish_non_exhaustive()
    }
}

#[async_trait]
impl GitHubClient for GitHubClientImpl {
    #[tracing::instrument(skip(self), fields(repo = %repo_id))]
    async fn get_default_branch(&self, repo_id: &RepoId) -> Result<String, FetchError> {
        let client = &self.client;
        let repo: GhRepository = client
            .repos(&repo_id.owner, &repo_id.name)
            .get()
            .await
            .map_err(|err| FetchError::from_octocrab(err, format!("Repository {repo_id}")))?;
        debug!(default_branch = ?repo.default_branch, "received repository");
        repo.default_branch
            .ok_or_else(|| FetchError::Decode(format!("{repo_id} has no default branch")))
    }

    #[tracing::instrument(skip(self), fields(repo = %repo_id))]
    async fn get_tree(&self, repo_id: &RepoId, branch: &str) -> Result<GhTree, FetchError> {
        let path = tree_path(repo_id, branch);
        debug!(%path, "sending request");
        let tree: GhTree = self.client.get::<_, _, ()>(path, None).await.map_err(|err| {
            FetchError::from_octocrab(err, format!("Branch `{branch}` of {repo_id}"))
        })?;
        debug!(entries = tree.tree.len(), truncated = tree.truncated, "received tree");
        Ok(tree)
    }

    #[tracing::instrument(skip(self))]
    async fn get_blob(&self, url: &str) -> Result<GhBlob, FetchError> {
        let blob: GhBlob = self
            .client
            .get::<_, _, ()>(url, None)
            .await
            .map_err(|err| FetchError::from_octocrab(err, format!("Blob `{url}`")))?;
        debug!(sha = %blob.sha, encoding = %blob.encoding, "received blob");
        Ok(blob)
    }

    #[tracing::instrument(skip(self), fields(repo = %repo_id))]
    async fn list_tags(&self, repo_id: &RepoId) -> Result<Vec<GhTag>, FetchError> {
        let path = tags_path(repo_id);
        debug!(%path, "sending request");
        let tags: Vec<GhTag> = self
            .client
            .get::<_, _, ()>(path, None)
            .await
            .map_err(|err| FetchError::from_octocrab(err, format!("Tags of {repo_id}")))?;
        debug!(count = tags.len(), "received tags");
        Ok(tags)
    }

    #[tracing::instrument(skip(self), fields(repo = %repo_id))]
    async fn get_head_commit(
        &self,
        repo_id: &RepoId,
        gitref: &str,
    ) -> Result<Option<GhCommit>, FetchError> {
        let path = head_commit_path(repo_id, gitref);
        debug!(%path, "sending request");
        let commits: Vec<GhCommit> = self.client.get::<_, _, ()>(path, None).await.map_err(|err| {
            FetchError::from_octocrab(err, format!("Ref `{gitref}` of {repo_id}"))
        })?;
        Ok(commits.into_iter().next())
    }

    #[tracing::instrument(skip(self), fields(repo = %repo_id))]
    async fn compare(
        &self,
        repo_id: &RepoId,
        base: &str,
        head: &str,
    ) -> Result<GhComparison, FetchError> {
        let path = compare_path(repo_id, base, head);
        debug!(%path, "sending request");
        let comparison: GhComparison =
            self.client.get::<_, _, ()>(path, None).await.map_err(|err| {
                let what = format!("Comparison `{base}...{head}` of {repo_id}");
                FetchError::from_octocrab(err, what)
            })?;
        let count = comparison.commits.len();
        debug!(status = ?comparison.status, count, "received comparison");
        Ok(comparison)
    }
}
