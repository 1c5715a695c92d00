use crate::{
    config::ProjectConfig,
    error::FetchError,
    github_client::GitHubClient,
    memo::{FailurePolicy, Memo},
    repo_id::RepoId,
};
use std::sync::Arc;
use tracing::debug;

/// Tag names, most recent first.
pub type Tags = Vec<String>;

/// Resolves the release tags of tracked projects.
pub struct TagResolver<C> {
    client: Arc<C>,
    memo: Memo<(RepoId, Option<String>), Tags, FetchError>,
}

impl<C> TagResolver<C>
where
    C: GitHubClient + 'static,
{
    pub fn new(client: Arc<C>, policy: FailurePolicy) -> Self {
        Self {
            client,
            memo: Memo::new(policy),
        }
    }

    /// Returns the pinned tag alone when the project has one, otherwise the
    /// repository tags in the order GitHub lists them.
    pub async fn resolve_tags(&self, project: &ProjectConfig) -> Result<Tags, FetchError> {
        let key = (project.repo.clone(), project.tag.clone());
        let client = self.client.clone();
        self.memo
            .get_or_fetch(key, move |(repo_id, pinned)| async move {
                if let Some(tag) = pinned {
                    return Ok(vec![tag]);
                }
                let tags = client.list_tags(&repo_id).await?;
                let names: Tags = tags.into_iter().map(|x| x.name).collect();
                debug!(repo = %repo_id, ?names, "resolved tags");
                Ok(names)
            })
            .await
    }
}
