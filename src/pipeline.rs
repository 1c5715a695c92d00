//! Aggregation of release activity for every configured project.

use crate::{
    commits::{CommitRecord, CommitResolver},
    config::{ConfigFetcher, Configuration, ProjectConfig},
    error::{ConfigError, ProjectError},
    github_client::GitHubClient,
    memo::FailurePolicy,
    repo_id::RepoId,
    staleness::{staleness, DEFAULT_TARGET_INTERVAL_DAYS},
    tags::TagResolver,
};
use futures::future;
use serde::Serialize;
use std::{collections::HashSet, sync::Arc};
use tracing::{info, warn};

/// Resolved release activity of one repository.
#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct ProjectView {
    repo: RepoId,
    tags: Vec<String>,
    commits: Vec<CommitRecord>,
}

impl ProjectView {
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Tags, most recent first. Never empty.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Commits, oldest first. Never empty.
    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    pub fn latest_commit(&self) -> &CommitRecord {
        &self.commits[self.commits.len() - 1]
    }

    /// `older...newer` label of the release range the commits came from.
    pub fn release_range(&self) -> String {
        let mut tags: Vec<_> = self.tags.iter().take(2).map(String::as_str).collect();
        tags.reverse();
        tags.join("...")
    }

    /// Staleness of the latest commit as of now.
    pub fn staleness(&self, target_interval_days: Option<f64>) -> f64 {
        let target = target_interval_days.unwrap_or(DEFAULT_TARGET_INTERVAL_DAYS);
        staleness(self.latest_commit().date, target)
    }
}

/// Result of aggregating one configured project.
#[derive(Clone, Debug)]
pub struct ProjectOutcome {
    pub project: ProjectConfig,
    pub result: Result<ProjectView, ProjectError>,
}

impl ProjectOutcome {
    pub fn view(&self) -> Option<&ProjectView> {
        self.result.as_ref().ok()
    }
}

/// Session inputs the pipeline needs.
#[derive(PartialEq, Clone, Debug)]
pub struct SessionConfig {
    pub config_repo: RepoId,
    /// `None` reads the repository default branch.
    pub config_branch: Option<String>,
    pub failure_policy: FailurePolicy,
}

/// One aggregation session. Owns every cache; dropping the session drops them.
pub struct Session<C> {
    config: ConfigFetcher<C>,
    tags: TagResolver<C>,
    commits: CommitResolver<C>,
}

impl<C> Session<C>
where
    C: GitHubClient + 'static,
{
    pub fn new(client: Arc<C>, cfg: SessionConfig) -> Self {
        let SessionConfig {
            config_repo,
            config_branch,
            failure_policy,
        } = cfg;
        Self {
            config: ConfigFetcher::new(client.clone(), config_repo, config_branch, failure_policy),
            tags: TagResolver::new(client.clone(), failure_policy),
            commits: CommitResolver::new(client, failure_policy),
        }
    }

    pub async fn load_config(&self) -> Result<Arc<Configuration>, ConfigError> {
        self.config.load_config().await
    }

    /// Resolves every configured project concurrently.
    ///
    /// Fails only when the configuration can not be loaded. Per-project
    /// failures are reported in the matching outcome, in configuration order.
    #[tracing::instrument(skip(self))]
    pub async fn aggregate(&self) -> Result<Vec<ProjectOutcome>, ConfigError> {
        let config = self.load_config().await?;

        let outcomes = future::join_all(config.projects.iter().map(|project| async move {
            let result = self.resolve_project(project).await;
            if let Err(err) = &result {
                warn!(repo = %project.repo, error = %err, "failed to resolve project");
            }
            ProjectOutcome {
                project: project.clone(),
                result,
            }
        }))
        .await;

        let resolved = outcomes.iter().filter(|x| x.result.is_ok()).count();
        info!(resolved, failed = outcomes.len() - resolved, "aggregated projects");
        Ok(outcomes)
    }

    async fn resolve_project(&self, project: &ProjectConfig) -> Result<ProjectView, ProjectError> {
        let tags = self.tags.resolve_tags(project).await.map_err(ProjectError::Tags)?;
        let commits = match tags.as_slice() {
            [] => return Err(ProjectError::NoTags),
            [tag] => {
                let commit =
                    self.commits.get_commit(project, tag).await.map_err(ProjectError::Commits)?;
                vec![commit]
            }
            [new, old, ..] => {
                let commits = self
                    .commits
                    .compare_refs(project, new, old)
                    .await
                    .map_err(ProjectError::Commits)?;
                let commits = chronological(commits);
                if commits.is_empty() {
                    return Err(ProjectError::NoCommits {
                        new: new.clone(),
                        old: old.clone(),
                    });
                }
                commits
            }
        };
        Ok(ProjectView {
            repo: project.repo.clone(),
            tags,
            commits,
        })
    }
}

/// Turns newest-first commits into oldest-first ones without duplicates.
fn chronological(mut commits: Vec<CommitRecord>) -> Vec<CommitRecord> {
    commits.reverse();
    let mut seen = HashSet::new();
    commits.retain(|x| seen.insert(x.sha.clone()));
    commits.sort_by_key(|x| x.date);
    commits
}
