//! Remote configuration listing the tracked repositories.
//!
//! The configuration lives as `config.json` at the root of a repository's
//! branch and looks like
//!
//! ```json
//! { "repos": [ { "repo": "owner/name", "tag": "v1.0", "deployTargetInterval": 7 } ] }
//! ```

use crate::{
    error::ConfigError,
    github_client::GitHubClient,
    memo::{FailurePolicy, Memo},
    repo_id::RepoId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(PartialEq, Clone, Debug)]
pub struct Configuration {
    pub config_repo: RepoId,
    pub projects: Vec<ProjectConfig>,
}

#[derive(Deserialize, Serialize, PartialEq, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub repo: RepoId,
    /// Pins the project to this single release reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Expected days between releases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_target_interval: Option<f64>,
}

impl ProjectConfig {
    pub fn new(repo: RepoId) -> Self {
        Self {
            repo,
            tag: None,
            deploy_target_interval: None,
        }
    }

    pub fn pinned(repo: RepoId, tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::new(repo)
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    repos: Vec<ProjectConfig>,
}

type ConfigKey = (RepoId, Option<String>);

/// Loads the configuration once per session.
pub struct ConfigFetcher<C> {
    client: Arc<C>,
    config_repo: RepoId,
    branch: Option<String>,
    memo: Memo<ConfigKey, Arc<Configuration>, ConfigError>,
}

impl<C> ConfigFetcher<C>
where
    C: GitHubClient + 'static,
{
    /// Reads from `branch` of `config_repo`, or from its default branch when
    /// `branch` is `None`.
    pub fn new(
        client: Arc<C>,
        config_repo: RepoId,
        branch: Option<String>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            client,
            config_repo,
            branch,
            memo: Memo::new(policy),
        }
    }

    pub async fn load_config(&self) -> Result<Arc<Configuration>, ConfigError> {
        let key = (self.config_repo.clone(), self.branch.clone());
        let client = self.client.clone();
        self.memo
            .get_or_fetch(key, move |(config_repo, branch)| async move {
                let config = fetch_config(&*client, config_repo, branch).await?;
                Ok(Arc::new(config))
            })
            .await
    }
}

#[tracing::instrument(skip(client), fields(repo = %config_repo))]
async fn fetch_config<C>(
    client: &C,
    config_repo: RepoId,
    branch: Option<String>,
) -> Result<Configuration, ConfigError>
where
    C: GitHubClient + ?Sized,
{
    let branch = match branch {
        Some(x) => x,
        None => client.get_default_branch(&config_repo).await?,
    };

    let tree = client.get_tree(&config_repo, &branch).await?;
    let entry = tree.tree.iter().find(|x| x.path == CONFIG_FILE_NAME).ok_or_else(|| {
        ConfigError::NotFound { what: format!("`{CONFIG_FILE_NAME}` on {config_repo}@{branch}") }
    })?;
    let url = entry
        .url
        .clone()
        .unwrap_or_else(|| format!("repos/{config_repo}/git/blobs/{sha}", sha = entry.sha));

    let blob = client.get_blob(&url).await?;
    let text = if blob.encoding == "base64" {
        decode_base64_text(&blob.content)?
    } else {
        blob.content
    };
    let projects = parse_projects(&text)?;
    info!(projects = projects.len(), %branch, "loaded configuration");

    Ok(Configuration {
        config_repo,
        projects,
    })
}

/// Decodes base64 content as served by GitHub, which wraps lines.
pub fn decode_base64_text(content: &str) -> Result<String, ConfigError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::decode(compact)?;
    let text = String::from_utf8(bytes)?;
    Ok(text)
}

/// Parses configuration file text into the tracked projects, in file order.
pub fn parse_projects(text: &str) -> Result<Vec<ProjectConfig>, ConfigError> {
    let ConfigFile { repos } = serde_json::from_str(text)?;
    repos.into_iter().map(validate_project).collect()
}

fn validate_project(mut project: ProjectConfig) -> Result<ProjectConfig, ConfigError> {
    // an empty pin means "not pinned"
    if project.tag.as_deref() == Some("") {
        project.tag = None;
    }
    if let Some(x) = project.deploy_target_interval {
        if !(x.is_finite() && x > 0.) {
            return Err(ConfigError::Parse(format!(
                "`deployTargetInterval` of {} must be a positive number, but was `{}`",
                project.repo, x
            )));
        }
    }
    debug!(?project, "parsed project");
    Ok(project)
}
