use chrono::{DateTime, Utc};
use serde::Deserialize;

pub use octocrab::models::Repository as GhRepository;

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct GhTree {
    pub sha: String,
    pub tree: Vec<GhTreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct GhTreeEntry {
    pub path: String,
    pub sha: String,
    pub url: Option<String>,
    pub r#type: String,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct GhBlob {
    pub sha: String,
    pub content: String,
    pub encoding: String,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct GhTag {
    pub name: String,
    pub commit: GhTagCommit,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct GhTagCommit {
    pub sha: String,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct GhCommit {
    pub sha: String,
    pub commit: GhCommitDetail,
    pub author: Option<GhUser>,
    pub committer: Option<GhUser>,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct GhCommitDetail {
    pub author: GhCommitActor,
    pub committer: GhCommitActor,
    pub message: String,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct GhCommitActor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct GhUser {
    pub login: String,
    pub id: u64,
    pub avatar_url: Option<String>,
}

/// Response of the compare endpoint, only the part we read.
#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct GhComparison {
    pub status: Option<String>,
    pub total_commits: Option<u32>,
    pub commits: Vec<GhCommit>,
}
