use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Repository identifier in `:owner/:name` form.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self { owner, name }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Error, PartialEq, Clone, Debug)]
#[error("Expecting in `:owner/:name` format, but was `{0}`.")]
pub struct ParseRepoIdError(String);

impl FromStr for RepoId {
    type Err = ParseRepoIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sep = s.find('/');
        let r = match sep {
            Some(x) => {
                let owner = &s[..x];
                let name = &s[x + 1..];
                if owner.is_empty() || name.is_empty() {
                    return Err(ParseRepoIdError(s.to_owned()));
                }
                Self::new(owner, name)
            }
            None => return Err(ParseRepoIdError(s.to_owned())),
        };
        Ok(r)
    }
}

impl TryFrom<String> for RepoId {
    type Error = ParseRepoIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RepoId> for String {
    fn from(id: RepoId) -> Self {
        id.to_string()
    }
}
