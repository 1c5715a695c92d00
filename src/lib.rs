//! Release freshness dashboard for GitHub repositories.
//!
//! A [`pipeline::Session`] loads `config.json` from a configuration repository,
//! resolves the latest tags and commits of every listed project concurrently and
//! hands back one [`pipeline::ProjectOutcome`] per project. Lookups are memoized
//! for the lifetime of the session.

pub mod app_env;
pub mod cli;
pub mod commits;
pub mod config;
pub mod display;
pub mod error;
pub mod github_client;
pub mod github_models;
pub mod memo;
pub mod pipeline;
pub mod repo_id;
pub mod staleness;
pub mod tags;

pub mod commands {
    pub mod dashboard;
}

#[cfg(test)]
mod testing;

pub use crate::{
    error::{ConfigError, FetchError, ProjectError},
    github_client::{GitHubClient, GitHubClientImpl},
    pipeline::{ProjectOutcome, ProjectView, Session, SessionConfig},
    repo_id::RepoId,
};
