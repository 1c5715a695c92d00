use crate::{
    github_client::GitHubClientImpl,
    pipeline::{Session, SessionConfig},
};
use anyhow::Error;
use sekret::Secret;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub github_token: Secret<String>,
    pub session: SessionConfig,
}

/// Everything one run of the dashboard needs.
pub struct AppEnv {
    session: Session<GitHubClientImpl>,
}

impl AppEnv {
    pub fn new(AppConfig { github_token, session }: AppConfig) -> Result<Self, Error> {
        let github_client = GitHubClientImpl::new(github_token)?;
        let session = Session::new(Arc::new(github_client), session);
        Ok(Self { session })
    }

    pub fn session(&self) -> &Session<GitHubClientImpl> {
        &self.session
    }
}
