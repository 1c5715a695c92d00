use std::sync::Arc;
use thiserror::Error;

/// Failure of a single GitHub API call.
///
/// `Clone` because memoized results are handed to every caller that shares the
/// same request.
#[derive(Error, Clone, Debug)]
pub enum FetchError {
    #[error("{what} was not found")]
    NotFound { what: String },

    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    #[error("request to GitHub failed")]
    Network(#[source] Arc<octocrab::Error>),

    #[error("unexpected response from GitHub: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Network(_))
    }

    /// Classifies an octocrab failure, naming `what` was requested.
    pub fn from_octocrab(err: octocrab::Error, what: impl Into<String>) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } => match classify_message(&source.message) {
                Some(ApiFailure::NotFound) => Self::not_found(what),
                Some(ApiFailure::RateLimited) => Self::RateLimited,
                None => Self::Network(Arc::new(err)),
            },
            octocrab::Error::Serde { .. } => Self::Decode(err.to_string()),
            _ => Self::Network(Arc::new(err)),
        }
    }
}

#[derive(PartialEq, Copy, Clone, Debug)]
enum ApiFailure {
    NotFound,
    RateLimited,
}

fn classify_message(message: &str) -> Option<ApiFailure> {
    if message == "Not Found" {
        Some(ApiFailure::NotFound)
    } else if message.to_ascii_lowercase().contains("rate limit") {
        Some(ApiFailure::RateLimited)
    } else {
        None
    }
}

/// Failure to load the session configuration. Fatal for the whole pipeline.
#[derive(Error, Clone, Debug)]
pub enum ConfigError {
    #[error("{what} was not found")]
    NotFound { what: String },

    #[error("configuration content is not valid base64 text")]
    Decode(#[source] DecodeFailure),

    #[error("configuration is not valid: {0}")]
    Parse(String),

    #[error("failed to fetch configuration")]
    Network(#[source] FetchError),
}

#[derive(Error, Clone, Debug)]
pub enum DecodeFailure {
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<base64::DecodeError> for ConfigError {
    fn from(x: base64::DecodeError) -> Self {
        Self::Decode(x.into())
    }
}

impl From<std::string::FromUtf8Error> for ConfigError {
    fn from(x: std::string::FromUtf8Error) -> Self {
        Self::Decode(x.into())
    }
}

impl From<FetchError> for ConfigError {
    fn from(x: FetchError) -> Self {
        match x {
            FetchError::NotFound { what } => Self::NotFound { what },
            FetchError::Decode(x) => Self::Parse(x),
            x => Self::Network(x),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(x: serde_json::Error) -> Self {
        Self::Parse(x.to_string())
    }
}

/// Failure isolated to one tracked project.
#[derive(Error, Clone, Debug)]
pub enum ProjectError {
    #[error("failed to resolve tags")]
    Tags(#[source] FetchError),

    #[error("failed to resolve commits")]
    Commits(#[source] FetchError),

    #[error("repository has no tags")]
    NoTags,

    #[error("no commits between `{old}` and `{new}`")]
    NoCommits { new: String, old: String },
}
