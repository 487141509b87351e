//! Error taxonomy for tag creation.
//!
//! Library operations return [`TagError`] so callers can tell a credential
//! problem from a remote rejection from a transport failure.  The binary wraps
//! these in `anyhow` for reporting.

use std::fmt;

/// Which of the two Git data API calls an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStep {
    /// `POST /repos/{repo}/git/tags`
    CreateTagObject,
    /// `POST /repos/{repo}/git/refs`
    CreateRef,
}

impl fmt::Display for ApiStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateTagObject => f.write_str("create tag object"),
            Self::CreateRef => f.write_str("create ref"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("no usable credentials found: {reason}")]
    CredentialsNotFound { reason: String },

    #[error("{step} failed with HTTP {status}: {body}")]
    RemoteApi {
        step: ApiStep,
        status: u16,
        body: String,
    },

    #[error("{step} request failed: {source}")]
    Network {
        step: ApiStep,
        #[source]
        source: reqwest::Error,
    },

    #[error("{step} returned an unexpected body: {source}")]
    MalformedResponse {
        step: ApiStep,
        #[source]
        source: serde_json::Error,
    },

    #[error("create ref response did not include a url")]
    MissingRefUrl,

    #[error("invalid tag request: {0}")]
    InvalidRequest(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl TagError {
    pub(crate) fn credentials_not_found(reason: impl Into<String>) -> Self {
        Self::CredentialsNotFound {
            reason: reason.into(),
        }
    }

    /// HTTP status of a remote rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The API call this error came from, if any.
    pub fn step(&self) -> Option<ApiStep> {
        match self {
            Self::RemoteApi { step, .. }
            | Self::Network { step, .. }
            | Self::MalformedResponse { step, .. } => Some(*step),
            Self::MissingRefUrl => Some(ApiStep::CreateRef),
            Self::CredentialsNotFound { .. }
            | Self::InvalidRequest(_)
            | Self::InvalidConfig(_)
            | Self::HttpClient(_) => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
