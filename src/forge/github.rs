//! GitHub / GitHub Enterprise implementation of [`GitDataApi`].
//!
//! Every request uses basic auth with the resolved credentials and the
//! configured per-request timeout.  Non-success statuses are reported with
//! their body and never retried.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{GitDataApi, NewReference, NewTagObject, Reference, TagObject};
use crate::config::ApiConfig;
use crate::credentials::Credentials;
use crate::error::{ApiStep, TagError};

// ---------------------------------------------------------------------------
// Client struct
// ---------------------------------------------------------------------------

pub struct GitHubApi {
    http_client: reqwest::Client,
    api_url: String,
    credentials: Credentials,
}

impl GitHubApi {
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Result<Self, TagError> {
        config.check().map_err(TagError::InvalidConfig)?;

        let mut headers = reqwest::header::HeaderMap::new();
        let accept = reqwest::header::HeaderValue::from_str(&config.accept).map_err(|_| {
            TagError::InvalidConfig(format!("invalid Accept header value {:?}", config.accept))
        })?;
        headers.insert(reqwest::header::ACCEPT, accept);

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(TagError::HttpClient)?;

        Ok(Self {
            http_client,
            api_url: config.base_url().to_string(),
            credentials,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn git_url(&self, repo: &str, kind: &str) -> String {
        format!("{}/repos/{repo}/git/{kind}", self.api_url)
    }

    async fn post_json<B, R>(&self, step: ApiStep, url: &str, body: &B) -> Result<R, TagError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let resp = self
            .http_client
            .post(url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.secret))
            .json(body)
            .send()
            .await
            .map_err(|source| TagError::Network { step, source })?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(%url, %status, %step, error = %e, "failed to read error response body");
                    format!("<failed to read response body: {e}>")
                }
            };
            warn!(%url, %status, %step, "forge API returned non-success status");
            return Err(TagError::RemoteApi {
                step,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|source| TagError::Network { step, source })?;

        debug!(%url, %status, %step, "forge API call succeeded");
        serde_json::from_slice(&bytes).map_err(|source| TagError::MalformedResponse { step, source })
    }
}

// ---------------------------------------------------------------------------
// Trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl GitDataApi for GitHubApi {
    async fn create_tag_object(
        &self,
        repo: &str,
        tag: &NewTagObject,
    ) -> Result<TagObject, TagError> {
        let url = self.git_url(repo, "tags");
        self.post_json(ApiStep::CreateTagObject, &url, tag).await
    }

    async fn create_ref(
        &self,
        repo: &str,
        reference: &NewReference,
    ) -> Result<Reference, TagError> {
        let url = self.git_url(repo, "refs");
        self.post_json(ApiStep::CreateRef, &url, reference).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
