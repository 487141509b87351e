//! Release tag creation.
//!
//! Publishing a tag is two sequential calls: create the annotated tag object,
//! then create `refs/tags/<tag>` pointing at it.  The sequence is not atomic.
//! If the ref call fails the tag object is left behind without a ref; that
//! failure surfaces as a [`TagError::RemoteApi`] for [`ApiStep::CreateRef`]
//! and nothing is rolled back.
//!
//! [`ApiStep::CreateRef`]: crate::error::ApiStep::CreateRef

use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::credentials::{self, Credentials};
use crate::error::TagError;
use crate::forge::github::GitHubApi;
use crate::forge::{GitDataApi, NewReference, NewTagObject};

/// One tag to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRequest {
    /// `owner/name` of the target repository.
    pub repository: String,
    /// Branch name or commit SHA.  Validity is up to the forge.
    pub revision: String,
    pub tag: String,
}

impl TagRequest {
    pub fn new(
        repository: impl Into<String>,
        revision: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            revision: revision.into(),
            tag: tag.into(),
        }
    }

    pub fn validate(&self) -> Result<(), TagError> {
        for (field, value) in [
            ("repository", &self.repository),
            ("revision", &self.revision),
            ("tag", &self.tag),
        ] {
            if value.is_empty() {
                return Err(TagError::InvalidRequest(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

pub struct TagCreator<B> {
    backend: B,
}

impl TagCreator<GitHubApi> {
    /// Resolve credentials and build a GitHub-backed creator.
    ///
    /// Fails with [`TagError::CredentialsNotFound`] before any HTTP client is
    /// built when neither the environment nor netrc yields credentials.
    pub fn from_config(config: &Config) -> Result<Self, TagError> {
        let credentials = credentials::resolve_credentials(&config.credentials)?;
        Self::with_credentials(config, credentials)
    }

    pub fn with_credentials(config: &Config, credentials: Credentials) -> Result<Self, TagError> {
        let backend = GitHubApi::new(&config.api, credentials)?;
        Ok(Self::new(backend))
    }
}

impl<B: GitDataApi> TagCreator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Create `tag` at `revision` in `repository` and return the ref's URL.
    pub async fn create_tag(
        &self,
        repository: &str,
        revision: &str,
        tag: &str,
    ) -> Result<String, TagError> {
        self.create_tag_request(&TagRequest::new(repository, revision, tag))
            .await
    }

    #[instrument(skip(self, request), fields(repo = %request.repository, tag = %request.tag))]
    pub async fn create_tag_request(&self, request: &TagRequest) -> Result<String, TagError> {
        request.validate()?;

        info!(
            tag = %request.tag,
            repo = %request.repository,
            revision = %request.revision,
            "creating tag"
        );

        let tag_object = self
            .backend
            .create_tag_object(
                &request.repository,
                &NewTagObject::release(&request.tag, &request.revision),
            )
            .await?;

        if tag_object.sha.is_none() {
            warn!(tag = %request.tag, "tag object response has no sha; forwarding null");
        }
        debug!(sha = ?tag_object.sha, "tag object created");

        let reference = self
            .backend
            .create_ref(
                &request.repository,
                &NewReference::tag(&request.tag, tag_object.sha),
            )
            .await?;

        let url = reference.url.ok_or(TagError::MissingRefUrl)?;
        debug!(%url, "tag ref created");
        Ok(url)
    }
}
