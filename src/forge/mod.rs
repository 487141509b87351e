//! Forge Git data API abstraction layer.
//!
//! Provides the [`GitDataApi`] trait covering the two endpoints needed to
//! publish an annotated tag: creating the tag object and creating the ref that
//! points at it.  The tag creator dispatches through this trait so that no
//! URL construction or HTTP handling leaks outside this module.

pub mod github;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TagError;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of `POST /repos/{repo}/git/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTagObject {
    pub tag: String,
    /// SHA or branch name the tag points at.
    pub object: String,
    pub message: String,
    #[serde(rename = "type")]
    pub object_type: String,
}

impl NewTagObject {
    /// Release tag for `revision`: message `release <tag>`, type `commit`.
    pub fn release(tag: &str, revision: &str) -> Self {
        Self {
            tag: tag.to_string(),
            object: revision.to_string(),
            message: format!("release {tag}"),
            object_type: "commit".to_string(),
        }
    }
}

/// Tag object returned by the forge.  Fields the API omits stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TagObject {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

/// Body of `POST /repos/{repo}/git/refs`.
///
/// `sha` is forwarded verbatim from the tag object, so it serializes as
/// `null` when the forge did not return one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReference {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: Option<String>,
}

impl NewReference {
    pub fn tag(tag: &str, sha: Option<String>) -> Self {
        Self {
            ref_name: format!("refs/tags/{tag}"),
            sha,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GitObject {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
}

/// Reference returned by the forge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Reference {
    #[serde(default, rename = "ref")]
    pub ref_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub object: Option<GitObject>,
}

impl Reference {
    /// SHA the reference points at.
    pub fn sha(&self) -> Option<&str> {
        self.object.as_ref()?.sha.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The Git data endpoints of a forge API.
#[async_trait]
pub trait GitDataApi: Send + Sync {
    /// Create an annotated tag object in `repo` (`owner/name`).
    async fn create_tag_object(
        &self,
        repo: &str,
        tag: &NewTagObject,
    ) -> Result<TagObject, TagError>;

    /// Create a reference in `repo` (`owner/name`).
    async fn create_ref(&self, repo: &str, reference: &NewReference)
        -> Result<Reference, TagError>;
}
