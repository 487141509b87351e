//! Test doubles for the forge API: an in-process axum server that records
//! requests, and an in-memory [`GitDataApi`] fake.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{OriginalUri, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};

use crate::error::{ApiStep, TagError};
use crate::forge::{GitDataApi, NewReference, NewTagObject, Reference, TagObject};

// ---------------------------------------------------------------------------
// HTTP mock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    body: String,
}

#[derive(Debug)]
struct MockState {
    requests: Vec<RecordedRequest>,
    tags: CannedResponse,
    refs: CannedResponse,
    delay: Option<Duration>,
}

type Shared = Arc<Mutex<MockState>>;

#[derive(Clone, Copy)]
enum Endpoint {
    Tags,
    Refs,
}

/// A forge API on `127.0.0.1` that answers the tag and ref endpoints with
/// canned responses.
pub struct MockForge {
    addr: SocketAddr,
    state: Shared,
}

impl MockForge {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState {
            requests: Vec::new(),
            tags: CannedResponse {
                status: StatusCode::CREATED,
                body: json!({
                    "sha": "deadbeef",
                    "url": "https://api.example.com/repos/acme/widgets/git/tags/deadbeef"
                })
                .to_string(),
            },
            refs: CannedResponse {
                status: StatusCode::CREATED,
                body: json!({
                    "ref": "refs/tags/v1.0.0",
                    "url": "https://api.example.com/repos/acme/widgets/git/refs/tags/v1.0.0",
                    "object": {"sha": "deadbeef", "type": "tag"}
                })
                .to_string(),
            },
            delay: None,
        }));

        let app = Router::new()
            .route("/repos/:owner/:name/git/tags", post(tags_handler))
            .route("/repos/:owner/:name/git/refs", post(refs_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn respond_tags(&self, status: StatusCode, body: Value) {
        self.state.lock().unwrap().tags = CannedResponse {
            status,
            body: body.to_string(),
        };
    }

    pub fn respond_refs(&self, status: StatusCode, body: Value) {
        self.respond_refs_raw(status, &body.to_string());
    }

    pub fn respond_refs_raw(&self, status: StatusCode, body: &str) {
        self.state.lock().unwrap().refs = CannedResponse {
            status,
            body: body.to_string(),
        };
    }

    pub fn delay_responses(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

async fn tags_handler(
    State(state): State<Shared>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    respond(state, Endpoint::Tags, uri.path().to_string(), &headers, &body).await
}

async fn refs_handler(
    State(state): State<Shared>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    respond(state, Endpoint::Refs, uri.path().to_string(), &headers, &body).await
}

async fn respond(
    state: Shared,
    endpoint: Endpoint,
    path: String,
    headers: &HeaderMap,
    body: &[u8],
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };

    let (canned, delay) = {
        let mut guard = state.lock().unwrap();
        guard.requests.push(RecordedRequest {
            path,
            authorization: header_str(header::AUTHORIZATION),
            accept: header_str(header::ACCEPT),
            body: serde_json::from_slice(body).unwrap_or(Value::Null),
        });
        let canned = match endpoint {
            Endpoint::Tags => guard.tags.clone(),
            Endpoint::Refs => guard.refs.clone(),
        };
        (canned, guard.delay)
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    (
        canned.status,
        [(header::CONTENT_TYPE, "application/json")],
        canned.body,
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// In-memory fake
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    CreateTagObject { repo: String, body: NewTagObject },
    CreateRef { repo: String, body: NewReference },
}

/// Outcome the fake returns for one endpoint.  `Err(status)` becomes a
/// [`TagError::RemoteApi`].
pub type Outcome<T> = Result<T, u16>;

pub struct RecordingApi {
    pub tag_response: Outcome<TagObject>,
    pub ref_response: Outcome<Reference>,
    calls: Mutex<Vec<ApiCall>>,
}

impl RecordingApi {
    pub fn new(tag_response: Outcome<TagObject>, ref_response: Outcome<Reference>) -> Self {
        Self {
            tag_response,
            ref_response,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Both calls succeed; the ref response carries `ref_url`.
    pub fn succeeding(tag_sha: Option<&str>, ref_url: &str) -> Self {
        Self::new(
            Ok(TagObject {
                sha: tag_sha.map(str::to_string),
                ..TagObject::default()
            }),
            Ok(Reference {
                url: Some(ref_url.to_string()),
                ..Reference::default()
            }),
        )
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn canned_result<T: Clone>(canned: &Outcome<T>, step: ApiStep) -> Result<T, TagError> {
    canned.clone().map_err(|status| TagError::RemoteApi {
        step,
        status,
        body: json!({"message": "canned failure"}).to_string(),
    })
}

#[async_trait]
impl GitDataApi for RecordingApi {
    async fn create_tag_object(
        &self,
        repo: &str,
        tag: &NewTagObject,
    ) -> Result<TagObject, TagError> {
        self.calls.lock().unwrap().push(ApiCall::CreateTagObject {
            repo: repo.to_string(),
            body: tag.clone(),
        });
        canned_result(&self.tag_response, ApiStep::CreateTagObject)
    }

    async fn create_ref(
        &self,
        repo: &str,
        reference: &NewReference,
    ) -> Result<Reference, TagError> {
        self.calls.lock().unwrap().push(ApiCall::CreateRef {
            repo: repo.to_string(),
            body: reference.clone(),
        });
        canned_result(&self.ref_response, ApiStep::CreateRef)
    }
}
