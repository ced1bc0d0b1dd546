//! Canary Views web API client
//!
//! Each `QueryService` call opens a [`ViewSession`], performs one logical
//! operation and drops the session again. Opening a session requests a user
//! token; dropping it revokes the token, whether the operation succeeded or
//! not.
//!
//! # Endpoints
//!
//! All calls are JSON `POST`s below `<base>/api/v2/`:
//!
//! - `getUserToken` / `revokeUserToken`: session scope
//! - `browseNodes`: child nodes of a path
//! - `browseTags`: tag search, paged by `continuation`
//! - `getTagData`: samples for a tag, paged by `continuation`

use super::error::{Result, ServiceError};
use super::QueryService;
use crate::range::DateRange;
use crate::types::{DataPoint, TagPath};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Port used when the server address does not carry one
pub const DEFAULT_PORT: u16 = 55236;

const API_PREFIX: &str = "api/v2";
const STATUS_GOOD: &str = "Good";

/// Optional login for the historian
///
/// Without a username the client requests an anonymous token.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Client tuning knobs
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Application name reported when requesting a token
    pub application: String,
    /// Time zone name the server should use for the session
    pub timezone: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Maximum samples requested per `getTagData` page
    pub page_size: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            application: env!("CARGO_PKG_NAME").to_string(),
            timezone: None,
            timeout: Duration::from_secs(30),
            page_size: 10_000,
        }
    }
}

/// Blocking client for a Canary Views server
pub struct CanaryClient {
    base_url: String,
    credentials: Credentials,
    options: ClientOptions,
    agent: ureq::Agent,
}

impl CanaryClient {
    /// Create a client for `server`
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidAddress` if `server` cannot be turned
    /// into an API URL.
    pub fn new(server: &str, credentials: Credentials, options: ClientOptions) -> Result<Self> {
        let base_url = api_base_url(server)?;
        let agent = ureq::AgentBuilder::new()
            .timeout(options.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build();

        Ok(Self {
            base_url,
            credentials,
            options,
            agent,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request a user token and wrap it in a session guard
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the token request fails or is refused.
    pub fn connect(&self) -> Result<ViewSession<'_>> {
        let request = TokenRequest {
            username: self.credentials.username.as_deref(),
            password: self.credentials.password.as_deref(),
            application: &self.options.application,
            timezone: self.options.timezone.as_deref(),
        };
        let response: TokenResponse = self.post("getUserToken", &request)?;
        response.status.check("getUserToken")?;

        let token = response
            .user_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::InvalidResponse {
                operation: "getUserToken".into(),
                message: "no user token returned".into(),
            })?;

        debug!(base_url = %self.base_url, "acquired user token");
        Ok(ViewSession {
            client: self,
            token,
        })
    }

    fn post<B, R>(&self, endpoint: &'static str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, "POST");
        let response = self
            .agent
            .post(&url)
            .send_json(body)
            .map_err(|e| ServiceError::Http {
                operation: endpoint,
                source: Box::new(e),
            })?;
        Ok(response.into_json()?)
    }
}

impl QueryService for CanaryClient {
    fn browse_children(&self, path: &TagPath) -> Result<Vec<String>> {
        self.connect()?.browse_nodes(path.as_query().as_deref())
    }

    fn fetch_tag_data(&self, tag: &str, range: Option<&DateRange>) -> Result<Vec<DataPoint>> {
        self.connect()?.tag_data(tag, range)
    }

    fn search_tags(&self, term: &str, deep: bool) -> Result<Vec<String>> {
        self.connect()?.browse_tags(term, deep)
    }
}

/// A live user token, revoked when dropped
pub struct ViewSession<'a> {
    client: &'a CanaryClient,
    token: String,
}

impl ViewSession<'_> {
    /// Child node names of `path` (`None` for the root)
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the call fails or is refused.
    pub fn browse_nodes(&self, path: Option<&str>) -> Result<Vec<String>> {
        let request = BrowseNodesRequest {
            user_token: &self.token,
            path,
        };
        let response: BrowseNodesResponse = self.client.post("browseNodes", &request)?;
        response.into_names()
    }

    /// All tags matching `search`, following continuations
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if any page fails or is refused.
    pub fn browse_tags(&self, search: &str, deep: bool) -> Result<Vec<String>> {
        let mut tags = Vec::new();
        let mut continuation = None;

        loop {
            let request = BrowseTagsRequest {
                user_token: &self.token,
                search,
                deep,
                continuation: continuation.take(),
            };
            let response: BrowseTagsResponse = self.client.post("browseTags", &request)?;
            response.status.check("browseTags")?;

            let page_empty = response.tags.is_empty();
            tags.extend(response.tags);

            match response.continuation {
                Some(next) if !next.is_null() && !page_empty => continuation = Some(next),
                _ => break,
            }
        }

        debug!(search, count = tags.len(), "tag search finished");
        Ok(tags)
    }

    /// Samples for `tag`, following continuations
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if any page fails or is refused.
    pub fn tag_data(&self, tag: &str, range: Option<&DateRange>) -> Result<Vec<DataPoint>> {
        let mut points = Vec::new();
        let mut continuation = None;

        loop {
            let request = TagDataRequest {
                user_token: &self.token,
                tags: [tag],
                start_time: range.map(|r| format_instant(r.start())),
                end_time: range.map(|r| format_instant(r.end())),
                max_size: self.client.options.page_size,
                continuation: continuation.take(),
            };
            let response: TagDataResponse = self.client.post("getTagData", &request)?;
            response.status.check("getTagData")?;

            let next = response.continuation.clone();
            let page = response.into_points(tag);
            let page_empty = page.is_empty();
            points.extend(page);

            match next {
                Some(next) if !next.is_null() && !page_empty => continuation = Some(next),
                _ => break,
            }
        }

        debug!(tag, count = points.len(), "tag data fetched");
        Ok(points)
    }
}

impl Drop for ViewSession<'_> {
    fn drop(&mut self) {
        let request = RevokeRequest {
            user_token: &self.token,
        };
        let outcome = self
            .client
            .post::<_, StatusEnvelope>("revokeUserToken", &request)
            .and_then(|status| status.check("revokeUserToken"));

        match outcome {
            Ok(()) => debug!("revoked user token"),
            Err(e) => warn!(error = %e, "failed to revoke user token"),
        }
    }
}

/// Turn a server address into the API base URL
///
/// Addresses with an explicit `http://` or `https://` scheme are used as
/// given; bare hosts get `https://` and, unless they name a port, the default
/// Canary port.
///
/// # Errors
///
/// Returns `ServiceError::InvalidAddress` for empty addresses or hosts that
/// contain whitespace or path separators.
pub fn api_base_url(server: &str) -> Result<String> {
    let trimmed = server.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidAddress("empty address".into()));
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Ok(format!("{trimmed}/{API_PREFIX}"));
    }

    if trimmed.contains(char::is_whitespace) || trimmed.contains('/') {
        return Err(ServiceError::InvalidAddress(server.to_string()));
    }

    if trimmed.contains(':') {
        Ok(format!("https://{trimmed}/{API_PREFIX}"))
    } else {
        Ok(format!("https://{trimmed}:{DEFAULT_PORT}/{API_PREFIX}"))
    }
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Default, Deserialize)]
struct StatusEnvelope {
    #[serde(rename = "statusCode", default)]
    status_code: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

impl StatusEnvelope {
    fn check(&self, operation: &str) -> Result<()> {
        match self.status_code.as_deref() {
            None | Some(STATUS_GOOD) => Ok(()),
            Some(code) => {
                let message = if self.errors.is_empty() {
                    code.to_string()
                } else {
                    self.errors.join("; ")
                };
                Err(ServiceError::api(operation, message))
            }
        }
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    application: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    #[serde(flatten)]
    status: StatusEnvelope,
    #[serde(default)]
    user_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RevokeRequest<'a> {
    user_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrowseNodesRequest<'a> {
    user_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
}

#[derive(Deserialize)]
struct BrowseNodesResponse {
    #[serde(flatten)]
    status: StatusEnvelope,
    #[serde(default)]
    nodes: serde_json::Map<String, Value>,
}

impl BrowseNodesResponse {
    fn into_names(self) -> Result<Vec<String>> {
        self.status.check("browseNodes")?;
        Ok(self.nodes.into_iter().map(|(name, _)| name).collect())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrowseTagsRequest<'a> {
    user_token: &'a str,
    search: &'a str,
    deep: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    continuation: Option<Value>,
}

#[derive(Deserialize)]
struct BrowseTagsResponse {
    #[serde(flatten)]
    status: StatusEnvelope,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    continuation: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TagDataRequest<'a> {
    user_token: &'a str,
    tags: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<String>,
    max_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    continuation: Option<Value>,
}

#[derive(Deserialize)]
struct TagDataResponse {
    #[serde(flatten)]
    status: StatusEnvelope,
    #[serde(default)]
    data: HashMap<String, Vec<DataPoint>>,
    #[serde(default)]
    continuation: Option<Value>,
}

impl TagDataResponse {
    /// Samples for `tag`, or for the only returned tag if the server
    /// normalized the name
    fn into_points(mut self, tag: &str) -> Vec<DataPoint> {
        if let Some(points) = self.data.remove(tag) {
            return points;
        }
        if self.data.len() == 1 {
            return self.data.into_values().next().unwrap_or_default();
        }
        Vec::new()
    }
}
