//! Typed client for the remote content store.
//!
//! # Architecture
//!
//! The store is a graph-shaped CMS reached over HTTP. This crate exposes the
//! four calls the booking core consumes, behind the [`ContentGateway`] trait:
//!
//! - [`ContentGateway::query_catalog`] - one GraphQL query returning every
//!   tour with its nested occurrence list expanded
//! - [`ContentGateway::search_tours`] - relevance-ranked full-text match on
//!   the tour title
//! - [`ContentGateway::read_node`] / [`ContentGateway::write_node`] - single
//!   record read/update scoped to one locale representation
//!
//! [`ContentClient`] is the production implementation. It is an explicit,
//! constructed dependency: build one from a [`ClientConfig`] and pass it
//! into the core, there is no ambient global client.
//!
//! # Error Handling
//!
//! Every call resolves to a [`ClientError`]: transport and HTTP failures
//! (after the retry budget) become [`ClientError::Upstream`], a missing
//! record becomes [`ClientError::NotFound`], and a write whose version
//! precondition no longer holds becomes [`ClientError::VersionConflict`].
//! Timeouts and retries end here; callers treat any returned error as
//! terminal for the current operation.

pub mod retry;

mod queries;
mod wire;

pub use queries::{QueryTemplates, TemplateError};
pub use wire::{DateEntry, DateFields, NodeRecord, NodeUpdateRequest, TourFields, TourNode};

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use tourdesk_types::{Locale, TourId};

use crate::retry::{RetryOutcome, RetryPolicy, send_with_retry};
use crate::wire::{GraphQlRequest, GraphQlResponse, SearchResponse};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BASE_PATH: &str = "/api/v2";

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Failure of one call against the remote store.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or HTTP error status, after the retry budget.
    #[error("remote store unavailable: {0}")]
    Upstream(String),
    /// The store answered but the addressed record does not exist.
    #[error("record not found in remote store")]
    NotFound,
    /// A write was rejected because the record changed since it was read.
    #[error("write rejected: version precondition failed")]
    VersionConflict,
    /// The store answered with a payload this client cannot decode.
    #[error("malformed payload from remote store: {0}")]
    Decode(String),
}

/// Failure to construct a [`ContentClient`].
///
/// Recoverable by design: the owning startup sequence decides whether a bad
/// template or endpoint is fatal.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("invalid store endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Connection settings for the remote store.
///
/// ```rust
/// use tourdesk_client::ClientConfig;
///
/// let config = ClientConfig::new("store.example.com", "musetech")
///     .with_ssl(true)
///     .with_api_key("secret");
/// # let _ = config;
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    host: String,
    port: Option<u16>,
    ssl: bool,
    project: String,
    api_key: Option<String>,
}

impl ClientConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            ssl: false,
            project: project.into(),
            api_key: None,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.ssl = ssl;
        self
    }

    /// Credential presented as a bearer token on every request. The token
    /// contract itself belongs to the store.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        match self.port {
            Some(port) => format!("{scheme}://{}:{port}{DEFAULT_BASE_PATH}", self.host),
            None => format!("{scheme}://{}{DEFAULT_BASE_PATH}", self.host),
        }
    }
}

/// Production [`ContentGateway`] implementation over HTTP.
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base: Url,
    project: String,
    api_key: Option<String>,
    templates: QueryTemplates,
    retry: RetryPolicy,
}

impl ContentClient {
    pub fn new(config: ClientConfig) -> Result<Self, InitError> {
        let templates = QueryTemplates::load()?;
        let base = Url::parse(&config.base_url())?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            base,
            project: config.project,
            api_key: config.api_key,
            templates,
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/{}/{suffix}", self.base, self.project)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn into_response(outcome: RetryOutcome) -> Result<reqwest::Response, ClientError> {
        match outcome {
            RetryOutcome::Success(response) => Ok(response),
            RetryOutcome::HttpError(response) => match response.status() {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound),
                StatusCode::CONFLICT => Err(ClientError::VersionConflict),
                status => {
                    let body = read_capped_error_body(response).await;
                    Err(ClientError::Upstream(format!("{status}: {body}")))
                }
            },
            RetryOutcome::Exhausted { attempts, source } => Err(ClientError::Upstream(format!(
                "request failed after {attempts} attempts: {source}"
            ))),
            RetryOutcome::NonRetryable(e) => {
                Err(ClientError::Upstream(format!("request failed: {e}")))
            }
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                ClientError::Decode(e.to_string())
            } else {
                ClientError::Upstream(e.to_string())
            }
        })
    }
}

/// The four calls the booking core consumes from the remote store.
///
/// Implemented by [`ContentClient`] in production and by in-memory fakes in
/// the core's tests.
pub trait ContentGateway {
    /// Fetch every tour with its nested occurrence list, in the given
    /// locale's representation.
    fn query_catalog(
        &self,
        locale: Locale,
    ) -> impl Future<Output = Result<Vec<TourNode>, ClientError>> + Send;

    /// Relevance-ranked full-text match on the tour title. Ranking is
    /// entirely delegated to the store.
    fn search_tours(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<Vec<NodeRecord>, ClientError>> + Send;

    /// Read one locale representation of a tour, including its version.
    fn read_node(
        &self,
        id: &TourId,
        locale: Locale,
    ) -> impl Future<Output = Result<NodeRecord, ClientError>> + Send;

    /// Write back one locale representation. The update's version is a
    /// precondition; a stale version yields [`ClientError::VersionConflict`].
    fn write_node(
        &self,
        id: &TourId,
        locale: Locale,
        update: NodeUpdateRequest,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

impl ContentGateway for ContentClient {
    async fn query_catalog(&self, locale: Locale) -> Result<Vec<TourNode>, ClientError> {
        let url = self.endpoint("graphql");
        let body = GraphQlRequest {
            query: self.templates.catalog_query(),
            variables: serde_json::json!({ "lang": [locale.as_str()] }),
        };

        let outcome = send_with_retry(
            || self.authorize(self.http.post(&url)).json(&body),
            &self.retry,
        )
        .await;
        let response = Self::into_response(outcome).await?;
        let envelope: GraphQlResponse = Self::decode(response).await?;

        if !envelope.errors.is_empty() {
            let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ClientError::Upstream(format!(
                "graphql query failed: {}",
                messages.join("; ")
            )));
        }

        let data = envelope
            .data
            .ok_or_else(|| ClientError::Decode("graphql response without data".to_string()))?;
        Ok(data.tours.elements)
    }

    async fn search_tours(&self, title: &str) -> Result<Vec<NodeRecord>, ClientError> {
        let url = self.endpoint("search/nodes");
        let document = self.templates.search_document(title);
        tracing::debug!(needle = %title, "sending tour search request");

        let outcome = send_with_retry(
            || self.authorize(self.http.post(&url)).json(&document),
            &self.retry,
        )
        .await;
        let response = Self::into_response(outcome).await?;
        let list: SearchResponse = Self::decode(response).await?;
        Ok(list.data)
    }

    async fn read_node(&self, id: &TourId, locale: Locale) -> Result<NodeRecord, ClientError> {
        let url = self.endpoint(&format!("nodes/{id}"));

        let outcome = send_with_retry(
            || {
                self.authorize(self.http.get(&url))
                    .query(&[("lang", locale.as_str())])
            },
            &self.retry,
        )
        .await;
        let response = Self::into_response(outcome).await?;
        Self::decode(response).await
    }

    async fn write_node(
        &self,
        id: &TourId,
        locale: Locale,
        update: NodeUpdateRequest,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("nodes/{id}"));

        // Writes are not retried: the version precondition makes a blind
        // replay of a possibly-committed update ambiguous.
        let outcome = send_with_retry(
            || {
                self.authorize(self.http.post(&url))
                    .query(&[("lang", locale.as_str())])
                    .json(&update)
            },
            &RetryPolicy::none(),
        )
        .await;
        Self::into_response(outcome).await?;
        Ok(())
    }
}

async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
