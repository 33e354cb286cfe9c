//! Pure EasyBroker REST API client
//!
//! A minimal client for the EasyBroker real-estate listing API with no
//! presentation logic. Covers throttled HTTP access, typed models for the
//! heterogeneous upstream JSON, paginated resource clients, and a map-data
//! aggregation service.
//!
//! # Example
//!
//! ```rust,ignore
//! use easybroker_client::{EasyBrokerClient, PropertyFilters};
//!
//! let client = EasyBrokerClient::from_env()?;
//!
//! // List published properties
//! let page = client
//!     .properties()
//!     .list(1, 20, &PropertyFilters::default())
//!     .await?;
//! for property in &page {
//!     println!("{} — {}", property.title.as_deref().unwrap_or("(untitled)"), property.formatted_price());
//! }
//!
//! // Detail lookup by public id
//! let property = client.properties().find("EB-12345").await?;
//! ```
//!
//! Every request funnels through a shared [`RateLimiter`] enforcing
//! EasyBroker's 20 requests/second ceiling, so concurrent callers can share
//! one client (or one limiter across several clients) without tripping the
//! upstream limit.

pub mod config;
pub mod error;
pub mod map_data;
pub mod models;
pub mod rate_limit;
pub mod resources;

pub use config::Config;
pub use error::{EasyBrokerError, Result};
pub use map_data::{InMemoryMapDataCache, MapData, MapDataCache, MapDataService, MapProperty};
pub use models::{
    Location, NextPage, Operation, OperationKind, PaginatedResponse, Pagination, Property,
};
pub use rate_limit::RateLimiter;
pub use resources::{Locations, Properties, PropertyFilters};

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Credential header expected by the upstream API.
const AUTH_HEADER: &str = "X-Authorization";
/// Transport connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Overall per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// EasyBroker API client.
///
/// Cloning is cheap and clones share the same rate limiter.
#[derive(Clone)]
pub struct EasyBrokerClient {
    http: reqwest::Client,
    config: Config,
    limiter: Arc<RateLimiter>,
}

impl EasyBrokerClient {
    /// Create a client with the given API key; the base URL resolves from
    /// the environment or the staging default.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(Config::new(Some(api_key.into()), None)?)
    }

    /// Create a client entirely from `EASYBROKER_API_KEY` /
    /// `EASYBROKER_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::with_config(Config::from_env()?)
    }

    /// Create a client from resolved configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let credential = HeaderValue::from_str(config.api_key()).map_err(|_| {
            EasyBrokerError::Config("API key contains invalid header characters".into())
        })?;
        headers.insert(AUTH_HEADER, credential);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| EasyBrokerError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            limiter: Arc::new(RateLimiter::new()),
        })
    }

    /// Set a custom base URL (staging, proxies, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.with_base_url(url);
        self
    }

    /// Share a rate limiter with other clients, so the 20 requests/second
    /// ceiling holds across all of them.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }

    /// Properties resource.
    pub fn properties(&self) -> Properties<'_> {
        Properties::new(self)
    }

    /// Locations resource.
    pub fn locations(&self) -> Locations<'_> {
        Locations::new(self)
    }

    /// Perform a GET request.
    pub async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Map<String, Value>> {
        self.request(Method::GET, path, params, None).await
    }

    /// Perform a POST request with a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Map<String, Value>> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    /// Perform a PATCH request with a JSON body.
    pub async fn patch(&self, path: &str, body: &Value) -> Result<Map<String, Value>> {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    /// Perform a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Map<String, Value>> {
        self.request(Method::DELETE, path, &[], None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Map<String, Value>> {
        // Admission happens under the limiter's lock; the request itself
        // runs after the lock is released.
        self.limiter.acquire().await;

        let started = std::time::Instant::now();
        let url = format!("{}{}", self.config.base_url(), path);

        let mut request = self.http.request(method.clone(), &url);
        if !params.is_empty() {
            request = request.query(&params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                EasyBrokerError::Timeout(e.to_string())
            } else {
                warn!(error = %e, %method, path, "EasyBroker request failed");
                EasyBrokerError::ServerError(format!("connection failed: {e}"))
            }
        })?;

        let result = Self::read_response(response).await;
        debug!(
            %method,
            path,
            duration_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "EasyBroker request"
        );
        result
    }

    async fn read_response(response: reqwest::Response) -> Result<Map<String, Value>> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await.map_err(|e| {
                if e.is_timeout() {
                    EasyBrokerError::Timeout(e.to_string())
                } else {
                    EasyBrokerError::InvalidResponse(e.to_string())
                }
            })?;
            // 204 No Content and friends
            if text.trim().is_empty() {
                return Ok(Map::new());
            }
            let value: Value = serde_json::from_str(&text)
                .map_err(|e| EasyBrokerError::InvalidResponse(format!("invalid JSON: {e}")))?;
            return Ok(match value {
                Value::Object(map) => map,
                _ => Map::new(),
            });
        }

        let code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        warn!(status = code, body = %body, "EasyBroker API error");

        Err(match code {
            401 => EasyBrokerError::Unauthorized { body },
            404 => EasyBrokerError::NotFound { body },
            429 => EasyBrokerError::RateLimitExceeded { body },
            400..=499 => EasyBrokerError::ClientError { status: code, body },
            500..=599 => EasyBrokerError::ServerError(format!("HTTP {code}: {body}")),
            _ => EasyBrokerError::Unexpected { status: code, body },
        })
    }
}
