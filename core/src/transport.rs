//! Blocking HTTP transport.
//!
//! # Design
//! A call is three steps, each usable on its own:
//! 1. `build_*` resolves the path against the base URL, encodes the query or
//!    JSON body and returns an [`HttpRequest`] without touching the network.
//! 2. [`Transport::send`] performs the round trip with `ureq` and returns the
//!    response as data, whatever its status.
//! 3. [`check_response`] rejects codes outside 200..300 and [`decode`] parses
//!    the body into the caller's type, keeping the raw response next to it.
//!
//! Nothing is retried. Transport failures from `ureq` (including a redirect
//! loop hitting the redirect limit) are returned as they are.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::DEFAULT_BODY_LIMIT;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::ToQuery;

const CONTENT_TYPE_JSON: &str = "application/json";

/// A decoded value together with the response it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub value: T,
    pub response: HttpResponse,
}

impl<T> Reply<T> {
    /// The response body exactly as received.
    pub fn raw_body(&self) -> &str {
        &self.response.body
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    /// Split into `(decoded_value, raw_body)`.
    pub fn into_parts(self) -> (T, String) {
        (self.value, self.response.body)
    }
}

/// Sends requests to one base URL through a `ureq` agent.
#[derive(Clone)]
pub struct Transport {
    agent: ureq::Agent,
    base_url: Url,
    body_limit: u64,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// The agent must not turn status codes into errors
    /// (`http_status_as_error(false)`), otherwise non-2xx responses surface as
    /// transport errors instead of [`ApiError::HttpStatus`].
    pub fn new(agent: ureq::Agent, base_url: Url) -> Self {
        Self {
            agent,
            base_url,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Cap on the response body size; larger bodies fail with
    /// `ureq::Error::BodyExceedsLimit`.
    pub fn with_body_limit(mut self, body_limit: u64) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn body_limit(&self) -> u64 {
        self.body_limit
    }

    /// Resolve `path` against the base URL. Absolute URLs are returned as is.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        if !self.base_url.path().ends_with('/') {
            return Err(ApiError::Config(format!(
                "base URL must have a trailing slash, but {:?} does not",
                self.base_url.as_str()
            )));
        }
        Ok(self.base_url.join(path)?)
    }

    /// Build a request whose body, if any, is `body` encoded as JSON.
    pub fn build_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;
        let (headers, body) = match body {
            Some(body) => {
                let encoded = serde_json::to_string(body).map_err(ApiError::Serialization)?;
                (
                    vec![("content-type".to_string(), CONTENT_TYPE_JSON.to_string())],
                    Some(encoded),
                )
            }
            None => (Vec::new(), None),
        };
        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Build a request carrying `body` verbatim. No content type is set.
    pub fn build_raw_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method,
            url: self.resolve(path)?,
            headers: Vec::new(),
            body,
        })
    }

    /// Build a bodiless GET with `query` appended to the URL.
    pub fn build_get<Q>(&self, path: &str, query: &Q) -> Result<HttpRequest, ApiError>
    where
        Q: ToQuery + ?Sized,
    {
        let mut request = self.build_request::<()>(HttpMethod::Get, path, None)?;
        let query = query.to_query();
        if !query.is_empty() {
            request.url.set_query(Some(&query.encode()));
        }
        Ok(request)
    }

    /// Build a POST with `body` as JSON.
    pub fn build_post<B>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build_request(HttpMethod::Post, path, Some(body))
    }

    /// Perform the round trip. The status code is not inspected.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        // The query string carries the token, so only the path is logged.
        debug!(method = %request.method, path = request.url.path(), "sending request");

        let url = request.url.as_str();
        let mut response = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => {
                let mut builder = self.agent.get(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            (HttpMethod::Post, body) => {
                let mut builder = self.agent.post(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes())?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.body_limit)
            .read_to_string()?;

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    /// Send `request` and reject non-2xx responses.
    pub fn execute_raw(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = self.send(request)?;
        check_response(&response)?;
        Ok(response)
    }

    /// Send `request`, reject non-2xx responses and decode the JSON body.
    pub fn execute<T>(&self, request: &HttpRequest) -> Result<Reply<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        decode(self.execute_raw(request)?)
    }

    pub fn get<Q, T>(&self, path: &str, query: &Q) -> Result<Reply<T>, ApiError>
    where
        Q: ToQuery + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(&self.build_get(path, query)?)
    }

    pub fn post<B, T>(&self, path: &str, body: &B) -> Result<Reply<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(&self.build_post(path, body)?)
    }
}

/// Map status codes outside 200..300 to [`ApiError::HttpStatus`].
pub fn check_response(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    warn!(status = response.status, "request failed with non-success status");
    Err(ApiError::HttpStatus {
        status: response.status,
        body: response.body.clone(),
    })
}

/// Decode the JSON body of `response` into `T`.
pub fn decode<T>(response: HttpResponse) -> Result<Reply<T>, ApiError>
where
    T: DeserializeOwned,
{
    match serde_json::from_str(&response.body) {
        Ok(value) => Ok(Reply { value, response }),
        Err(source) => Err(ApiError::Decode { source, response }),
    }
}
