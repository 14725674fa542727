//! API client for the daybook REST API.
//!
//! Every call goes through [`ApiClient::request`], which attaches the stored
//! bearer token, normalizes failures into [`ApiError`] and ends the session
//! when the server answers 401.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::request::{Outcome, RequestOptions, Resource};
use super::ApiError;
use crate::auth::{TokenLookup, TokenStore};
use crate::config::Config;
use crate::models::{parse_list, parse_record};

/// Endpoints that may be called without a credential
const PUBLIC_PATHS: [&str; 2] = ["/login", "/register"];

/// Endpoints whose 401 is an ordinary failure rather than a session rejection
const SESSIONLESS_PATHS: [&str; 1] = ["/register"];

/// API client bound to one base URL and one token store.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    /// Create a client using the transport's default timeout behaviour
    pub fn new(base_url: &str, tokens: Arc<TokenStore>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, tokens, None)
    }

    pub fn from_config(config: &Config, tokens: Arc<TokenStore>) -> Result<Self, ApiError> {
        Self::with_timeout(&config.base_url, tokens, config.request_timeout())
    }

    pub fn with_timeout(
        base_url: &str,
        tokens: Arc<TokenStore>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn path_matches(path: &str, candidates: &[&str]) -> bool {
        let path = path.split('?').next().unwrap_or(path);
        let path = path.trim_end_matches('/');
        let path = path.strip_prefix('/').unwrap_or(path);
        candidates.iter().any(|p| p.trim_start_matches('/') == path)
    }

    fn is_public(path: &str) -> bool {
        Self::path_matches(path, &PUBLIC_PATHS)
    }

    fn is_sessionless(path: &str) -> bool {
        Self::path_matches(path, &SESSIONLESS_PATHS)
    }

    /// Defaults, then Authorization, then caller headers (which win on conflict).
    fn build_headers(token: Option<&str>, extra: &HeaderMap) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ApiError::InvalidRequest("Stored token is not a valid header value".to_string())
            })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        for (name, value) in extra {
            headers.insert(name.clone(), value.clone());
        }
        Ok(headers)
    }

    /// Perform one authenticated round trip.
    ///
    /// Protected paths fail with `AuthenticationRequired` before anything is
    /// sent when no valid token is stored. There are no retries.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Outcome, ApiError> {
        let RequestOptions {
            method,
            body,
            headers: extra_headers,
            query,
        } = options;

        let token = match self.tokens.lookup()? {
            TokenLookup::Valid(token) => Some(token),
            _ if Self::is_public(path) => None,
            TokenLookup::Missing => {
                debug!(path, "No stored credential, request not sent");
                self.tokens.signal_session_ended();
                return Err(ApiError::AuthenticationRequired);
            }
            // Lookup already cleared storage and signalled the navigator
            TokenLookup::Expired => return Err(ApiError::AuthenticationRequired),
        };

        let headers = Self::build_headers(token.as_deref(), &extra_headers)?;
        let url = self.url(path);

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = body {
            let bytes = serde_json::to_vec(&body)
                .map_err(|e| ApiError::InvalidRequest(format!("Unserializable body: {}", e)))?;
            builder = builder.body(bytes);
        }

        debug!(method = %method, url = %url, "Sending request");
        let response = builder.send().await?;
        self.check_response(path, &method, &url, response).await
    }

    async fn check_response(
        &self,
        path: &str,
        method: &Method,
        url: &str,
        response: Response,
    ) -> Result<Outcome, ApiError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && !Self::is_sessionless(path) {
            warn!(url, "Server rejected the session token");
            self.tokens.invalidate();
            return Err(ApiError::SessionExpired);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(
                url,
                status = %status,
                body = %ApiError::truncate_body(&body),
                "Request failed"
            );
            return Err(ApiError::from_status(status, &body));
        }

        if *method == Method::DELETE {
            return Ok(Outcome::Deleted);
        }

        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })?;
        Ok(Outcome::Json(value))
    }

    /// `request`, decoding the JSON body into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let value = Self::expect_json(path, self.request(path, options).await?)?;
        serde_json::from_value(value).map_err(|e| {
            ApiError::InvalidResponse(format!("Unexpected response shape from {}: {}", path, e))
        })
    }

    /// One call against a resource collection or item.
    pub async fn resource_request(
        &self,
        resource: Resource,
        id: Option<i64>,
        action: Option<&str>,
        method: Method,
        body: Option<Value>,
    ) -> Result<Outcome, ApiError> {
        let mut options = RequestOptions::new(method);
        options.body = body;
        self.request(&resource.item_path(id, action), options).await
    }

    pub(crate) async fn fetch_list<T: DeserializeOwned>(
        &self,
        resource: Resource,
    ) -> Result<Vec<T>, ApiError> {
        let path = resource.path();
        let outcome = self
            .resource_request(resource, None, None, Method::GET, None)
            .await?;
        parse_list(Self::expect_json(path, outcome)?).map_err(|e| {
            ApiError::InvalidResponse(format!("Unexpected list shape from {}: {}", path, e))
        })
    }

    pub(crate) async fn fetch_record<T: DeserializeOwned>(
        &self,
        resource: Resource,
        action: Option<&str>,
    ) -> Result<T, ApiError> {
        let path = resource.item_path(None, action);
        let outcome = self
            .resource_request(resource, None, action, Method::GET, None)
            .await?;
        parse_record(Self::expect_json(&path, outcome)?).map_err(|e| {
            ApiError::InvalidResponse(format!("Unexpected response shape from {}: {}", path, e))
        })
    }

    fn expect_json(path: &str, outcome: Outcome) -> Result<Value, ApiError> {
        outcome.into_json().ok_or_else(|| {
            ApiError::InvalidRequest(format!("DELETE {} has no body to decode", path))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(ApiClient::is_public("/login"));
        assert!(ApiClient::is_public("login"));
        assert!(ApiClient::is_public("/register/"));
        assert!(ApiClient::is_public("/login?next=home"));
        assert!(!ApiClient::is_public("/logout"));
        assert!(!ApiClient::is_public("/tasks"));
        assert!(!ApiClient::is_public("/login/extra"));
    }

    #[test]
    fn test_only_register_is_sessionless() {
        assert!(ApiClient::is_sessionless("/register"));
        assert!(ApiClient::is_sessionless("register/"));
        assert!(!ApiClient::is_sessionless("/login"));
        assert!(!ApiClient::is_sessionless("/tasks"));
    }

    #[test]
    fn test_headers_merge_order() {
        let mut extra = HeaderMap::new();
        extra.insert(header::ACCEPT, HeaderValue::from_static("text/plain"));
        extra.insert("x-client", HeaderValue::from_static("cli"));

        let headers = ApiClient::build_headers(Some("T1"), &extra).unwrap();
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[header::ACCEPT], "text/plain");
        assert_eq!(headers[header::AUTHORIZATION], "Bearer T1");
        assert_eq!(headers["x-client"], "cli");
    }

    #[test]
    fn test_no_authorization_without_token() {
        let headers = ApiClient::build_headers(None, &HeaderMap::new()).unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());
        assert_eq!(headers[header::ACCEPT], "application/json");
    }

    #[test]
    fn test_caller_can_override_authorization() {
        let mut extra = HeaderMap::new();
        extra.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer other"));
        let headers = ApiClient::build_headers(Some("T1"), &extra).unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer other");
    }
}
