//! Request descriptors and call outcomes.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::ApiError;

/// Everything needed for one HTTP call besides the path.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Unserializable body: {}", e)))?;
        Ok(self.body(value))
    }

    /// Add a header; caller headers win over the defaults and Authorization.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, ApiError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::InvalidRequest(format!("Bad header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidRequest(format!("Bad header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// What a successful call resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Decoded JSON body
    Json(Value),
    /// A 2xx answer to DELETE; the body is never read
    Deleted,
}

impl Outcome {
    /// `true` for the delete success marker
    pub fn is_deleted(&self) -> bool {
        matches!(self, Outcome::Deleted)
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Outcome::Json(value) => Some(value),
            Outcome::Deleted => None,
        }
    }
}

/// Resource collections under the API root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Tasks,
    /// Task categories (read-only)
    Categories,
    Expenses,
    ExpenseCategories,
    Notes,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Tasks => "/tasks",
            Resource::Categories => "/categories",
            Resource::Expenses => "/expenses",
            Resource::ExpenseCategories => "/expense-categories",
            Resource::Notes => "/notes",
        }
    }

    /// `/<resource>[/<id>][/<action>]`
    pub fn item_path(&self, id: Option<i64>, action: Option<&str>) -> String {
        let mut path = self.path().to_string();
        if let Some(id) = id {
            path.push('/');
            path.push_str(&id.to_string());
        }
        if let Some(action) = action {
            path.push('/');
            path.push_str(action.trim_matches('/'));
        }
        path
    }
}
