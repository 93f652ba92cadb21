//! Request descriptors and bodies.

use crate::{options::ResolvedConfig, query::QueryParams, Error, Result};
use http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, Method};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

/// The body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as-is.
    Text(String),
    /// Sent as-is.
    Bytes(Vec<u8>),
    /// Serialized to JSON before sending.
    Json(Value),
}

impl RequestBody {
    /// Captures any serializable value as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| Error::SerializationFailed(e.to_string()))
    }

    /// The string form of the body, as seen by pre-send hooks.
    pub fn to_text(&self) -> String {
        match self {
            RequestBody::Text(text) => text.clone(),
            RequestBody::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            RequestBody::Json(value) => value.to_string(),
        }
    }

    /// Produces the bytes to send. JSON bodies are serialized and get a
    /// `Content-Type: application/json` header unless one is already set.
    pub(crate) fn encode(self, headers: &mut HeaderMap) -> Result<Vec<u8>> {
        match self {
            RequestBody::Text(text) => Ok(text.into_bytes()),
            RequestBody::Bytes(bytes) => Ok(bytes),
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(&value)
                    .map_err(|e| Error::SerializationFailed(e.to_string()))?;
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                Ok(bytes)
            }
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

/// Describes a request about to be sent.
///
/// This is what [`RequestHooks`](crate::RequestHooks) receive. Changes made
/// by [`will_send_request`](crate::RequestHooks::will_send_request) are
/// applied to the outgoing request.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The final URL, including the query string.
    pub url: Url,

    /// The path component of `url`. Edits made by a hook rewrite `url`.
    pub path: String,

    /// The query parameters of `url`. Edits made by a hook rewrite `url`.
    pub query: QueryParams,

    /// Headers for this request.
    pub headers: HeaderMap,

    /// The request body, before JSON normalization.
    pub body: Option<RequestBody>,

    /// Resolved extension fields of the request configuration.
    pub extensions: Map<String, Value>,
}

impl RequestMetadata {
    /// Creates the descriptor for a request to `url` with a resolved configuration.
    pub fn new(url: Url, config: ResolvedConfig) -> Self {
        let path = url.path().to_string();
        let query = url.query().map(QueryParams::parse).unwrap_or_default();

        Self {
            method: config.method,
            url,
            path,
            query,
            headers: config.headers,
            body: config.body,
            extensions: config.extensions,
        }
    }

    /// Reconciles `url` with `path` and `query` after a hook ran.
    ///
    /// `path` and `query` are the values the hook was given. If the hook
    /// changed either field, `url` is rebuilt from them; otherwise both
    /// fields are re-read from `url`, which the hook may have replaced.
    pub(crate) fn apply_edits(&mut self, path: &str, query: &QueryParams) {
        if self.path != path || self.query != *query {
            self.url.set_path(&self.path);
            let rendered = self.query.to_query_string();
            self.url
                .set_query((!rendered.is_empty()).then_some(rendered.as_str()));
        } else {
            self.path = self.url.path().to_string();
            self.query = self.url.query().map(QueryParams::parse).unwrap_or_default();
        }
    }

    /// The string form of the body, if any.
    pub fn body_text(&self) -> Option<String> {
        self.body.as_ref().map(RequestBody::to_text)
    }

    /// Returns `true` for requests eligible for memoization.
    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }
}
