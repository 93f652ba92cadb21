//! Decoded responses and the classifier that produces them.
//!
//! The [`Classifier`] decides between JSON and text decoding from the status
//! and content headers, and turns non-2xx responses into
//! [`RequestError`](crate::RequestError)s.

use crate::{
    error::{ErrorResponse, RequestError},
    Error, Result,
};
use http::{
    header::{CONTENT_LENGTH, CONTENT_TYPE},
    Extensions, HeaderMap, StatusCode,
};
use hyper::ext::ReasonPhrase;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// The body was declared and parsed as JSON.
    Json(Value),
    /// Any other body, or an empty string when decoding failed.
    Text(String),
}

impl Body {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            Body::Json(_) => None,
        }
    }

    /// Renders the body as text, serializing JSON bodies.
    pub fn to_text(&self) -> String {
        match self {
            Body::Json(value) => value.to_string(),
            Body::Text(text) => text.clone(),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Text(String::new())
    }
}

/// A successful, decoded HTTP response.
///
/// This is the value that flows through the middleware pipeline and is
/// returned to the caller.
///
/// # Examples
///
/// ```no_run
/// use restling::Client;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), restling::Error> {
/// let client = Client::builder()
///     .root_url("https://api.example.com")?
///     .build()?;
///
/// let response = client.get("users/123").await?;
/// let user: User = response.json()?;
///
/// println!("User: {}", user.name);
/// println!("Request took {:?}", response.latency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    /// The decoded body.
    pub body: Body,

    /// The final URL of the response.
    pub url: Url,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from sending the request until the body was decoded.
    pub latency: Duration,
}

impl Response {
    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] with the raw body text when the
    /// body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let parsed = match &self.body {
            Body::Json(value) => T::deserialize(value),
            Body::Text(text) => serde_json::from_str(text),
        };

        parsed.map_err(|e| {
            tracing::error!(
                error = %e,
                status = self.status.as_u16(),
                "Failed to deserialize response"
            );

            Error::DeserializationFailed {
                raw_response: self.body.to_text(),
                serde_error: e.to_string(),
                status: self.status,
            }
        })
    }

    /// The body rendered as text.
    pub fn text(&self) -> String {
        self.body.to_text()
    }

    /// Returns a header value by name, if present and valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// # use restling::{Body, Response};
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("text/plain"));
    ///
    /// let response = Response {
    ///     body: Body::Text("ok".into()),
    ///     url: "https://api.test/ping".parse().unwrap(),
    ///     status: StatusCode::OK,
    ///     headers,
    ///     latency: Duration::ZERO,
    /// };
    ///
    /// assert_eq!(response.header("Content-Type"), Some("text/plain"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Replaces the body using `f`, keeping the rest of the response.
    pub fn map_body<F>(self, f: F) -> Self
    where
        F: FnOnce(Body) -> Body,
    {
        Self {
            body: f(self.body),
            ..self
        }
    }
}

/// Decides how response bodies are decoded and which responses are errors.
///
/// A body is decoded as JSON when the status is not 204, `Content-Length` is
/// not `"0"`, and `Content-Type` starts with `application/json` or matches the
/// optional vendor media type pattern. Everything else is decoded as text.
/// Decoding failures produce an empty text body.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    vendor_json: Option<Regex>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also treats content types matching `pattern` as JSON, e.g.
    /// `^application/vnd\.acme\.v[0-9]{8}\+json$`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn with_vendor_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            Error::ConfigurationError(format!("Invalid vendor media type pattern: {}", e))
        })?;
        Ok(Self {
            vendor_json: Some(regex),
        })
    }

    /// Returns `true` if a response with this status and headers carries JSON.
    pub fn is_json(&self, status: StatusCode, headers: &HeaderMap) -> bool {
        if status == StatusCode::NO_CONTENT {
            return false;
        }
        if headers
            .get(CONTENT_LENGTH)
            .is_some_and(|length| length.as_bytes() == b"0")
        {
            return false;
        }

        let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
            return false;
        };

        content_type.starts_with("application/json")
            || self
                .vendor_json
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(content_type))
    }

    /// Consumes the response body and decodes it.
    pub async fn decode(&self, response: reqwest::Response) -> Body {
        if !self.is_json(response.status(), response.headers()) {
            return match response.text().await {
                Ok(text) => Body::Text(text),
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to read response body");
                    Body::default()
                }
            };
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read response body");
                return Body::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Body::Json(value),
            Err(e) => {
                tracing::debug!(error = %e, "Response declared JSON but did not parse");
                Body::default()
            }
        }
    }

    /// Decodes a successful response, or converts a non-2xx one into
    /// [`Error::Request`].
    ///
    /// The returned response has a zero `latency`; the client fills it in.
    pub async fn classify(&self, response: reqwest::Response) -> Result<Response> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let status_text = reason_phrase(status, response.extensions());

        tracing::info!(status = status.as_u16(), url = %url, "Received HTTP response");

        let body = self.decode(response).await;

        if !status.is_success() {
            if status.is_client_error() {
                tracing::error!(status = status.as_u16(), body = %body.to_text(), "Client error (4xx)");
            } else if status.is_server_error() {
                tracing::warn!(status = status.as_u16(), body = %body.to_text(), "Server error (5xx)");
            }

            return Err(RequestError::new(ErrorResponse {
                url: url.to_string(),
                status,
                status_text,
                body,
            })
            .into());
        }

        Ok(Response {
            body,
            url,
            status,
            headers,
            latency: Duration::ZERO,
        })
    }
}

/// The reason phrase the server sent, or the canonical one for `status`.
fn reason_phrase(status: StatusCode, extensions: &Extensions) -> String {
    match extensions.get::<ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => status.canonical_reason().unwrap_or_default().to_string(),
    }
}
