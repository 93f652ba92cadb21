//! Error types for requests issued through a [`Client`](crate::Client).
//!
//! Every failure surfaces to the immediate caller. A non-2xx status becomes a
//! [`RequestError`] carrying a snapshot of the response, so callers can build
//! a meaningful message without re-reading the body.

use crate::response::Body;
use http::StatusCode;
use std::sync::Arc;

/// The main error type for HTTP API calls.
///
/// `Error` is `Clone` so that a single failed transport call can be handed to
/// every caller that was coalesced onto it.
///
/// # Examples
///
/// ```no_run
/// use restling::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .root_url("https://api.example.com")?
///     .build()?;
///
/// match client.get("users/42").await {
///     Ok(response) => println!("Success: {:?}", response.body),
///     Err(Error::Request(err)) => {
///         eprintln!("{} ({})", err.message, err.response.url);
///         eprintln!("body: {:?}", err.response.body);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    ///
    /// Only raised when the client's
    /// [`did_encounter_error`](crate::RequestHooks::did_encounter_error) hook
    /// re-raises it, which is the default.
    #[error("Network error: {0}")]
    Network(#[source] Arc<reqwest::Error>),

    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Request(Box<RequestError>),

    /// Failed to deserialize a response body into the expected type.
    ///
    /// # Fields
    ///
    /// * `raw_response` - The response body as text
    /// * `serde_error` - The error message from serde
    /// * `status` - The HTTP status code of the response
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Invalid configuration was provided.
    ///
    /// Raised synchronously at call time, e.g. for an invalid header, a
    /// relative path without a root url, or a client without a resource.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A middleware aborted the pipeline.
    #[error("Middleware error: {0}")]
    Middleware(String),
}

impl Error {
    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Request(err) => Some(err.response.status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::Network(err) => err.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Request(err) => err.response.body.as_text(),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the structured [`RequestError`] for non-2xx responses.
    pub fn request_error(&self) -> Option<&RequestError> {
        match self {
            Error::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(Arc::new(err))
    }
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        Error::Request(Box::new(err))
    }
}

/// A non-2xx response, converted into an error.
///
/// The message has the form `"<status>: <statusText>"`, e.g. `"404: Not Found"`.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{message}")]
pub struct RequestError {
    /// Human readable summary of the failure.
    pub message: String,
    /// Snapshot of the response that caused the failure.
    pub response: ErrorResponse,
}

impl RequestError {
    /// Builds the error from a response snapshot, deriving the message.
    pub fn new(response: ErrorResponse) -> Self {
        let message = format!("{}: {}", response.status.as_u16(), response.status_text);
        Self { message, response }
    }
}

/// The structured part of a [`RequestError`].
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    /// The final URL of the response.
    pub url: String,
    /// The HTTP status code.
    pub status: StatusCode,
    /// The reason phrase for `status`.
    pub status_text: String,
    /// The decoded diagnostic payload (JSON or text, empty text on decode failure).
    pub body: Body,
}

/// A specialized `Result` type for HTTP API calls.
pub type Result<T> = std::result::Result<T, Error>;
