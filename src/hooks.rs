//! Extension points invoked by the client around every request.

use crate::{metadata::RequestMetadata, response::Classifier, Error, Response, Result};

/// Customizes how a [`Client`](crate::Client) sends requests and handles results.
///
/// Every method has a default, so implementors override only what they need.
///
/// # Examples
///
/// ```
/// use restling::{metadata::RequestMetadata, RequestHooks, Result};
/// use http::HeaderValue;
///
/// struct Tenant(&'static str);
///
/// #[async_trait::async_trait]
/// impl RequestHooks for Tenant {
///     async fn will_send_request(&self, request: &mut RequestMetadata) -> Result<()> {
///         request
///             .headers
///             .insert("x-tenant", HeaderValue::from_static(self.0));
///         Ok(())
///     }
///
///     fn cache_key_for(&self, request: &RequestMetadata) -> String {
///         format!("{}:{}", self.0, request.url)
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait RequestHooks: Send + Sync {
    /// Called with the resolved request before its body is encoded and it is
    /// sent. Changes to `request` apply to the outgoing request, and edits to
    /// `path` or `query` rebuild `url` before the cache key is computed. An
    /// error aborts the call.
    async fn will_send_request(&self, _request: &mut RequestMetadata) -> Result<()> {
        Ok(())
    }

    /// The key under which GET results are memoized and which non-GET
    /// requests invalidate. Defaults to the final URL.
    fn cache_key_for(&self, request: &RequestMetadata) -> String {
        request.url.to_string()
    }

    /// Turns a transport response into the call's result. Defaults to
    /// [`Classifier::classify`].
    async fn did_receive_response(
        &self,
        response: reqwest::Response,
        _request: &RequestMetadata,
        classifier: &Classifier,
    ) -> Result<Response> {
        classifier.classify(response).await
    }

    /// Handles transport failures (connection refused, DNS, ...). Defaults to
    /// returning the error unchanged; returning `Ok` recovers the call.
    async fn did_encounter_error(
        &self,
        error: Error,
        _request: &RequestMetadata,
    ) -> Result<Response> {
        Err(error)
    }
}

/// Hooks with every default behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl RequestHooks for DefaultHooks {}
