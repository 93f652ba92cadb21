//! HTTP client with layered options, middlewares and GET memoization.
//!
//! The [`Client`] type is the main entry point for making HTTP requests.
//! Use [`ClientBuilder`] to configure and create clients.

use crate::{
    cache::{Lookup, ResponseCache},
    endpoint::{build_endpoint, normalize_root},
    hooks::{DefaultHooks, RequestHooks},
    metadata::{RequestBody, RequestMetadata},
    middleware::{middleware, Middleware, Pipeline},
    options::{parse_header_name, ConfigValue, RequestConfig},
    query::{QueryParams, QueryValue},
    response::Classifier,
    Error, Response, Result,
};
use futures::future::{BoxFuture, FutureExt};
use http::Method;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// An HTTP client for a resource-oriented API.
///
/// A client holds a configuration template (options, query parameters and
/// middlewares) that every call starts from. The chainable configuration
/// methods consume and return the client. Clones share the transport, the
/// hooks and the GET memoization cache.
///
/// # Examples
///
/// ```no_run
/// use restling::{Client, RequestBody};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct CreateUser {
///     name: String,
/// }
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), restling::Error> {
/// let client = Client::builder()
///     .root_url("https://api.example.com/v1")?
///     .json()
///     .build()?
///     .with_bearer_token("secret")
///     .with_query_parameter("include", "profile");
///
/// // GET https://api.example.com/v1/users/123?include=profile
/// let user: User = client.get("/users/123").await?.json()?;
/// println!("User: {}", user.name);
///
/// let body = RequestBody::json(&CreateUser { name: "Alice".to_string() })?;
/// let created: User = client.post("/users", body).await?.json()?;
/// println!("Created user with ID: {}", created.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    root_url: Option<Url>,
    resource: Option<String>,
    options: RequestConfig,
    query: QueryParams,
    pipeline: Pipeline,
}

struct ClientInner {
    http_client: reqwest::Client,
    hooks: Box<dyn RequestHooks>,
    classifier: Classifier,
    cache: ResponseCache,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    ///
    /// # Examples
    ///
    /// ```
    /// use restling::Client;
    ///
    /// # fn example() -> Result<(), restling::Error> {
    /// let client = Client::builder()
    ///     .root_url("https://api.example.com")?
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn root_url(&self) -> Option<&Url> {
        self.root_url.as_ref()
    }

    /// The name of the resource this client manages, if any.
    pub fn resource_name(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// The configuration template every call is merged onto.
    pub fn options(&self) -> &RequestConfig {
        &self.options
    }

    pub fn query_parameters(&self) -> &QueryParams {
        &self.query
    }

    pub fn middlewares(&self) -> &Pipeline {
        &self.pipeline
    }

    /// The GET memoization cache shared by this client and its clones.
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// Builds the final URL for `path` from the root url and query parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is relative and no root url is configured,
    /// or if the URL cannot be resolved.
    pub fn build_endpoint(&self, path: &str) -> Result<Url> {
        build_endpoint(self.root_url.as_ref(), path, &self.query)
    }

    // Options

    /// Replaces the configuration template.
    pub fn set_options(mut self, options: RequestConfig) -> Self {
        self.options = options;
        self
    }

    /// Merges `options` onto the configuration template.
    pub fn with_options(mut self, options: RequestConfig) -> Self {
        self.options.merge(options);
        self
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Self {
        self.with_options(RequestConfig::new().bearer_token(token))
    }

    /// Sends `Authorization: Bearer <token>`, computing the token from the
    /// request configuration on every call.
    pub fn with_bearer_token_fn<F>(self, token: F) -> Self
    where
        F: Fn(&RequestConfig) -> String + Send + Sync + 'static,
    {
        self.with_options(RequestConfig::new().bearer_token_fn(token))
    }

    // Query parameters

    pub fn set_query_parameters(mut self, parameters: QueryParams) -> Self {
        self.query = parameters;
        self
    }

    pub fn with_query_parameter(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// Merges `parameters` into the current ones; incoming values win.
    pub fn with_query_parameters(mut self, parameters: QueryParams) -> Self {
        self.query.merge(&parameters);
        self
    }

    // Middlewares

    pub fn set_middlewares(mut self, middlewares: Vec<Middleware>) -> Self {
        self.pipeline.replace(middlewares);
        self
    }

    /// Appends a middleware to the pipeline.
    pub fn with_middleware<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        self.pipeline.push(middleware(f));
        self
    }

    pub fn without_middlewares(mut self) -> Self {
        self.pipeline.clear();
        self
    }

    /// Forgets every memoized GET result.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    // Requests

    /// Makes a request to `path` with `overrides` merged onto the client's
    /// configuration template.
    ///
    /// GET results are memoized by [`RequestHooks::cache_key_for`]: concurrent
    /// GETs with the same key share one transport call, and any other method
    /// drops the entry for its key before it runs. The result passes through
    /// the middleware pipeline on every call.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use restling::{options::RequestConfig, Client};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), restling::Error> {
    /// let client = Client::builder()
    ///     .root_url("https://api.example.com")?
    ///     .build()?;
    ///
    /// let overrides = RequestConfig::new()
    ///     .method(Method::POST)
    ///     .header("Idempotency-Key", "abc-123")?
    ///     .body(serde_json::json!({ "query": "rust" }));
    ///
    /// let response = client.fetch("search", overrides).await?;
    /// println!("{}", response.text());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch(&self, path: &str, overrides: RequestConfig) -> Result<Response> {
        let url = self.build_endpoint(path)?;
        let config = self.options.clone().merged(overrides);
        let mut request = RequestMetadata::new(url, config.resolve()?);

        let (path, query) = (request.path.clone(), request.query.clone());
        self.inner.hooks.will_send_request(&mut request).await?;
        request.apply_edits(&path, &query);

        let key = self.inner.hooks.cache_key_for(&request);

        let response = if request.is_get() {
            let inner = self.inner.clone();
            let lookup = self
                .inner
                .cache
                .get_or_start(&key, move || ClientInner::dispatch(inner, request));

            if let Lookup::Hit(_) = lookup {
                tracing::debug!(cache_key = %key, "Reusing memoized GET");
            }

            let shared = lookup.into_shared();
            let result = shared.clone().await;
            if result.is_err() {
                self.inner.cache.evict(&key, &shared);
            }
            result?
        } else {
            if self.inner.cache.invalidate(&key) {
                tracing::debug!(
                    cache_key = %key,
                    method = %request.method,
                    "Invalidated memoized GET"
                );
            }
            ClientInner::dispatch(self.inner.clone(), request).await?
        };

        self.pipeline.run(response).await
    }

    /// Makes a GET request to `path`.
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.fetch(path, RequestConfig::new().method(Method::GET)).await
    }

    /// Makes a POST request to `path` with `body`.
    pub async fn post(&self, path: &str, body: impl Into<RequestBody>) -> Result<Response> {
        self.fetch(path, RequestConfig::new().method(Method::POST).body(body))
            .await
    }

    /// Makes a PUT request to `path` with `body`.
    pub async fn put(&self, path: &str, body: impl Into<RequestBody>) -> Result<Response> {
        self.fetch(path, RequestConfig::new().method(Method::PUT).body(body))
            .await
    }

    /// Makes a PATCH request to `path` with `body`.
    pub async fn patch(&self, path: &str, body: impl Into<RequestBody>) -> Result<Response> {
        self.fetch(path, RequestConfig::new().method(Method::PATCH).body(body))
            .await
    }

    /// Makes a DELETE request to `path`.
    pub async fn delete(&self, path: &str) -> Result<Response> {
        self.fetch(path, RequestConfig::new().method(Method::DELETE)).await
    }
}

impl ClientInner {
    /// Boxes a single transport round trip so it can be memoized.
    fn dispatch(inner: Arc<ClientInner>, request: RequestMetadata) -> BoxFuture<'static, Result<Response>> {
        async move { inner.send(request).await }.boxed()
    }

    async fn send(&self, mut request: RequestMetadata) -> Result<Response> {
        let body = request
            .body
            .clone()
            .map(|body| body.encode(&mut request.headers))
            .transpose()?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            "Executing HTTP request"
        );

        let start_time = Instant::now();

        let mut builder = self
            .http_client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = body {
            builder = builder.body(body);
        }

        let mut response = match builder.send().await {
            Ok(raw) => {
                self.hooks
                    .did_receive_response(raw, &request, &self.classifier)
                    .await?
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    method = %request.method,
                    url = %request.url,
                    "Request failed"
                );
                self.hooks.did_encounter_error(e.into(), &request).await?
            }
        };

        response.latency = start_time.elapsed();
        Ok(response)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("root_url", &self.root_url)
            .field("resource", &self.resource)
            .field("options", &self.options)
            .field("query", &self.query)
            .field("pipeline", &self.pipeline)
            .field("cache", &self.inner.cache)
            .finish()
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Option layers are merged in the order they are added, on top of a base
/// layer that sets the method to `GET`.
///
/// # Examples
///
/// ```
/// use restling::ClientBuilder;
///
/// # fn example() -> Result<(), restling::Error> {
/// let client = ClientBuilder::new()
///     .root_url("https://api.example.com")?
///     .json()
///     .resource("users")
///     .default_header("User-Agent", "my-app/1.0")?
///     .vendor_json_media_type(r"^application/vnd\.example\.v[0-9]{8}\+json$")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    root_url: Option<Url>,
    resource: Option<String>,
    layers: Vec<RequestConfig>,
    query: QueryParams,
    pipeline: Pipeline,
    classifier: Classifier,
    hooks: Option<Box<dyn RequestHooks>>,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            root_url: None,
            resource: None,
            layers: vec![RequestConfig::new().method(Method::GET)],
            query: QueryParams::new(),
            pipeline: Pipeline::new(),
            classifier: Classifier::new(),
            hooks: None,
            http_client: None,
        }
    }

    /// Sets the root URL that request paths are resolved against.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn root_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.root_url = Some(normalize_root(Url::parse(url.as_ref())?));
        Ok(self)
    }

    /// Names the resource used by [`Client::crud`].
    pub fn resource(mut self, name: impl Into<String>) -> Self {
        self.resource = Some(name.into());
        self
    }

    /// Adds the JSON layer: JSON `Accept` and `Content-Type` headers.
    pub fn json(self) -> Self {
        self.options(RequestConfig::json_defaults())
    }

    /// Adds a configuration layer on top of the previous ones.
    pub fn options(mut self, layer: RequestConfig) -> Self {
        self.layers.push(layer);
        self
    }

    /// Adds a header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name is invalid.
    pub fn default_header(self, name: impl AsRef<str>, value: impl Into<ConfigValue>) -> Result<Self> {
        let mut layer = RequestConfig::new();
        layer.headers.insert(parse_header_name(name.as_ref())?, value.into());
        Ok(self.options(layer))
    }

    pub fn query_parameter(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// Appends a middleware to the initial pipeline.
    pub fn middleware(mut self, step: Middleware) -> Self {
        self.pipeline.push(step);
        self
    }

    /// Treats content types matching `pattern` as JSON, in addition to
    /// `application/json`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn vendor_json_media_type(mut self, pattern: &str) -> Result<Self> {
        self.classifier = Classifier::with_vendor_pattern(pattern)?;
        Ok(self)
    }

    /// Installs custom [`RequestHooks`].
    pub fn hooks(mut self, hooks: impl RequestHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Uses a preconfigured `reqwest::Client` as the transport.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?,
        };

        let hooks = self.hooks.unwrap_or_else(|| Box::new(DefaultHooks));

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                hooks,
                classifier: self.classifier,
                cache: ResponseCache::new(),
            }),
            root_url: self.root_url,
            resource: self.resource,
            options: RequestConfig::layered(self.layers),
            query: self.query,
            pipeline: self.pipeline,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
