//! Request configuration: layered merging and resolution of lazy values.
//!
//! A [`RequestConfig`] is a template. Layers are merged base-to-specific with
//! [`RequestConfig::merge`]; later layers win on scalar conflicts, while
//! headers and nested extension maps merge key-wise. Before a request is sent
//! the template is turned into a [`ResolvedConfig`] by [`RequestConfig::resolve`],
//! which evaluates every [`ConfigValue::Resolver`] against the whole
//! unresolved configuration.

use crate::{metadata::RequestBody, Error, Result};
use http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderMap, HeaderName, HeaderValue, Method,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A function computing a configuration value from the whole unresolved configuration.
pub type Resolver = Arc<dyn Fn(&RequestConfig) -> Value + Send + Sync>;

/// A configuration value: a literal, a nested map, or a resolver.
#[derive(Clone)]
pub enum ConfigValue {
    /// A literal JSON value.
    Value(Value),
    /// A nested mapping, merged key-wise and resolved recursively.
    Map(IndexMap<String, ConfigValue>),
    /// Evaluated during [`RequestConfig::resolve`].
    Resolver(Resolver),
}

impl ConfigValue {
    /// Wraps a closure as a [`ConfigValue::Resolver`].
    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&RequestConfig) -> Value + Send + Sync + 'static,
    {
        ConfigValue::Resolver(Arc::new(f))
    }

    fn resolve(&self, config: &RequestConfig) -> Value {
        match self {
            ConfigValue::Value(value) => value.clone(),
            ConfigValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.resolve(config)))
                    .collect(),
            ),
            ConfigValue::Resolver(resolver) => resolver(config),
        }
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            ConfigValue::Map(map) => f.debug_tuple("Map").field(map).finish(),
            ConfigValue::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        ConfigValue::Value(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Value(Value::String(value.to_string()))
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Value(Value::String(value))
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Value(Value::Bool(value))
    }
}

impl From<IndexMap<String, ConfigValue>> for ConfigValue {
    fn from(map: IndexMap<String, ConfigValue>) -> Self {
        ConfigValue::Map(map)
    }
}

/// One layer of request configuration.
///
/// # Examples
///
/// ```
/// use restling::options::RequestConfig;
/// use http::Method;
///
/// # fn example() -> Result<(), restling::Error> {
/// let base = RequestConfig::new()
///     .header("Accept", "application/json")?
///     .header("X-Team", "core")?;
/// let call = RequestConfig::new()
///     .method(Method::POST)
///     .header("X-Team", "edge")?;
///
/// let resolved = RequestConfig::layered([base, call]).resolve()?;
/// assert_eq!(resolved.method, Method::POST);
/// assert_eq!(resolved.headers["accept"], "application/json");
/// assert_eq!(resolved.headers["x-team"], "edge");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// The HTTP method; `GET` when no layer sets one.
    pub method: Option<Method>,
    /// Header values keyed by case-insensitive name.
    pub headers: IndexMap<HeaderName, ConfigValue>,
    /// The request body.
    pub body: Option<RequestBody>,
    /// Arbitrary extension fields, merged deeply.
    pub extensions: IndexMap<String, ConfigValue>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `layers` in order, each one on top of the previous ones.
    pub fn layered(layers: impl IntoIterator<Item = RequestConfig>) -> Self {
        layers
            .into_iter()
            .fold(RequestConfig::new(), RequestConfig::merged)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets a header value.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<ConfigValue>) -> Result<Self> {
        self.headers.insert(parse_header_name(name.as_ref())?, value.into());
        Ok(self)
    }

    /// Sets a header whose value is computed from the whole configuration at
    /// resolution time.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name is invalid.
    pub fn header_fn<F>(self, name: impl AsRef<str>, f: F) -> Result<Self>
    where
        F: Fn(&RequestConfig) -> String + Send + Sync + 'static,
    {
        self.header(name, ConfigValue::resolver(move |config| Value::String(f(config))))
    }

    /// The layer applied by JSON clients: JSON `Accept` and `Content-Type`
    /// headers, and the extension field `type = "json"`.
    pub fn json_defaults() -> Self {
        let mut layer = Self::new().extension("type", "json");
        layer.headers.insert(ACCEPT, ConfigValue::from("application/json"));
        layer.headers.insert(CONTENT_TYPE, ConfigValue::from("application/json"));
        layer
    }

    /// Sets `Authorization: Bearer <token>`.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.headers.insert(
            AUTHORIZATION,
            ConfigValue::from(format!("Bearer {}", token.as_ref())),
        );
        self
    }

    /// Sets `Authorization: Bearer <token>`, with the token computed from the
    /// whole configuration at resolution time.
    pub fn bearer_token_fn<F>(mut self, token: F) -> Self
    where
        F: Fn(&RequestConfig) -> String + Send + Sync + 'static,
    {
        self.headers.insert(
            AUTHORIZATION,
            ConfigValue::resolver(move |config| Value::String(format!("Bearer {}", token(config)))),
        );
        self
    }

    /// Copies every entry of a native header collection into this layer.
    pub fn headers_from(mut self, headers: &HeaderMap) -> Self {
        for (name, value) in headers {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            self.headers.insert(name.clone(), ConfigValue::from(value));
        }
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn extension(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Merges `other` on top of `self`.
    ///
    /// `method` and `body` are replaced when `other` sets them. Headers merge
    /// per name. Extensions merge deeply: nested maps merge key-wise, any
    /// other conflicting value is replaced.
    pub fn merge(&mut self, other: RequestConfig) {
        if let Some(method) = other.method {
            self.method = Some(method);
        }
        for (name, value) in other.headers {
            self.headers.insert(name, value);
        }
        if let Some(body) = other.body {
            self.body = Some(body);
        }
        for (key, value) in other.extensions {
            merge_entry(&mut self.extensions, key, value);
        }
    }

    /// Owned variant of [`merge`](Self::merge).
    pub fn merged(mut self, other: RequestConfig) -> Self {
        self.merge(other);
        self
    }

    /// Evaluates all resolvers, depth first, and produces the values a request
    /// is built from.
    ///
    /// Resolvers receive `self`, the whole unresolved configuration. A header
    /// resolving to `null` is omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if a header resolves to a map, an array, or a string
    /// that is not a valid header value.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());

        for (name, value) in &self.headers {
            let rendered = match value.resolve(self) {
                Value::Null => continue,
                Value::String(text) => text,
                scalar @ (Value::Bool(_) | Value::Number(_)) => scalar.to_string(),
                other => {
                    return Err(Error::ConfigurationError(format!(
                        "header `{name}` resolved to a non-scalar value: {other}"
                    )))
                }
            };
            let value = HeaderValue::try_from(rendered).map_err(|e| {
                Error::ConfigurationError(format!("Invalid header value for `{name}`: {e}"))
            })?;
            headers.insert(name.clone(), value);
        }

        let extensions = self
            .extensions
            .iter()
            .map(|(key, value)| (key.clone(), value.resolve(self)))
            .collect();

        Ok(ResolvedConfig {
            method: self.method.clone().unwrap_or(Method::GET),
            headers,
            body: self.body.clone(),
            extensions,
        })
    }
}

/// A configuration with every resolver evaluated.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub extensions: Map<String, Value>,
}

pub(crate) fn parse_header_name(name: &str) -> Result<HeaderName> {
    HeaderName::try_from(name)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))
}

fn merge_entry(target: &mut IndexMap<String, ConfigValue>, key: String, value: ConfigValue) {
    match target.get_mut(&key) {
        Some(existing) => merge_value(existing, value),
        None => {
            target.insert(key, value);
        }
    }
}

fn merge_value(target: &mut ConfigValue, source: ConfigValue) {
    match (target, source) {
        (ConfigValue::Map(target), ConfigValue::Map(source)) => {
            for (key, value) in source {
                merge_entry(target, key, value);
            }
        }
        (ConfigValue::Value(Value::Object(target)), ConfigValue::Value(Value::Object(source))) => {
            merge_json(target, source);
        }
        (target, source) => *target = source,
    }
}

fn merge_json(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        if let Value::Object(incoming) = value {
            if let Some(Value::Object(existing)) = target.get_mut(&key) {
                merge_json(existing, incoming);
                continue;
            }
            target.insert(key, Value::Object(incoming));
        } else {
            target.insert(key, value);
        }
    }
}
