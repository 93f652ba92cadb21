//! Sequential response transformers applied after a request resolves.
//!
//! Middlewares run in registration order; each receives the output of the
//! previous one. An error from any step aborts the rest of the chain and is
//! returned to the caller.

use crate::{Response, Result};
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A response transformer.
pub type Middleware = Arc<dyn Fn(Response) -> BoxFuture<'static, Result<Response>> + Send + Sync>;

/// Wraps an async closure as a [`Middleware`].
///
/// # Examples
///
/// ```
/// use restling::{middleware::middleware, Body};
///
/// let unwrap_data = middleware(|response: restling::Response| async move {
///     Ok(response.map_body(|body| match body {
///         Body::Json(mut value) => Body::Json(value["data"].take()),
///         other => other,
///     }))
/// });
/// # let _ = unwrap_data;
/// ```
pub fn middleware<F, Fut>(f: F) -> Middleware
where
    F: Fn(Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    Arc::new(move |response| Box::pin(f(response)))
}

/// An ordered chain of middlewares.
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Middleware>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step to the end of the chain.
    pub fn push(&mut self, step: Middleware) {
        self.steps.push(step);
    }

    /// Replaces every step.
    pub fn replace(&mut self, steps: Vec<Middleware>) {
        self.steps = steps;
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Feeds `response` through every step in order.
    pub async fn run(&self, response: Response) -> Result<Response> {
        let mut current = response;
        for step in &self.steps {
            current = step(current).await?;
        }
        Ok(current)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.steps.len())
            .finish()
    }
}
