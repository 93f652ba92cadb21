//! # Restling - resource-oriented HTTP API clients
//!
//! Restling is a thin layer over `reqwest` for writing CRUD-style API clients.
//! A [`Client`] carries a configuration template (headers, method, body and
//! extension fields), a query parameter set and a middleware pipeline; every
//! call merges its own options onto a fresh copy of that template.
//!
//! ## Quick Start
//!
//! ```no_run
//! use restling::{Body, Client};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), restling::Error> {
//!     let client = Client::builder()
//!         .root_url("https://api.example.com/v1")?
//!         .json()
//!         .resource("users")
//!         .build()?
//!         .with_bearer_token("secret")
//!         .with_middleware(|response| async move {
//!             // unwrap `{ "data": ... }` envelopes
//!             Ok(response.map_body(|body| match body {
//!                 Body::Json(mut value) if value.get("data").is_some() => {
//!                     Body::Json(value["data"].take())
//!                 }
//!                 other => other,
//!             }))
//!         });
//!
//!     let users = client.crud()?;
//!     let user: User = users.show(123).await?.json()?;
//!     println!("User: {}", user.name);
//!
//!     let created: User = users.store(json!({ "name": "Alice" })).await?.json()?;
//!     println!("Created user with ID: {}", created.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Endpoint building** - Root url, resource path and query parameters,
//!   with `name[]=value` arrays and inline query strings merged in
//! - **Layered options** - Deterministic base-to-specific merging, headers
//!   merged per name, lazily resolved values such as bearer tokens
//! - **GET memoization** - Concurrent GETs to the same key share one
//!   transport call; any other method invalidates the key
//! - **Middlewares** - Async response transformers applied in order
//! - **Response classification** - JSON or text decoding from the content
//!   headers, non-2xx statuses converted to [`RequestError`]
//! - **Hooks** - [`RequestHooks`] for pre-send changes, cache keys, response
//!   handling and transport error recovery
//!
//! ## Error Handling
//!
//! ```no_run
//! use restling::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().root_url("https://api.example.com")?.build()?;
//! match client.get("users/404").await {
//!     Ok(response) => println!("Success: {:?}", response.body),
//!     Err(Error::Request(err)) => {
//!         // e.g. "404: Not Found"
//!         eprintln!("{}", err.message);
//!         eprintln!("  url: {}", err.response.url);
//!         eprintln!("  body: {:?}", err.response.body);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
mod client;
pub mod endpoint;
mod error;
mod hooks;
pub mod metadata;
pub mod middleware;
pub mod options;
pub mod query;
mod resource;
mod response;

pub use client::{Client, ClientBuilder};
pub use error::{Error, ErrorResponse, RequestError, Result};
pub use hooks::{DefaultHooks, RequestHooks};
pub use metadata::{RequestBody, RequestMetadata};
pub use middleware::Middleware;
pub use options::{ConfigValue, RequestConfig};
pub use query::{QueryParams, QueryValue};
pub use resource::Resource;
pub use response::{Body, Classifier, Response};
