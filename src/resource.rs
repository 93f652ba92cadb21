//! Conventional CRUD operations on a named resource.
//!
//! | Operation  | Request                  |
//! |------------|--------------------------|
//! | `index`    | `GET {resource}`         |
//! | `store`    | `POST {resource}`        |
//! | `show`     | `GET {resource}/{id}`    |
//! | `update`   | `PUT {resource}/{id}`    |
//! | `destroy`  | `DELETE {resource}/{id}` |

use crate::{metadata::RequestBody, Client, Error, Response, Result};
use std::fmt::Display;

/// A named resource served by a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use restling::{Client, RequestBody};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), restling::Error> {
/// let client = Client::builder()
///     .root_url("https://api.example.com")?
///     .json()
///     .resource("users")
///     .build()?;
///
/// let users = client.crud()?;
/// let all = users.index().await?;
/// let created = users.store(json!({ "name": "Alice" })).await?;
/// users.update(7, json!({ "name": "Bob" })).await?;
/// users.destroy(7).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Resource<'a> {
    client: &'a Client,
    name: String,
}

impl<'a> Resource<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lists the collection.
    pub async fn index(&self) -> Result<Response> {
        self.client.get(&self.name).await
    }

    /// Creates a new member of the collection.
    pub async fn store(&self, payload: impl Into<RequestBody>) -> Result<Response> {
        self.client.post(&self.name, payload).await
    }

    /// Fetches one member.
    pub async fn show(&self, id: impl Display) -> Result<Response> {
        self.client.get(&self.member(id)).await
    }

    /// Replaces one member.
    pub async fn update(&self, id: impl Display, payload: impl Into<RequestBody>) -> Result<Response> {
        self.client.put(&self.member(id), payload).await
    }

    /// Deletes one member.
    pub async fn destroy(&self, id: impl Display) -> Result<Response> {
        self.client.delete(&self.member(id)).await
    }

    fn member(&self, id: impl Display) -> String {
        format!("{}/{}", self.name, id)
    }
}

impl Client {
    /// Returns the CRUD operations for the resource `name`.
    pub fn resource(&self, name: impl Into<String>) -> Resource<'_> {
        Resource {
            client: self,
            name: name.into(),
        }
    }

    /// Returns the CRUD operations for the resource configured with
    /// [`ClientBuilder::resource`](crate::ClientBuilder::resource).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if no resource is configured.
    pub fn crud(&self) -> Result<Resource<'_>> {
        match self.resource_name() {
            Some(name) if !name.is_empty() => Ok(self.resource(name)),
            _ => Err(Error::ConfigurationError(
                "no resource configured for this client".to_string(),
            )),
        }
    }
}
