//! Basic example demonstrating CRUD calls, middlewares and GET memoization.
//!
//! This example shows how to:
//! - Create a JSON client for a resource
//! - Fetch and create posts through the CRUD helpers
//! - Transform responses with a middleware
//! - Observe memoized GETs and their invalidation
//!
//! Run with: `cargo run --example basic_call`

use restling::{Body, Client, Error};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

#[derive(Debug, Serialize)]
struct NewPost {
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: u32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("restling=debug,basic_call=info")
        .init();

    let client = Client::builder()
        .root_url("https://jsonplaceholder.typicode.com")?
        .json()
        .resource("posts")
        .build()?
        .with_middleware(|response| async move {
            // trim titles to keep the output readable
            Ok(response.map_body(|body| match body {
                Body::Json(mut value) => {
                    if let Some(title) = value.get("title").and_then(|t| t.as_str()) {
                        let short: String = title.chars().take(40).collect();
                        value["title"] = json!(short);
                    }
                    Body::Json(value)
                }
                other => other,
            }))
        });

    let posts = client.crud()?;

    println!("=== GET Request Example ===");
    let response = posts.show(1).await?;
    let post: Post = response.json()?;

    println!("Post ID: {}", post.id);
    println!("Title: {}", post.title);
    println!("Request latency: {:?}", response.latency);
    println!("Status code: {}", response.status);
    println!();

    println!("=== Memoized GET ===");
    let again = posts.show(1).await?;
    println!("Second call latency: {:?} (served from cache)", again.latency);
    println!("Cached entries: {}", client.cache().len());
    println!();

    println!("=== POST Request Example ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };

    let response = posts.store(restling::RequestBody::json(&new_post)?).await?;
    let created: Post = response.json()?;

    println!("Created post ID: {}", created.id);
    println!("Title: {}", created.title);
    println!("Content-Type: {:?}", response.header("content-type"));

    Ok(())
}
