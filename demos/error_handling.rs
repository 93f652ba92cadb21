//! Example demonstrating error handling.
//!
//! This example shows how to:
//! - Inspect the response snapshot carried by a `RequestError`
//! - Deal with deserialization failures
//! - Recover from transport failures with a hook
//!
//! Run with: `cargo run --example error_handling`

use http::{HeaderMap, StatusCode};
use restling::{Body, Client, Error, RequestHooks, RequestMetadata, Response};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    id: u32,
    title: String,
}

struct Fallback;

#[async_trait::async_trait]
impl RequestHooks for Fallback {
    async fn did_encounter_error(
        &self,
        error: Error,
        request: &RequestMetadata,
    ) -> restling::Result<Response> {
        eprintln!("  transport failed ({}), serving a placeholder", error);
        Ok(Response {
            body: Body::Text("placeholder".to_string()),
            url: request.url.clone(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            latency: Duration::ZERO,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("restling=info")
        .init();

    let client = Client::builder()
        .root_url("https://jsonplaceholder.typicode.com")?
        .build()?;

    println!("=== Example 1: Handling HTTP Errors ===");
    match client.get("/posts/999999").await {
        Ok(response) => println!("Success: {:?}", response.body),
        Err(Error::Request(err)) => {
            println!("HTTP Error: {}", err.message);
            println!("  URL: {}", err.response.url);
            println!("  Status code: {}", err.response.status.as_u16());
            println!("  Is client error (4xx): {}", err.response.status.is_client_error());
            println!("  Body: {:?}", err.response.body);
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 2: Handling Deserialization Errors ===");
    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct WrongSchema {
        nonexistent_field: String,
    }

    let response = client.get("/posts/1").await?;
    match response.json::<WrongSchema>() {
        Ok(_) => println!("Unexpected success"),
        Err(Error::DeserializationFailed {
            raw_response,
            serde_error,
            status,
        }) => {
            println!("Deserialization Failed!");
            println!("  Status: {}", status);
            println!("  Serde error: {}", serde_error);
            println!(
                "  Raw response (first 200 chars): {}",
                raw_response.chars().take(200).collect::<String>()
            );
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 3: Recovering From Transport Errors ===");
    let offline = Client::builder()
        .root_url("http://127.0.0.1:1")?
        .hooks(Fallback)
        .build()?;

    let response = offline.get("anything").await?;
    println!("  Result: {}", response.text());

    Ok(())
}
