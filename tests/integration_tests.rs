//! Integration tests using wiremock to simulate HTTP servers.

use http::{HeaderMap, StatusCode};
use restling::metadata::RequestMetadata;
use restling::options::RequestConfig;
use restling::{Body, Client, ConfigValue, Error, RequestBody, RequestHooks, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestData {
    id: u32,
    name: String,
}

fn test_data() -> TestData {
    TestData {
        id: 1,
        name: "Test".to_string(),
    }
}

fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .root_url(server.uri())
        .unwrap()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_successful_get_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server).get("/test").await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json::<TestData>().unwrap(), test_data());
    assert!(matches!(response.body, Body::Json(_)));
}

#[tokio::test]
async fn test_inline_query_merges_with_instance_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("active", "true"))
        .and(query_param("sort", "name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).with_query_parameter("sort", "name");
    let response = client.get("/users?active=true").await.unwrap();

    assert_eq!(response.body, Body::Json(json!([])));
}

#[tokio::test]
async fn test_array_query_parameters_use_brackets() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    client_for(&mock_server)
        .with_query_parameter("ids", vec![3, 4])
        .get("users")
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let pairs: Vec<(String, String)> = requests[0].url.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("ids[]".to_string(), "3".to_string()),
            ("ids[]".to_string(), "4".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_not_found_becomes_request_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "not found" })))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).get("users/9").await;

    match result {
        Err(Error::Request(err)) => {
            assert_eq!(err.message, "404: Not Found");
            assert_eq!(err.response.status, StatusCode::NOT_FOUND);
            assert_eq!(err.response.status_text, "Not Found");
            assert_eq!(err.response.url, format!("{}/users/9", mock_server.uri()));
            assert_eq!(err.response.body.as_json().unwrap()["error"], "not found");
        }
        other => panic!("Expected RequestError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_error_body_keeps_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_raw("{oops", "application/json"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).get("broken").await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.to_string(), "500: Internal Server Error");
    assert_eq!(err.request_error().unwrap().response.body, Body::Text(String::new()));
}

#[tokio::test]
async fn test_bearer_token_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    client_for(&mock_server)
        .with_bearer_token("abc")
        .get("me")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_lazy_bearer_token_reads_configuration() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer per-call"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).with_bearer_token_fn(|config| {
        match config.extensions.get("token") {
            Some(ConfigValue::Value(serde_json::Value::String(token))) => token.clone(),
            _ => "missing".to_string(),
        }
    });

    client
        .fetch("me", RequestConfig::new().extension("token", "per-call"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_structured_body_is_sent_as_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/test"))
        .and(header("content-type", "application/json"))
        .and(body_json(test_data()))
        .respond_with(ResponseTemplate::new(201).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = RequestBody::json(&test_data()).unwrap();
    let response = client_for(&mock_server).post("/test", body).await.unwrap();

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json::<TestData>().unwrap(), test_data());
}

#[tokio::test]
async fn test_preset_content_type_is_not_replaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/docs/1"))
        .and(header("content-type", "application/merge-patch+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let overrides = RequestConfig::new()
        .method(http::Method::PUT)
        .header("Content-Type", "application/merge-patch+json")
        .unwrap()
        .body(json!({ "title": "new" }));

    client_for(&mock_server).fetch("docs/1", overrides).await.unwrap();
}

#[tokio::test]
async fn test_text_body_is_sent_untouched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/notes/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("patched"))
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server).patch("notes/1", "plain text").await.unwrap();
    assert_eq!(response.body, Body::Text("patched".to_string()));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].body, b"plain text");
    assert!(requests[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn test_no_content_decodes_to_empty_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(204).insert_header("content-type", "application/json"))
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server).delete("/test").await.unwrap();

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(response.body, Body::Text(String::new()));
}

#[tokio::test]
async fn test_zero_content_length_decodes_to_empty_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/json"))
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server).get("empty").await.unwrap();
    assert_eq!(response.body, Body::Text(String::new()));
}

#[tokio::test]
async fn test_vendor_json_media_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vendor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"ok":true}"#, "application/vnd.acme.v20240101+json"),
        )
        .mount(&mock_server)
        .await;

    let plain = client_for(&mock_server);
    let response = plain.get("vendor").await.unwrap();
    assert_eq!(response.body, Body::Text(r#"{"ok":true}"#.to_string()));

    let vendor = Client::builder()
        .root_url(mock_server.uri())
        .unwrap()
        .vendor_json_media_type(r"^application/vnd\.acme\.v[0-9]{8}\+json$")
        .unwrap()
        .build()
        .unwrap();
    let response = vendor.get("vendor").await.unwrap();
    assert_eq!(response.body, Body::Json(json!({ "ok": true })));
}

#[tokio::test]
async fn test_sequential_gets_are_memoized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let first = client.get("test").await.unwrap();
    let second = client.get("/test").await.unwrap();

    assert_eq!(first.body, second.body);
    assert_eq!(client.cache().len(), 1);
}

#[tokio::test]
async fn test_concurrent_gets_are_coalesced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(test_data())
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (a, b) = tokio::join!(client.get("slow"), client.get("slow"));

    assert_eq!(a.unwrap().json::<TestData>().unwrap(), test_data());
    assert_eq!(b.unwrap().json::<TestData>().unwrap(), test_data());
}

#[tokio::test]
async fn test_writes_invalidate_memoized_gets() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.get("items").await.unwrap();
    client.get("items").await.unwrap();
    client.post("items", json!({ "name": "x" })).await.unwrap();
    assert!(client.cache().is_empty());
    client.get("items").await.unwrap();
}

#[tokio::test]
async fn test_clear_cache_forces_refetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.get("test").await.unwrap();
    client.clear_cache();
    client.get("test").await.unwrap();
}

#[tokio::test]
async fn test_failed_gets_are_not_memoized() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(move |_req: &wiremock::Request| {
            if attempt_count_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(503).set_body_string("unavailable")
            } else {
                ResponseTemplate::new(200).set_body_json(test_data())
            }
        })
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let err = client.get("flaky").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(err.raw_response(), Some("unavailable"));

    let response = client.get("flaky").await.unwrap();
    assert_eq!(response.json::<TestData>().unwrap(), test_data());
    assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_middlewares_run_in_order_on_every_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wrapped"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "n": 1 } })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let client = client_for(&mock_server)
        .with_middleware(|response| async move {
            Ok(response.map_body(|body| match body {
                Body::Json(mut value) => Body::Json(value["data"].take()),
                other => other,
            }))
        })
        .with_middleware(move |response| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(response.map_body(|body| match body {
                    Body::Json(mut value) => {
                        value["n"] = json!(value["n"].as_i64().unwrap_or_default() + 1);
                        Body::Json(value)
                    }
                    other => other,
                }))
            }
        });

    let first = client.get("wrapped").await.unwrap();
    let second = client.get("wrapped").await.unwrap();

    assert_eq!(first.body, Body::Json(json!({ "n": 2 })));
    assert_eq!(second.body, Body::Json(json!({ "n": 2 })));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_middleware_error_propagates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).with_middleware(|response: Response| async move {
        if response.status == StatusCode::OK {
            Err(Error::Middleware("rejected".to_string()))
        } else {
            Ok(response)
        }
    });

    let err = client.get("test").await.unwrap_err();
    assert!(matches!(err, Error::Middleware(_)));
}

#[tokio::test]
async fn test_call_options_do_not_leak_into_later_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client
        .fetch("one", RequestConfig::new().header("X-Call", "once").unwrap())
        .await
        .unwrap();
    client.get("two").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].headers.get("x-call").unwrap(), "once");
    assert!(requests[1].headers.get("x-call").is_none());
    assert!(client.options().headers.is_empty());
}

#[tokio::test]
async fn test_json_preset_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .and(header("accept", "application/json"))
        .and(header("x-client", "restling-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .root_url(mock_server.uri())
        .unwrap()
        .json()
        .default_header("X-Client", "restling-tests")
        .unwrap()
        .build()
        .unwrap();

    client.get("test").await.unwrap();
}

struct TenantHooks {
    tenant: &'static str,
}

#[async_trait::async_trait]
impl RequestHooks for TenantHooks {
    async fn will_send_request(&self, request: &mut RequestMetadata) -> restling::Result<()> {
        tokio::task::yield_now().await;
        request
            .headers
            .insert("x-tenant", http::HeaderValue::from_static(self.tenant));
        Ok(())
    }

    fn cache_key_for(&self, request: &RequestMetadata) -> String {
        // pages of the same listing share one entry
        format!("{}:{}", self.tenant, request.path)
    }
}

#[tokio::test]
async fn test_hooks_customize_headers_and_cache_keys() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(header("x-tenant", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .root_url(mock_server.uri())
        .unwrap()
        .hooks(TenantHooks { tenant: "acme" })
        .build()
        .unwrap();

    client.get("items?page=1").await.unwrap();
    client.get("items?page=2").await.unwrap();

    assert!(client.cache().contains("acme:/items"));
}

struct OfflineFallback;

#[async_trait::async_trait]
impl RequestHooks for OfflineFallback {
    async fn did_encounter_error(
        &self,
        _error: Error,
        request: &RequestMetadata,
    ) -> restling::Result<Response> {
        Ok(Response {
            body: Body::Text("offline".to_string()),
            url: request.url.clone(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            latency: Duration::ZERO,
        })
    }
}

#[tokio::test]
async fn test_transport_errors_propagate_by_default() {
    let client = Client::builder()
        .root_url("http://127.0.0.1:1")
        .unwrap()
        .build()
        .unwrap();

    let err = client.get("unreachable").await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_error_hook_can_recover_transport_errors() {
    let client = Client::builder()
        .root_url("http://127.0.0.1:1")
        .unwrap()
        .hooks(OfflineFallback)
        .build()
        .unwrap();

    let response = client.get("unreachable").await.unwrap();
    assert_eq!(response.text(), "offline");
}

#[tokio::test]
async fn test_crud_operations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({ "name": "Alice" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7, "name": "Alice" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7, "name": "Alice" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/users/7"))
        .and(body_json(json!({ "name": "Bob" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7, "name": "Bob" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .root_url(mock_server.uri())
        .unwrap()
        .json()
        .resource("users")
        .build()
        .unwrap();

    let users = client.crud().unwrap();

    assert_eq!(users.index().await.unwrap().body, Body::Json(json!([])));

    let created = users.store(json!({ "name": "Alice" })).await.unwrap();
    assert_eq!(created.status, StatusCode::CREATED);

    let shown = users.show(7).await.unwrap();
    assert_eq!(shown.body.as_json().unwrap()["name"], "Alice");

    let updated = users.update(7, json!({ "name": "Bob" })).await.unwrap();
    assert_eq!(updated.body.as_json().unwrap()["name"], "Bob");

    let deleted = users.destroy(7).await.unwrap();
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
}

struct SigningHooks;

#[async_trait::async_trait]
impl RequestHooks for SigningHooks {
    async fn will_send_request(&self, request: &mut RequestMetadata) -> restling::Result<()> {
        request.query.insert("signed", "yes");
        Ok(())
    }
}

#[tokio::test]
async fn test_hook_query_edits_reach_the_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("page", "2"))
        .and(query_param("signed", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .root_url(mock_server.uri())
        .unwrap()
        .hooks(SigningHooks)
        .build()
        .unwrap();

    let response = client.get("items?page=2").await.unwrap();

    assert_eq!(response.url.query(), Some("page=2&signed=yes"));
    assert!(client
        .cache()
        .contains(&format!("{}/items?page=2&signed=yes", mock_server.uri())));
}

#[tokio::test]
async fn test_write_during_pending_get_does_not_cancel_it() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("v")
                .set_delay(Duration::from_millis(200)),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (pending, written) = tokio::join!(
        client.get("items"),
        client.post("items", json!({ "name": "x" }))
    );

    assert_eq!(pending.unwrap().text(), "v");
    assert_eq!(written.unwrap().status, StatusCode::CREATED);

    // the write dropped the entry, so this GET goes back to the server
    assert!(client.cache().is_empty());
    assert_eq!(client.get("items").await.unwrap().text(), "v");
}

#[tokio::test]
async fn test_every_write_method_invalidates_memoized_gets() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(4)
        .mount(&mock_server)
        .await;

    for write in ["PUT", "PATCH", "DELETE"] {
        Mock::given(method(write))
            .and(path("/items/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = client_for(&mock_server);
    let key = format!("{}/items/1", mock_server.uri());

    client.get("items/1").await.unwrap();
    client.get("items/1").await.unwrap();

    for write in [http::Method::PUT, http::Method::PATCH, http::Method::DELETE] {
        client
            .fetch("items/1", RequestConfig::new().method(write.clone()))
            .await
            .unwrap();
        assert!(!client.cache().contains(&key), "{write} left the GET memoized");

        client.get("items/1").await.unwrap();
        assert!(client.cache().contains(&key));
    }
}

#[tokio::test]
async fn test_server_reason_phrase_is_reported() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(
                b"HTTP/1.1 418 Short And Stout\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            )
            .await
            .unwrap();
    });

    let client = Client::builder()
        .root_url(format!("http://{addr}"))
        .unwrap()
        .build()
        .unwrap();

    let err = client.get("pot").await.unwrap_err();

    assert_eq!(err.to_string(), "418: Short And Stout");
    assert_eq!(err.request_error().unwrap().response.status_text, "Short And Stout");
}

#[tokio::test]
async fn test_truncated_text_body_decodes_to_empty_text() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: 10\r\n\r\nabc")
            .await
            .unwrap();
    });

    let client = Client::builder()
        .root_url(format!("http://{addr}"))
        .unwrap()
        .build()
        .unwrap();

    let response = client.get("partial").await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, Body::Text(String::new()));
}
