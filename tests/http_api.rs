//! End-to-end tests against a live server on an ephemeral port.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mileage_service::api;
use mileage_service::app_state::AppState;
use mileage_service::persistence::MemoryStore;
use serde_json::{Value, json};

async fn spawn_server() -> SocketAddr {
    let app = api::app(
        AppState::new(Arc::new(MemoryStore::new())),
        Duration::from_secs(5),
    );
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn post_event(client: &reqwest::Client, addr: SocketAddr, body: Value) -> (u16, Value) {
    let Ok(response) = client
        .post(format!("http://{addr}/api/v1/events"))
        .json(&body)
        .send()
        .await
    else {
        panic!("request failed");
    };
    let status = response.status().as_u16();
    let Ok(value) = response.json::<Value>().await else {
        panic!("response is not JSON");
    };
    (status, value)
}

async fn point(client: &reqwest::Client, addr: SocketAddr, user: &str) -> i64 {
    let Ok(response) = client
        .get(format!("http://{addr}/api/v1/users/{user}/point"))
        .send()
        .await
    else {
        panic!("request failed");
    };
    let Ok(value) = response.json::<Value>().await else {
        panic!("response is not JSON");
    };
    value["response"]["point"].as_i64().unwrap_or(i64::MIN)
}

#[tokio::test]
async fn review_lifecycle_over_http() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = post_event(
        &client,
        addr,
        json!({
            "type": "REVIEW", "action": "ADD",
            "userId": "foo", "placeId": "bar", "content": "hello"
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["response"]["increasedPoint"], 2);
    let Some(review_id) = body["response"]["reviewId"].as_str().map(str::to_string) else {
        panic!("add should return a review id");
    };
    assert_eq!(point(&client, addr, "foo").await, 2);

    let (status, body) = post_event(
        &client,
        addr,
        json!({
            "type": "REVIEW", "action": "ADD",
            "userId": "baz", "placeId": "bar", "content": "hi"
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["response"]["increasedPoint"], 1);

    let (status, body) = post_event(
        &client,
        addr,
        json!({
            "type": "REVIEW", "action": "MOD", "userId": "foo",
            "reviewId": review_id, "content": "hello", "attachedPhotoIds": ["p1"]
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["response"]["increasedPoint"], 1);
    assert_eq!(point(&client, addr, "foo").await, 3);

    let (status, body) = post_event(
        &client,
        addr,
        json!({
            "type": "REVIEW", "action": "DELETE",
            "userId": "foo", "reviewId": review_id
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["response"]["decreasedPoint"], 3);
    assert!(body["response"].get("reviewId").is_none());
    assert_eq!(point(&client, addr, "foo").await, 0);
    assert_eq!(point(&client, addr, "baz").await, 1);
}

#[tokio::test]
async fn rejected_events_leave_balances_alone() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = post_event(
        &client,
        addr,
        json!({
            "type": "REVIEW", "action": "ADD",
            "userId": "foo", "placeId": "bar", "content": ""
        }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 1002);

    let (status, body) = post_event(
        &client,
        addr,
        json!({"type": "REVIEW", "action": "UPSERT", "userId": "foo"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"], "UPSERT");

    assert_eq!(point(&client, addr, "foo").await, 0);
}

#[tokio::test]
async fn health_endpoint_is_up() {
    let addr = spawn_server().await;
    let Ok(response) = reqwest::get(format!("http://{addr}/health")).await else {
        panic!("request failed");
    };
    assert_eq!(response.status().as_u16(), 200);
    let Ok(body) = response.json::<Value>().await else {
        panic!("response is not JSON");
    };
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
