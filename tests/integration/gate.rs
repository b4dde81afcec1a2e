//! Access gate: requests without the cookie are refused and change nothing.

use serde_json::json;

use crate::*;

#[tokio::test]
async fn test_requests_without_cookie_are_unauthorized() {
    let broker = start_broker(true).await.unwrap();

    let (st, _) = broker
        .post_with(
            "/peer/register",
            json!({ "peer_id": "a", "host": "127.0.0.1", "port": 5001 }),
            None,
        )
        .await
        .unwrap();
    assert_eq!(st, 401);

    let (st, _) = broker
        .post_with("/channel/create", json!({ "name": "room" }), None)
        .await
        .unwrap();
    assert_eq!(st, 401);

    let (_, body) = broker.get("/status").await.unwrap();
    assert_eq!(body["peers"], 0);
    assert_eq!(body["channels"], 0);
    broker.shutdown();
}

#[tokio::test]
async fn test_wrong_cookie_value_is_unauthorized() {
    let broker = start_broker(true).await.unwrap();
    let (st, _) = broker
        .post_with("/channel/create", json!({ "name": "room" }), Some("auth=false"))
        .await
        .unwrap();
    assert_eq!(st, 401);
    broker.shutdown();
}

#[tokio::test]
async fn test_cookie_among_others_is_accepted() {
    let broker = start_broker(true).await.unwrap();
    let (st, _) = broker
        .post_with(
            "/channel/create",
            json!({ "name": "room" }),
            Some("theme=dark; auth=true; lang=en"),
        )
        .await
        .unwrap();
    assert_eq!(st, 200);
    broker.shutdown();
}

#[tokio::test]
async fn test_denied_sync_does_not_reveal_channel() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("room", "a", 5001).await.unwrap();

    // Gate is checked before existence, so both answer 401.
    for name in ["room", "missing"] {
        let (st, _) = broker
            .post_with("/sync", json!({ "name": name, "after": 0 }), None)
            .await
            .unwrap();
        assert_eq!(st, 401, "sync {name}");
    }
    broker.shutdown();
}

#[tokio::test]
async fn test_open_gate_accepts_cookieless_requests() {
    let broker = start_broker(false).await.unwrap();
    let (st, _) = broker
        .post_with("/channel/create", json!({ "name": "room" }), None)
        .await
        .unwrap();
    assert_eq!(st, 200);
    broker.shutdown();
}

#[tokio::test]
async fn test_shutdown_endpoint_requires_cookie() {
    let broker = start_broker(true).await.unwrap();
    let (st, _) = broker
        .post_with("/daemon/shutdown", json!({}), None)
        .await
        .unwrap();
    assert_eq!(st, 401);

    // Still serving.
    let (st, _) = broker.get("/status").await.unwrap();
    assert_eq!(st, 200);

    let (st, _) = broker.post("/daemon/shutdown", json!({})).await.unwrap();
    assert_eq!(st, 200);
}

#[tokio::test]
async fn test_gate_is_checked_before_body_is_parsed() {
    let broker = start_broker(true).await.unwrap();

    for path in ["/channel/create", "/message", "/sync", "/peer/register"] {
        let (st, _) = broker.post_raw(path, "{not json", None).await.unwrap();
        assert_eq!(st, 401, "cookieless malformed POST {path}");
    }

    // With the cookie the same body reaches the JSON extractor.
    let (st, _) = broker
        .post_raw("/channel/create", "{not json", Some(COOKIE))
        .await
        .unwrap();
    assert_eq!(st, 400);
    broker.shutdown();
}
