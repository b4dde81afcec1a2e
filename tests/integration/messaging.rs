//! Relayed messaging over HTTP: post, sync, cursors and status mapping.

use serde_json::json;

use crate::*;

#[tokio::test]
async fn test_two_peers_exchange_messages_through_broker() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("lobby", "alice", 5001).await.unwrap();
    broker.enter("lobby", "bob", 5002).await.unwrap();

    let (st, body) = broker
        .post("/message", json!({ "name": "lobby", "peer_id": "alice", "text": "hi bob" }))
        .await
        .unwrap();
    assert_eq!(st, 200);
    assert_eq!(body["position"], 1);

    let (st, body) = broker
        .post("/message", json!({ "name": "lobby", "peer_id": "bob", "text": "hi alice" }))
        .await
        .unwrap();
    assert_eq!(st, 200);
    assert_eq!(body["position"], 2);

    let (st, body) = broker
        .post("/sync", json!({ "name": "lobby", "after": 0 }))
        .await
        .unwrap();
    assert_eq!(st, 200);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["author"], "alice");
    assert_eq!(messages[0]["text"], "hi bob");
    assert_eq!(messages[1]["author"], "bob");
    assert_eq!(body["new_after"], 2);

    broker.shutdown();
}

#[tokio::test]
async fn test_sync_from_cursor_returns_only_newer() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("room", "a", 5001).await.unwrap();
    for text in ["one", "two", "three"] {
        let (st, _) = broker
            .post("/message", json!({ "name": "room", "peer_id": "a", "text": text }))
            .await
            .unwrap();
        assert_eq!(st, 200);
    }

    let (_, body) = broker
        .post("/sync", json!({ "name": "room", "after": 2 }))
        .await
        .unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["text"], "three");
    assert_eq!(messages[0]["position"], 3);
    assert_eq!(body["new_after"], 3);

    // Caught up: nothing new, cursor unchanged.
    let (_, body) = broker
        .post("/sync", json!({ "name": "room", "after": 3 }))
        .await
        .unwrap();
    assert!(body["messages"].as_array().unwrap().is_empty());
    assert_eq!(body["new_after"], 3);

    broker.shutdown();
}

#[tokio::test]
async fn test_post_by_non_member_is_forbidden() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("room", "a", 5001).await.unwrap();
    let (st, _) = broker
        .post(
            "/peer/register",
            json!({ "peer_id": "outsider", "host": "127.0.0.1", "port": 5009 }),
        )
        .await
        .unwrap();
    assert_eq!(st, 200);

    let (st, _) = broker
        .post("/message", json!({ "name": "room", "peer_id": "outsider", "text": "let me in" }))
        .await
        .unwrap();
    assert_eq!(st, 403);

    let (_, body) = broker
        .post("/sync", json!({ "name": "room", "after": 0 }))
        .await
        .unwrap();
    assert!(body["messages"].as_array().unwrap().is_empty());

    broker.shutdown();
}

#[tokio::test]
async fn test_unknown_channel_and_peer_are_not_found() {
    let broker = start_broker(true).await.unwrap();

    let (st, _) = broker
        .post("/sync", json!({ "name": "nowhere", "after": 0 }))
        .await
        .unwrap();
    assert_eq!(st, 404);

    let (st, _) = broker
        .post("/message", json!({ "name": "nowhere", "peer_id": "a", "text": "x" }))
        .await
        .unwrap();
    assert_eq!(st, 404);

    let (st, _) = broker
        .post("/channel/create", json!({ "name": "room" }))
        .await
        .unwrap();
    assert_eq!(st, 200);
    let (st, _) = broker
        .post("/channel/join", json!({ "name": "room", "peer_id": "ghost" }))
        .await
        .unwrap();
    assert_eq!(st, 404);

    broker.shutdown();
}

#[tokio::test]
async fn test_empty_channel_name_is_bad_request() {
    let broker = start_broker(true).await.unwrap();
    let (st, _) = broker
        .post("/channel/create", json!({ "name": "" }))
        .await
        .unwrap();
    assert_eq!(st, 400);
    broker.shutdown();
}

#[tokio::test]
async fn test_status_counts_follow_activity() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("room", "a", 5001).await.unwrap();
    broker.enter("other", "b", 5002).await.unwrap();
    broker
        .post("/message", json!({ "name": "room", "peer_id": "a", "text": "x" }))
        .await
        .unwrap();

    let (st, body) = broker.get("/status").await.unwrap();
    assert_eq!(st, 200);
    assert_eq!(body["peers"], 2);
    assert_eq!(body["channels"], 2);
    assert_eq!(body["messages"], 1);
    broker.shutdown();
}
