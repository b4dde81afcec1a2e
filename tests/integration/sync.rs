//! Long-poll sync: a waiting reader is woken by a post from another peer.

use std::time::{Duration, Instant};

use serde_json::json;

use crate::*;

#[tokio::test]
async fn test_long_poll_wakes_on_post() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("room", "writer", 5001).await.unwrap();

    let reader = {
        let base = broker.base.clone();
        tokio::spawn(async move {
            reqwest::Client::new()
                .post(format!("{base}/sync"))
                .header(reqwest::header::COOKIE, COOKIE)
                .json(&json!({ "name": "room", "after": 0, "wait_ms": 2000 }))
                .send()
                .await
                .unwrap()
                .json::<serde_json::Value>()
                .await
                .unwrap()
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    let (st, _) = broker
        .post("/message", json!({ "name": "room", "peer_id": "writer", "text": "ping" }))
        .await
        .unwrap();
    assert_eq!(st, 200);

    let body = tokio::time::timeout(Duration::from_secs(5), reader)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(body["messages"][0]["text"], "ping");
    assert_eq!(body["new_after"], 1);
    broker.shutdown();
}

#[tokio::test]
async fn test_long_poll_times_out_empty() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("room", "a", 5001).await.unwrap();

    let started = Instant::now();
    let (st, body) = broker
        .post("/sync", json!({ "name": "room", "after": 0, "wait_ms": 200 }))
        .await
        .unwrap();
    assert_eq!(st, 200);
    assert!(started.elapsed() >= Duration::from_millis(150));
    assert!(body["messages"].as_array().unwrap().is_empty());
    assert_eq!(body["new_after"], 0);
    broker.shutdown();
}

#[tokio::test]
async fn test_wait_is_capped_by_server() {
    // The harness caps waits at two seconds.
    let broker = start_broker(true).await.unwrap();
    broker.enter("room", "a", 5001).await.unwrap();

    let started = Instant::now();
    let (st, _) = broker
        .post("/sync", json!({ "name": "room", "after": 0, "wait_ms": 60_000 }))
        .await
        .unwrap();
    assert_eq!(st, 200);
    assert!(started.elapsed() < Duration::from_secs(10));
    broker.shutdown();
}

#[tokio::test]
async fn test_concurrent_posts_get_distinct_positions() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("room", "a", 5001).await.unwrap();
    broker.enter("room", "b", 5002).await.unwrap();

    let mut tasks = Vec::new();
    for peer in ["a", "b"] {
        let base = broker.base.clone();
        tasks.push(tokio::spawn(async move {
            let client = reqwest::Client::new();
            let mut positions = Vec::new();
            for i in 0..20 {
                let body: serde_json::Value = client
                    .post(format!("{base}/message"))
                    .header(reqwest::header::COOKIE, COOKIE)
                    .json(&json!({ "name": "room", "peer_id": peer, "text": format!("{peer}{i}") }))
                    .send()
                    .await
                    .unwrap()
                    .json()
                    .await
                    .unwrap();
                positions.push(body["position"].as_u64().unwrap());
            }
            positions
        }));
    }

    let mut all = Vec::new();
    for t in tasks {
        all.extend(t.await.unwrap());
    }
    all.sort_unstable();
    assert_eq!(all, (1..=40).collect::<Vec<u64>>());

    let (_, body) = broker
        .post("/sync", json!({ "name": "room", "after": 0 }))
        .await
        .unwrap();
    assert_eq!(body["messages"].as_array().unwrap().len(), 40);
    broker.shutdown();
}
