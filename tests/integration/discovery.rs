//! Discovery handoff: join answers with the members a peer should dial.

use serde_json::json;

use crate::*;

#[tokio::test]
async fn test_join_returns_member_addresses() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("mesh", "peer-b", 6002).await.unwrap();

    broker
        .post(
            "/peer/register",
            json!({ "peer_id": "peer-a", "host": "10.0.0.5", "port": 6001 }),
        )
        .await
        .unwrap();
    let (st, body) = broker
        .post("/channel/join", json!({ "name": "mesh", "peer_id": "peer-a" }))
        .await
        .unwrap();
    assert_eq!(st, 200);

    let members = body["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["peer_id"], "peer-a");
    assert_eq!(members[0]["host"], "10.0.0.5");
    assert_eq!(members[0]["port"], 6001);
    assert_eq!(members[1]["peer_id"], "peer-b");
    assert_eq!(members[1]["port"], 6002);

    broker.shutdown();
}

#[tokio::test]
async fn test_members_reflect_re_registration() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("mesh", "a", 6001).await.unwrap();

    // Legacy clients send `ip`.
    let (st, _) = broker
        .post(
            "/peer/register",
            json!({ "peer_id": "a", "ip": "192.168.1.7", "port": 7001 }),
        )
        .await
        .unwrap();
    assert_eq!(st, 200);

    let (st, body) = broker.get("/channel/mesh/members").await.unwrap();
    assert_eq!(st, 200);
    let members = body["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["host"], "192.168.1.7");
    assert_eq!(members[0]["port"], 7001);

    let (_, body) = broker.get("/peers").await.unwrap();
    assert_eq!(body["peers"].as_array().unwrap().len(), 1);

    broker.shutdown();
}

#[tokio::test]
async fn test_join_twice_keeps_one_membership() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("mesh", "a", 6001).await.unwrap();
    let (st, body) = broker
        .post("/channel/join", json!({ "name": "mesh", "peer_id": "a" }))
        .await
        .unwrap();
    assert_eq!(st, 200);
    assert_eq!(body["members"].as_array().unwrap().len(), 1);
    broker.shutdown();
}

#[tokio::test]
async fn test_members_of_missing_channel_is_not_found() {
    let broker = start_broker(true).await.unwrap();
    let (st, _) = broker.get("/channel/nowhere/members").await.unwrap();
    assert_eq!(st, 404);
    broker.shutdown();
}

#[tokio::test]
async fn test_members_of_channel_with_reserved_characters() {
    let broker = start_broker(true).await.unwrap();
    broker.enter("dev#1", "a", 6001).await.unwrap();
    broker.enter("dev", "b", 6002).await.unwrap();
    broker.enter("ops/eu?x", "c", 6003).await.unwrap();

    let (st, body) = broker.get("/channel/dev%231/members").await.unwrap();
    assert_eq!(st, 200);
    assert_eq!(body["name"], "dev#1");
    assert_eq!(body["members"][0]["peer_id"], "a");
    assert_eq!(body["members"].as_array().unwrap().len(), 1);

    let (st, body) = broker.get("/channel/ops%2Feu%3Fx/members").await.unwrap();
    assert_eq!(st, 200);
    assert_eq!(body["name"], "ops/eu?x");
    assert_eq!(body["members"][0]["peer_id"], "c");
    broker.shutdown();
}
