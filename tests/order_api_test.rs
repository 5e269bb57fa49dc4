//! In-process tests for the order endpoints.
//!
//! The router runs without a TCP socket; the broker is replaced by a loopback
//! publisher that delivers asynchronously into the real delivery handler.

mod common;

use axum::http::StatusCode;
use common::{call, get, harness, parse_json, post_json, wait_for_orders};
use order_relay::messaging::rabbitmq::ConsumerStatus;
use order_relay::storage::OrderSnapshot;
use rstest::rstest;
use serde_json::json;

const MISSING: &str = "Missing order information (id, item, quantity are required).";

#[tokio::test]
async fn test_submitted_order_appears_after_delivery() {
    let h = harness();

    let (status, body) = call(
        &h.router,
        post_json("/orders", r#"{"id":"1","item":"widget","quantity":3}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.is_empty());

    wait_for_orders(&h.snapshot, 1).await;

    let (status, body) = call(&h.router, get("/orders")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse_json(body),
        json!([{"id": "1", "item": "widget", "quantity": 3}])
    );
}

#[tokio::test]
async fn test_orders_are_listed_once_in_delivery_order() {
    let h = harness();

    for (id, item) in [(3, "c"), (1, "a"), (2, "b")] {
        let body = json!({"id": id, "item": item, "quantity": 1}).to_string();
        let (status, _) = call(&h.router, post_json("/orders", &body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    wait_for_orders(&h.snapshot, 3).await;

    let (_, body) = call(&h.router, get("/orders")).await;
    let ids: Vec<_> = parse_json(body)
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!(3), json!(1), json!(2)]);
}

#[tokio::test]
async fn test_extra_fields_survive_the_round_trip() {
    let h = harness();
    let raw = r#"{"quantity":2,"item":"bolt","id":42,"meta":{"gift":true,"tags":["a","b"]}}"#;

    call(&h.router, post_json("/orders", raw)).await;
    wait_for_orders(&h.snapshot, 1).await;

    let published = h.broker.published().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, "order_queue");
    assert_eq!(published[0].1, raw.as_bytes());

    let (_, body) = call(&h.router, get("/orders")).await;
    assert_eq!(&body[..], format!("[{}]", raw).as_bytes());
}

#[tokio::test]
async fn test_large_numbers_in_extra_fields_are_not_rounded() {
    let h = harness();
    let raw = r#"{"id":"1","item":"w","quantity":3,"ref":123456789012345678901234567890,"rate":0.1000000000000000000001}"#;

    let (status, _) = call(&h.router, post_json("/orders", raw)).await;
    assert_eq!(status, StatusCode::OK);
    wait_for_orders(&h.snapshot, 1).await;

    let published = h.broker.published().await;
    assert_eq!(published[0].1, raw.as_bytes());

    let (_, body) = call(&h.router, get("/orders")).await;
    assert_eq!(&body[..], format!("[{}]", raw).as_bytes());
}

#[rstest]
#[case(r#"{"item":"widget"}"#)]
#[case(r#"{"id":"1","item":"widget"}"#)]
#[case(r#"{"id":"1","quantity":3}"#)]
#[case(r#"{"id":null,"item":"widget","quantity":3}"#)]
#[case(r#"[1,2,3]"#)]
#[tokio::test]
async fn test_incomplete_order_is_rejected_without_publishing(#[case] body: &str) {
    let h = harness();

    let (status, resp) = call(&h.router, post_json("/orders", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(resp), json!({"error": MISSING}));

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(h.broker.published().await.is_empty());
    assert!(h.snapshot.is_empty());
}

#[tokio::test]
async fn test_malformed_json_body_is_a_client_error() {
    let h = harness();

    let (status, resp) = call(&h.router, post_json("/orders", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse_json(resp)["error"].is_string());
    assert!(h.broker.published().await.is_empty());
}

#[tokio::test]
async fn test_broker_outage_yields_server_error_and_no_snapshot_change() {
    let h = harness();
    h.broker.set_offline(true);

    let (status, resp) = call(
        &h.router,
        post_json("/orders", r#"{"id":"1","item":"widget","quantity":3}"#),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(parse_json(resp)["error"]
        .as_str()
        .unwrap()
        .contains("unavailable"));

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(h.snapshot.is_empty());

    // broker 恢復後同一請求可以成功
    h.broker.set_offline(false);
    let (status, _) = call(
        &h.router,
        post_json("/orders", r#"{"id":"1","item":"widget","quantity":3}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    wait_for_orders(&h.snapshot, 1).await;
}

#[tokio::test]
async fn test_repeated_reads_are_identical() {
    let h = harness();
    call(&h.router, post_json("/orders", r#"{"id":"a","item":"x","quantity":1}"#)).await;
    call(&h.router, post_json("/orders", r#"{"id":"b","item":"y","quantity":2}"#)).await;
    wait_for_orders(&h.snapshot, 2).await;

    let (_, first) = call(&h.router, get("/orders")).await;
    let (_, second) = call(&h.router, get("/orders")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_malformed_delivery_is_dropped_and_consumer_keeps_going() {
    let h = harness();

    h.broker.deliver_raw(b"this is not json");
    h.broker.deliver_raw(b"[\"not\", \"an\", \"object\"]");
    call(&h.router, post_json("/orders", r#"{"id":"7","item":"gear","quantity":5}"#)).await;

    wait_for_orders(&h.snapshot, 1).await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let (status, body) = call(&h.router, get("/orders")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body), json!([{"id": "7", "item": "gear", "quantity": 5}]));
}

#[tokio::test]
async fn test_duplicate_ids_are_not_deduplicated() {
    let h = harness();
    call(&h.router, post_json("/orders", r#"{"id":"1","item":"x","quantity":1}"#)).await;
    call(&h.router, post_json("/orders", r#"{"id":"1","item":"x","quantity":1}"#)).await;
    wait_for_orders(&h.snapshot, 2).await;

    let (_, body) = call(&h.router, get("/orders")).await;
    assert_eq!(parse_json(body).as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_end_to_end_valid_and_invalid_submissions() {
    let h = harness();

    let (status, _) = call(
        &h.router,
        post_json("/orders", r#"{"id":"1","item":"widget","quantity":3}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&h.router, post_json("/orders", r#"{"item":"widget"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    wait_for_orders(&h.snapshot, 1).await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let (_, body) = call(&h.router, get("/orders")).await;
    assert_eq!(
        parse_json(body),
        json!([{"id": "1", "item": "widget", "quantity": 3}])
    );
}

#[tokio::test]
async fn test_health_reflects_consumer_status() {
    let h = harness();

    let (status, body) = call(&h.router, get("/system/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["consumer"], "consuming");
    assert_eq!(json["orders"], 0);

    h.status_tx.send_replace(ConsumerStatus::Reconnecting);

    let (status, body) = call(&h.router, get("/system/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(parse_json(body)["consumer"], "reconnecting");
}
