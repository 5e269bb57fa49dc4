#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use order_relay::api::{AppState, RestApi};
use order_relay::config::ServerConfig;
use order_relay::messaging::rabbitmq::{ConsumerStatus, DeliveryHandler, MessagePublisher, RabbitMQError};
use order_relay::relay::{OrderDeliveryHandler, RelayPublisher};
use order_relay::storage::{InMemoryOrderSnapshot, OrderSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tower::ServiceExt;

/// 行程內的 broker 替身：發布的位元組經由 channel 非同步投遞給處理器
pub struct LoopbackBroker {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    published: Mutex<Vec<(String, Vec<u8>)>>,
    offline: AtomicBool,
}

impl LoopbackBroker {
    pub fn start(handler: Arc<dyn DeliveryHandler>) -> Arc<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

        tokio::spawn(async move {
            while let Some(payload) = rx.recv().await {
                // 處理失敗即丟棄，與 auto-ack 模式一致
                let _ = handler.handle(&payload).await;
            }
        });

        Arc::new(Self {
            tx,
            published: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
        })
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// 模擬其他生產者送來的原始訊息
    pub fn deliver_raw(&self, payload: &[u8]) {
        self.tx.send(payload.to_vec()).expect("delivery loop stopped");
    }

    pub async fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl MessagePublisher for LoopbackBroker {
    async fn publish(&self, queue_name: &str, payload: &[u8]) -> Result<(), RabbitMQError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RabbitMQError::Connection("connection refused".into()));
        }

        self.published
            .lock()
            .await
            .push((queue_name.to_string(), payload.to_vec()));
        self.tx
            .send(payload.to_vec())
            .map_err(|_| RabbitMQError::Publish("delivery loop stopped".into()))
    }
}

pub struct TestHarness {
    pub router: Router,
    pub broker: Arc<LoopbackBroker>,
    pub snapshot: Arc<InMemoryOrderSnapshot>,
    pub status_tx: watch::Sender<ConsumerStatus>,
}

pub fn harness() -> TestHarness {
    let snapshot = Arc::new(InMemoryOrderSnapshot::new());
    let handler = Arc::new(OrderDeliveryHandler::new(snapshot.clone()));
    let broker = LoopbackBroker::start(handler);

    let relay = Arc::new(RelayPublisher::new(
        broker.clone(),
        "order_queue",
        Duration::from_secs(1),
    ));
    let (status_tx, status_rx) = watch::channel(ConsumerStatus::Consuming);

    let state = AppState::new(snapshot.clone(), relay, status_rx);
    let router = RestApi::new(ServerConfig::default(), state).build_app();

    TestHarness {
        router,
        broker,
        snapshot,
        status_tx,
    }
}

/// 送出單一請求並回傳 (status, body)
pub async fn call(router: &Router, req: Request<Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.clone().oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

/// 等待快照達到指定筆數
pub async fn wait_for_orders(snapshot: &InMemoryOrderSnapshot, expected: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while snapshot.len() < expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("orders were not delivered in time");
}
