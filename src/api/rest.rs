// src/api/rest.rs
use axum::{http::StatusCode, Router};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::server::ServerResult;
use super::{routes::api_routes, state::AppState};

pub struct RestApi {
    server_config: ServerConfig,
    state: AppState,
}

impl RestApi {
    pub fn new(server_config: ServerConfig, state: AppState) -> Self {
        Self {
            server_config,
            state,
        }
    }

    /// 綁定端口並提供服務，直到 `shutdown` 完成
    pub async fn start<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.build_app();

        let listener =
            TcpListener::bind((self.server_config.host.as_str(), self.server_config.port)).await?;
        info!("Order relay is running on http://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("REST API stopped");

        Ok(())
    }

    /// 建立帶有中間件的應用
    pub fn build_app(&self) -> Router {
        api_routes()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new())
                    .on_response(DefaultOnResponse::new()),
            )
            .layer(self.build_cors_layer())
            .layer(request_timeout_layer(self.server_config.request_timeout()))
            .with_state(self.state.clone())
    }

    fn build_cors_layer(&self) -> CorsLayer {
        let cors = CorsLayer::new()
            .allow_methods(vec![axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers(vec![axum::http::header::CONTENT_TYPE]);

        if self.server_config.cors_allow_all {
            return cors.allow_origin(Any);
        }

        let origins = self
            .server_config
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect::<Vec<axum::http::HeaderValue>>();

        cors.allow_origin(origins)
    }
}

/// 逾時的請求回傳 408
fn request_timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}
