use crate::core::relay::RelayService;
use crate::domain::model::RelayRequest;
use crate::domain::ports::UpstreamClient;
use crate::utils::error::RelayError;
use axum::{
    extract::{RawQuery, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

pub const VERSION_HEADER: &str = "version";

pub fn app<C: UpstreamClient + 'static>(service: RelayService<C>) -> Router {
    Router::new()
        .route("/", get(relay::<C>))
        .with_state(Arc::new(service))
}

/// 啟動 HTTP 服務，收到 Ctrl-C 後優雅關閉
pub async fn run(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}

async fn relay<C: UpstreamClient + 'static>(
    State(service): State<Arc<RelayService<C>>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Json<Value>, RelayError> {
    let request = RelayRequest::from_parts(
        query.as_deref(),
        headers.get(AUTHORIZATION).cloned(),
        header_value(&headers, VERSION_HEADER),
    );

    service.handle(request).await.map(Json)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_upstream() {
            tracing::error!("❌ Error during request processing: {}", self);
        } else if status.is_server_error() {
            tracing::error!("❌ Internal error: {}", self);
        } else {
            tracing::warn!("🔶 Rejected request: {}", self);
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
