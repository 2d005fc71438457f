//! HTTP surface for the relay
//!
//! One JSON endpoint, `POST /api/proxy`, plus a liveness check.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use eyre::{Context, Result};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use super::handler::Relay;
use super::messages::RelayResponse;
use crate::config::Config;

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

/// Build the relay router
pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/api/proxy", post(proxy))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(relay)
}

async fn proxy(State(relay): State<Arc<Relay>>, body: Bytes) -> RelayResponse {
    debug!(body_len = body.len(), "proxy: called");
    relay.handle_body(&body).await
}

async fn health(State(relay): State<Arc<Relay>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "configured": relay.is_configured(),
    }))
}

/// Run the relay until Ctrl-C
pub async fn serve(config: &Config, bind: Option<&str>) -> Result<()> {
    let relay = Arc::new(Relay::from_config(config).context("Failed to create relay")?);
    if !relay.is_configured() {
        warn!(
            env = %config.relay.base_url_env,
            "Agent API base URL is not set; every relay request will fail with 500"
        );
    }

    let addr = bind.unwrap_or(config.relay.bind.as_str());
    let listener = TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind relay to {}", addr))?;

    serve_on(listener, relay, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves
pub async fn serve_on<F>(listener: TcpListener, relay: Arc<Relay>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("Failed to read listener address")?;
    info!(%addr, "Relay listening");

    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Relay server failed")?;

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_proxy(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/proxy")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_proxy_send_message_passthrough() {
        let server = MockServer::start().await;
        let events = json!([
            {"author": "planning_agent", "content": {"parts": [{"text": "Hi there"}]}},
            {"author": "tool", "content": {"parts": [{"text": "ignored"}]}}
        ]);
        Mock::given(method("POST"))
            .and(path("/run"))
            .respond_with(ResponseTemplate::new(200).set_body_json(events.clone()))
            .expect(1)
            .mount(&server)
            .await;
        let relay = Arc::new(Relay::new(Some(server.uri()), "planning_agent", Duration::from_secs(5)).unwrap());

        let resp = router(relay)
            .oneshot(post_proxy(json!({
                "type": "sendMessage",
                "app_name": "planning_agent",
                "user_id": "u_123",
                "session_id": "s_123",
                "new_message": {"role": "user", "parts": [{"text": "Hello"}]}
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, events);
    }

    #[tokio::test]
    async fn test_proxy_unknown_type_is_400() {
        let server = MockServer::start().await;
        let relay = Arc::new(Relay::new(Some(server.uri()), "planning_agent", Duration::from_secs(5)).unwrap());

        let resp = router(relay).oneshot(post_proxy(json!({"type": "unknown"}))).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, json!({"error": "Invalid request type provided."}));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_proxy_upstream_status_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "overloaded"})))
            .mount(&server)
            .await;
        let relay = Arc::new(Relay::new(Some(server.uri()), "planning_agent", Duration::from_secs(5)).unwrap());

        let resp = router(relay)
            .oneshot(post_proxy(json!({
                "type": "initializeSession",
                "userId": "u_123",
                "sessionId": "s_123"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(resp).await, json!({"detail": "overloaded"}));
    }

    #[tokio::test]
    async fn test_proxy_unconfigured_is_500() {
        let relay = Arc::new(Relay::new(None, "planning_agent", Duration::from_secs(1)).unwrap());

        let resp = router(relay).oneshot(post_proxy(json!({"type": "unknown"}))).await.unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Server configuration error"));
    }

    #[tokio::test]
    async fn test_health_reports_configuration() {
        let relay = Arc::new(Relay::new(None, "planning_agent", Duration::from_secs(1)).unwrap());

        let resp = router(relay)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"status": "ok", "configured": false}));
    }
}
