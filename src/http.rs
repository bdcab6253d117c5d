//! Operator HTTP endpoint.
//!
//! Serves `/metrics` for Prometheus and `/health` with the curator's view of
//! open documents. Editing traffic never goes through here.

use crate::Curator;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;

async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// 200 while the curator accepts documents, 503 once it is shutting down.
async fn health_handler(State(curator): State<Arc<Curator>>) -> (StatusCode, Json<Value>) {
    let closed = curator.is_closed();
    let status = if closed {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    let body = json!({
        "status": if closed { "closing" } else { "ok" },
        "open_documents": curator.open_documents(),
    });
    (status, Json(body))
}

fn router(curator: Arc<Curator>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(curator)
}

/// Serve the operator endpoints on `0.0.0.0:port` until the process exits.
pub async fn run_http_server(port: u16, curator: Arc<Curator>) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Operator HTTP server listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind HTTP server on {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, router(curator)).await {
        tracing::error!("HTTP server error: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BinderConfig;
    use crate::store::MemoryStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn get(curator: Arc<Curator>, path: &str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router(curator)).await;
        });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    fn curator() -> Arc<Curator> {
        Arc::new(Curator::new(
            BinderConfig::default(),
            Arc::new(MemoryStore::mock("demo", "hello")),
        ))
    }

    #[tokio::test]
    async fn test_metrics_endpoint_serves_text() {
        crate::metrics::init();
        crate::metrics::record_accepted(1);

        let response = get(curator(), "/metrics").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("scribe_transforms_accepted_total"));
    }

    #[tokio::test]
    async fn test_health_counts_open_documents() {
        let curator = curator();
        let _portal = curator.find_or_create("demo").await.unwrap();

        let response = get(curator.clone(), "/health").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains(r#""open_documents":1"#));

        curator.close().await;
        let response = get(curator, "/health").await;
        assert!(response.starts_with("HTTP/1.1 503"));
        assert!(response.contains(r#""status":"closing""#));
    }
}
