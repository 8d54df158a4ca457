//! HTTP transport: model listing, chat completion passthrough and SSE streaming.

use super::error::HttpError;
use super::sse::sse_response;
use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::llm::ChatCompletion;
use crate::relay::Relay;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::Request,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// Build the router. CORS is permissive when enabled.
pub fn router(relay: Relay, cors_enabled: bool) -> Router {
    let app = Router::new()
        .route("/", get(status))
        .route("/models", get(list_models))
        .route("/chat/completions", post(chat_completions))
        .route("/chat/completions/stream", post(chat_completions_stream))
        .with_state(relay)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    route = %request.uri().path(),
                )
            }),
        );

    if cors_enabled {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Bind and serve until Ctrl-C
pub async fn serve(relay: Relay, config: &HttpConfig) -> Result<()> {
    let addr = config.bind_addr()?;
    let app = router(relay, config.cors_enabled);

    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn parse_body(body: &Bytes) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| Error::Parse(e.to_string()))
}

async fn status(State(relay): State<Relay>) -> Json<Value> {
    let info = relay.server_info();
    Json(json!({
        "status": "ok",
        "name": info.name,
        "version": info.version,
        "models": relay.registry().len(),
    }))
}

async fn list_models(State(relay): State<Relay>) -> Json<Value> {
    Json(json!({ "models": relay.list_models() }))
}

async fn chat_completions(
    State(relay): State<Relay>,
    body: Bytes,
) -> std::result::Result<Json<ChatCompletion>, HttpError> {
    let params = parse_body(&body)?;
    let request = relay.prepare_chat(&params)?;
    let completion = relay.complete(&request).await?;
    Ok(Json(completion))
}

async fn chat_completions_stream(
    State(relay): State<Relay>,
    body: Bytes,
) -> std::result::Result<Response, HttpError> {
    let params = parse_body(&body)?;
    let request = relay.prepare_chat(&params)?;
    let stream = relay.stream(&request).await?;
    Ok(sse_response(stream))
}
