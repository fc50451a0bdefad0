//! HTTP Server for the plan validation API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | POST   | `/api/validate`   | Upload a plan file for validation        |
//! | POST   | `/api/hub-match`  | Check hub offices against a chosen hub   |
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |

use axum::{
    extract::Multipart,
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_warning, LOG_BROADCASTER};
use super::types::{error_response, HubMatchRequest, HubMatchResponse, ValidationResponse};
use crate::error::{ServerError, ServerResult};
use crate::models::HubUnit;
use crate::parser::UploadedFile;
use crate::validation::{apply_hub_check, validate_file, validate_hub_match, ValidationOptions};

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

/// Build the router with all routes and CORS.
pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/validate", post(validate_upload))
        .route("/api/hub-match", post(hub_match))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> ServerResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 MMP validator running on http://localhost:{}", port);
    eprintln!("   POST /api/validate  - Upload plan file");
    eprintln!("   POST /api/hub-match - Hub office check");
    eprintln!("   GET  /api/logs      - SSE log stream");
    eprintln!("   GET  /health        - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router()).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "mmp-validator",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "validate": "POST /api/validate",
            "hubMatch": "POST /api/hub-match",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: multipart `file`, optional `hubId` + `hubs` (JSON catalogue).
async fn validate_upload(mut multipart: Multipart) -> ServerResult<Json<ValidationResponse>> {
    let mut file: Option<UploadedFile> = None;
    let mut hub_id: Option<String> = None;
    let mut hubs: Option<Vec<HubUnit>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.csv").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                file = Some(UploadedFile::new(file_name, bytes.to_vec()));
            }
            "hubId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                hub_id = Some(text.trim().to_string()).filter(|s| !s.is_empty());
            }
            "hubs" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                let parsed = serde_json::from_str(&text)
                    .map_err(|e| ServerError::BadRequest(format!("Invalid hubs catalogue: {}", e)))?;
                hubs = Some(parsed);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;
    log_info(format!("New upload: {} ({} bytes)", file.name, file.bytes.len()));

    let mut result = validate_file(&file, &ValidationOptions::default(), None).await;

    if let Some(hub_id) = hub_id {
        let hubs = hubs.ok_or_else(|| {
            ServerError::BadRequest("hubId given without a hubs catalogue".to_string())
        })?;
        let mismatches = apply_hub_check(&mut result, &hub_id, &hubs);
        if mismatches > 0 {
            log_warning(format!("{} hub office mismatches", mismatches));
        }
    }

    Ok(Json(ValidationResponse::from(result)))
}

/// Standalone hub check.
async fn hub_match(Json(request): Json<HubMatchRequest>) -> Json<HubMatchResponse> {
    let errors = validate_hub_match(
        &request.detected_hub_offices,
        &request.selected_hub_id,
        &request.hubs,
    );
    Json(HubMatchResponse::from(errors))
}
