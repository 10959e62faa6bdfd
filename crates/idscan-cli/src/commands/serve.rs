//! Serve command - HTTP upload API around the extraction pipeline.
//!
//! `POST /api/extract` takes a multipart form with a `file` field and
//! answers `{"success": true, "data": <report>}`. `GET /health` reports
//! whether the OCR binary can be started.

use std::io::Write;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Args;
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use idscan_core::models::config::IdscanConfig;
use idscan_core::ocr::TesseractEngine;
use idscan_core::{DocumentPipeline, Report};

use super::config::load_config;

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Maximum upload size in megabytes
    #[arg(long, default_value_t = 20)]
    max_upload_mb: usize,
}

#[derive(Clone)]
struct ApiState {
    config: Arc<IdscanConfig>,
    upload_dir: Arc<PathBuf>,
}

/// Successful extraction envelope.
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub data: Report,
}

/// Request-level failure (no file, unreadable form, internal fault).
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ocr_engine: String,
    pub ocr_available: bool,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

pub async fn run(args: ServeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let addr = SocketAddr::new(args.host, args.port);
    let app = router(config, std::env::temp_dir(), args.max_upload_mb * 1024 * 1024);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the API router. Uploads are staged in `upload_dir`.
pub fn router(config: IdscanConfig, upload_dir: PathBuf, max_upload_bytes: usize) -> Router {
    let state = ApiState {
        config: Arc::new(config),
        upload_dir: Arc::new(upload_dir),
    };

    Router::new()
        .route("/api/extract", post(extract_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn extract_handler(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        upload = Some((file_name, data));
    }

    let Some((file_name, data)) = upload else {
        return Err(ApiError::bad_request("No file uploaded"));
    };
    debug!(
        "Received upload {:?} ({} bytes)",
        file_name.as_deref().unwrap_or("<unnamed>"),
        data.len()
    );

    let report = tokio::task::spawn_blocking(move || {
        extract_upload(&state.config, &state.upload_dir, file_name.as_deref(), &data)
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string()))??;

    Ok(Json(ExtractResponse {
        success: true,
        data: report,
    }))
}

async fn health_handler(State(state): State<ApiState>) -> Json<HealthResponse> {
    let engine = TesseractEngine::from_config(&state.config.ocr);
    let ocr_available = tokio::task::spawn_blocking(move || engine.is_available())
        .await
        .unwrap_or(false);

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr_engine: format!("{:?}", state.config.ocr.engine).to_lowercase(),
        ocr_available,
    })
}

/// Stage the upload in `dir` and run the pipeline on it.
///
/// The staged file keeps the upload's extension and is removed when this
/// returns, whatever the outcome.
fn extract_upload(
    config: &IdscanConfig,
    dir: &Path,
    file_name: Option<&str>,
    data: &[u8],
) -> Result<Report, ApiError> {
    let suffix = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    let mut staged = tempfile::Builder::new()
        .prefix("idscan-upload-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| ApiError::internal(format!("failed to stage upload: {}", e)))?;
    staged
        .write_all(data)
        .and_then(|()| staged.flush())
        .map_err(|e| ApiError::internal(format!("failed to stage upload: {}", e)))?;

    Ok(DocumentPipeline::new(config.clone()).run(Some(staged.path())))
}
