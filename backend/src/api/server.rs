//! HTTP Server for the policy validation wizard.
//!
//! # API Endpoints
//!
//! | Method | Path                | Description                          |
//! |--------|---------------------|--------------------------------------|
//! | GET    | `/health`           | Health check                         |
//! | GET    | `/api/fields`       | Field table for the edit form        |
//! | POST   | `/api/upload`       | Upload a spreadsheet and validate it |
//! | GET    | `/api/session`      | Wizard step and counts               |
//! | GET    | `/api/records`      | All records                          |
//! | GET    | `/api/records/{id}` | One record                           |
//! | PUT    | `/api/records/{id}` | Replace one record                   |
//! | GET    | `/api/export`       | Download the result workbook         |
//! | POST   | `/api/restart`      | Back to the upload step              |
//! | GET    | `/api/logs`         | SSE stream for real-time logs        |

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, log_success, LOG_BROADCASTER};
use super::types::{
    FieldsResponse, RecordsResponse, SessionResponse, UpdateResponse, UploadResponse,
};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::export::{export_file_name_today, write_workbook};
use crate::models::PolicyRecord;
use crate::session::Session;
use crate::transform::pipeline::import_bytes;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::new())),
            config,
        }
    }
}

/// Build the router with all routes and layers.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/fields", get(list_fields))
        .route("/api/upload", post(upload_file))
        .route("/api/session", get(session_state))
        .route("/api/records", get(list_records))
        .route("/api/records/{id}", get(get_record).put(put_record))
        .route("/api/export", get(export_records))
        .route("/api/restart", post(restart))
        .route("/api/logs", get(sse_logs))
        .layer(body_limit)
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.socket_addr();
    let app = build_router(AppState::new(config));

    println!("🚀 Pólizas server running on http://{}", addr);
    println!("   POST /api/upload       - Upload spreadsheet");
    println!("   GET  /api/records      - List records");
    println!("   PUT  /api/records/{{id}} - Edit a record");
    println!("   GET  /api/export       - Download results");
    println!("   GET  /api/logs         - SSE log stream");
    println!("   GET  /health           - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "polizas",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "records": "GET /api/records",
            "export": "GET /api/export",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn list_fields() -> Json<FieldsResponse> {
    Json(FieldsResponse::build())
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

/// Upload endpoint: multipart field `file`.
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".into()))?;
    import_upload(&state, &bytes, file_name.as_deref()).await.map(Json)
}

/// Import bytes and install the result. A failed import leaves the session as it was.
async fn import_upload(
    state: &AppState,
    bytes: &[u8],
    file_name: Option<&str>,
) -> ServerResult<UploadResponse> {
    println!("\n{}", "=".repeat(70));
    println!(
        "📄 NEW UPLOAD: {} ({} bytes)",
        file_name.unwrap_or("unknown"),
        bytes.len()
    );
    println!("{}\n", "=".repeat(70));

    let outcome = import_bytes(bytes, file_name).map_err(|e| {
        log_error(format!("Import failed: {}", e));
        ServerError::from(e)
    })?;

    let response_outcome = outcome.clone();
    let import_id = state.session.write().await.install(outcome);
    log_success(format!("Import {} ready", import_id));

    Ok(UploadResponse::new(import_id, response_outcome))
}

async fn session_state(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.session.read().await;
    Json(SessionResponse::from(&*session))
}

async fn list_records(State(state): State<AppState>) -> Json<RecordsResponse> {
    let records = state.session.read().await.records();
    Json(RecordsResponse::new(&records))
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ServerResult<Json<PolicyRecord>> {
    let session = state.session.read().await;
    session
        .record(id)
        .cloned()
        .map(Json)
        .ok_or(ServerError::RecordNotFound(id))
}

/// Store an edited record as sent; its status is kept, not recomputed.
async fn put_record(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(record): Json<PolicyRecord>,
) -> ServerResult<Json<UpdateResponse>> {
    if record.id != id {
        return Err(ServerError::BadRequest(format!(
            "Record id {} does not match path id {}",
            record.id, id
        )));
    }

    let mut session = state.session.write().await;
    let updated = session.update(record);
    if updated {
        log_info(format!("✏️  Record {} edited", id));
    }

    Ok(Json(UpdateResponse {
        updated,
        record: session.record(id).cloned(),
        summary: session.summary(),
    }))
}

async fn export_records(State(state): State<AppState>) -> ServerResult<Response> {
    let records = state.session.read().await.records();
    let bytes = write_workbook(&records)?;
    let file_name = export_file_name_today();

    state.session.write().await.mark_exported();
    log_success(format!("📦 Exported {} records to {}", records.len(), file_name));

    let headers = [
        (header::CONTENT_TYPE, XLSX_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];
    Ok((headers, bytes).into_response())
}

async fn restart(State(state): State<AppState>) -> Json<SessionResponse> {
    let mut session = state.session.write().await;
    session.restart();
    Json(SessionResponse::from(&*session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::models::{Field, ValidationStatus};
    use crate::session::WizardStep;
    use axum::http::StatusCode;

    const CSV: &str = "Nombre,RFC,N° de Póliza,Correo,Aseguradora\n\
                       Ana,ABC123,P1,ana@example.com,GNP\n\
                       Luis,XYZ987,P2,,AXA\n\
                       Eva,,P3,eva@example.com,Qualitas\n";

    async fn loaded_state() -> AppState {
        let state = AppState::new(ServerConfig::default());
        import_upload(&state, CSV.as_bytes(), Some("cartera.csv"))
            .await
            .unwrap();
        state
    }

    #[tokio::test]
    async fn test_upload_installs_records() {
        let state = loaded_state().await;
        let session = state.session.read().await;
        assert_eq!(session.step(), WizardStep::Validate);
        assert_eq!(session.records().len(), 3);

        let summary = session.summary();
        assert_eq!((summary.valid, summary.warnings, summary.errors), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_session() {
        let state = loaded_state().await;
        let err = import_upload(&state, b"Nombre,RFC\n", None).await.unwrap_err();
        assert!(matches!(err, ServerError::Import(PipelineError::EmptyInput)));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.session.read().await.records().len(), 3);
    }

    #[tokio::test]
    async fn test_get_unknown_record_is_404() {
        let state = loaded_state().await;
        let err = get_record(State(state), Path(99)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_record_replaces_verbatim() {
        let state = loaded_state().await;
        let Json(mut record) = get_record(State(state.clone()), Path(2)).await.unwrap();
        record.fields.set(Field::Correo, "luis@example.com");

        let Json(response) = put_record(State(state.clone()), Path(2), Json(record))
            .await
            .unwrap();
        assert!(response.updated);
        let stored = response.record.unwrap();
        assert_eq!(stored.fields.correo, "luis@example.com");
        assert_eq!(stored.validation_status, ValidationStatus::Warning);
        assert_eq!(state.session.read().await.step(), WizardStep::Correct);
    }

    #[tokio::test]
    async fn test_put_record_id_mismatch() {
        let state = loaded_state().await;
        let Json(record) = get_record(State(state.clone()), Path(1)).await.unwrap();
        let err = put_record(State(state), Path(2), Json(record)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_put_unknown_record_not_updated() {
        let state = loaded_state().await;
        let Json(mut record) = get_record(State(state.clone()), Path(1)).await.unwrap();
        record.id = 50;
        let Json(response) = put_record(State(state), Path(50), Json(record)).await.unwrap();
        assert!(!response.updated);
        assert!(response.record.is_none());
    }

    #[tokio::test]
    async fn test_export_download() {
        let state = loaded_state().await;
        let response = export_records(State(state.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_MIME);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.contains("validacion_polizas_"));
        assert_eq!(state.session.read().await.step(), WizardStep::Confirm);
    }

    #[tokio::test]
    async fn test_export_empty_session_conflicts() {
        let state = AppState::new(ServerConfig::default());
        let err = export_records(State(state)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_restart_keeps_records() {
        let state = loaded_state().await;
        let Json(response) = restart(State(state.clone())).await;
        assert_eq!(response.current.number, 1);
        assert_eq!(response.summary.total, 3);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }
}
