//! Error types for the policy import pipeline.
//!
//! - [`SheetError`] - reading spreadsheet or CSV bytes
//! - [`ExportError`] - writing the result workbook
//! - [`PipelineError`] - import orchestration
//! - [`ServerError`] - HTTP layer, mapped to status codes
//!
//! Row-level `warning`/`error` outcomes are not errors; they travel as
//! [`crate::models::ValidationStatus`] values on each record.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::types::error_response;

// =============================================================================
// Reading Errors
// =============================================================================

/// Errors while turning uploaded bytes into raw rows.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing was uploaded.
    #[error("File is empty")]
    EmptyFile,

    /// The workbook container could not be opened or decoded.
    #[error("Invalid workbook: {0}")]
    Workbook(String),

    /// The workbook has no worksheet to read.
    #[error("Workbook contains no sheets")]
    NoSheets,

    /// The first row carries no usable header text.
    #[error("No header row found")]
    NoHeaders,

    /// Text content could not be decoded.
    #[error("Failed to decode text: {0}")]
    Encoding(String),

    /// Delimited text is malformed.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl From<calamine::Error> for SheetError {
    fn from(err: calamine::Error) -> Self {
        SheetError::Workbook(err.to_string())
    }
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while producing the result workbook.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No records were loaded.
    #[error("There are no records to export")]
    NothingToExport,

    /// Workbook writer failure.
    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Failed to save the file.
    #[error("Failed to save file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors
// =============================================================================

/// Import orchestration errors.
///
/// Any of these leaves the current session untouched.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading error.
    #[error("Read error: {0}")]
    Sheet(#[from] SheetError),

    /// Header row present but no data rows.
    #[error("The file contains no records")]
    EmptyInput,
}

// =============================================================================
// Server Errors
// =============================================================================

/// Title shown to the user when an upload cannot be imported.
pub const IMPORT_FAILURE_TITLE: &str = "Error al procesar el archivo";

/// Hint shown to the user when an upload cannot be imported.
pub const IMPORT_FAILURE_DETAIL: &str = "Verifica que el archivo tenga el formato correcto";

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The uploaded file could not be imported.
    #[error("Import failed: {0}")]
    Import(#[from] PipelineError),

    /// Export failed.
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    /// No record with that id.
    #[error("Record {0} not found")]
    RecordNotFound(u32),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Status code sent for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Import(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Export(ExportError::NothingToExport) => StatusCode::CONFLICT,
            ServerError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = match &self {
            ServerError::Import(e) => {
                error_response(IMPORT_FAILURE_TITLE, &format!("{}. {}", IMPORT_FAILURE_DETAIL, e))
            }
            other => error_response(&other.to_string(), ""),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for reading operations.
pub type SheetResult<T> = Result<T, SheetError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for import operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let sheet_err = SheetError::NoSheets;
        let pipeline_err: PipelineError = sheet_err.into();
        assert!(pipeline_err.to_string().contains("no sheets"));

        let server_err: ServerError = pipeline_err.into();
        assert_eq!(server_err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_server_status_codes() {
        assert_eq!(
            ServerError::Export(ExportError::NothingToExport).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ServerError::RecordNotFound(7).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServerError::BadRequest("id".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_record_not_found_message() {
        let msg = ServerError::RecordNotFound(42).to_string();
        assert!(msg.contains("42"));
    }
}
