//! # Pólizas - insurance policy spreadsheet validation
//!
//! Pólizas imports spreadsheets of insurance policies exported by brokers and
//! insurers, maps their columns onto a fixed set of 29 fields, flags rows with
//! missing data and exports the results as a two-sheet workbook.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ xlsx / csv  │────▶│   Parser    │────▶│  Resolver   │────▶│ Validation  │
//! │  (upload)   │     │ (auto-fmt)  │     │ (29 fields) │     │  (cascade)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    ▼
//!                     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//!                     │   Export    │◀────│    Edit     │◀────│   Session   │
//!                     │ (2 sheets)  │     │ (by id)     │     │  (wizard)   │
//!                     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use polizas::{import_file, write_workbook};
//!
//! let outcome = import_file("cartera.xlsx").unwrap();
//! println!("{} of {} records valid", outcome.summary.valid, outcome.summary.total);
//! let bytes = write_workbook(&outcome.records).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Field table, raw rows and policy records
//! - [`parser`] - Workbook and CSV reading with auto-detection
//! - [`transform`] - Column resolution and the import pipeline
//! - [`validation`] - Row status rules and summaries
//! - [`session`] - Wizard state and record edits
//! - [`export`] - Result partition and workbook writer
//! - [`config`] - Server settings
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Workflow
pub mod session;

// Export
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ExportError, PipelineError, ServerError, SheetError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CellValue,
    Field,
    FieldSpec,
    PolicyFields,
    PolicyRecord,
    RawRow,
    Section,
    ValidationStatus,
    FIELD_SPECS,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{parse_bytes, parse_file, ParseResult, SourceFormat};

// =============================================================================
// Re-exports - Resolver and pipeline
// =============================================================================

pub use transform::{
    import_bytes,
    import_file,
    import_rows,
    resolve,
    ColumnMapping,
    HeaderIndex,
    ImportOutcome,
    SourceInfo,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate, Validation, ValidationSummary};

// =============================================================================
// Re-exports - Session and export
// =============================================================================

pub use session::{update_record, Session, WizardStep};

pub use export::{export_file_name, export_file_name_today, partition, save_workbook, write_workbook, Partition};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::ServerConfig;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
