//! Transformation module.
//!
//! - Resolver: header aliases to field values
//! - Pipeline: raw rows to validated policy records

pub mod pipeline;
pub mod resolver;

pub use pipeline::{build_record, import_bytes, import_file, import_parsed, import_rows, ImportOutcome, SourceInfo};
pub use resolver::{normalize_header, resolve, resolve_fields, ColumnMapping, HeaderIndex};
