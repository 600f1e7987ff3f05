//! Import pipeline: uploaded bytes to validated policy records.
//!
//! ```text
//! bytes ──▶ parser ──▶ RawRow[] ──▶ resolver (29 fields) ──▶ validator ──▶ PolicyRecord[]
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use polizas::transform::pipeline::import_file;
//!
//! let outcome = import_file("polizas.xlsx")?;
//! println!("{} valid of {}", outcome.summary.valid, outcome.summary.total);
//! ```

use serde::Serialize;
use std::path::Path;

use super::resolver::{ColumnMapping, HeaderIndex};
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning, log_warning_indent};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{PolicyRecord, RawRow};
use crate::parser::{parse_bytes, parse_file, ParseResult, SourceFormat};
use crate::validation::{validate, ValidationSummary};

/// Metadata about the imported file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub file_name: Option<String>,
    pub format: SourceFormat,
    pub sheet_name: Option<String>,
    pub encoding: Option<String>,
    pub delimiter: Option<String>,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl SourceInfo {
    fn from_parse(parse: &ParseResult, file_name: Option<&str>) -> Self {
        Self {
            file_name: file_name.map(String::from),
            format: parse.format,
            sheet_name: parse.sheet_name.clone(),
            encoding: parse.encoding.clone(),
            delimiter: parse.delimiter.map(format_delimiter),
            headers: parse.headers.clone(),
            row_count: parse.rows.len(),
        }
    }
}

/// Everything an import produces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub records: Vec<PolicyRecord>,
    pub summary: ValidationSummary,
    pub source: SourceInfo,
    pub mapping: ColumnMapping,
}

/// Build one record per row, in input order, with ids `1..=N`.
pub fn import_rows(rows: &[RawRow]) -> Vec<PolicyRecord> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| build_record(i as u32 + 1, row))
        .collect()
}

/// Resolve, validate and assemble one record.
pub fn build_record(id: u32, row: &RawRow) -> PolicyRecord {
    let fields = HeaderIndex::new(row).resolve_fields();
    let validation = validate(&fields);

    PolicyRecord {
        id,
        fields,
        validation_status: validation.status,
        validation_message: validation.message,
    }
}

/// Import uploaded bytes.
pub fn import_bytes(bytes: &[u8], file_name: Option<&str>) -> PipelineResult<ImportOutcome> {
    log_info(format!(
        "📖 Reading {} ({} bytes)...",
        file_name.unwrap_or("upload"),
        bytes.len()
    ));
    let parse = parse_bytes(bytes)?;
    import_parsed(parse, file_name)
}

/// Import a file from disk.
pub fn import_file<P: AsRef<Path>>(path: P) -> PipelineResult<ImportOutcome> {
    let path = path.as_ref();
    log_info(format!("📖 Reading {}...", path.display()));

    let parse = parse_file(path)?;
    let file_name = path.file_name().and_then(|s| s.to_str());
    import_parsed(parse, file_name)
}

/// Import already-parsed rows.
pub fn import_parsed(parse: ParseResult, file_name: Option<&str>) -> PipelineResult<ImportOutcome> {
    report_source(&parse);

    if parse.rows.is_empty() {
        log_warning("No data rows below the header row");
        return Err(PipelineError::EmptyInput);
    }

    let mapping = ColumnMapping::from_headers(&parse.headers);
    report_mapping(&mapping);

    log_info("✔️  Validating records...");
    let records = import_rows(&parse.rows);
    let summary = ValidationSummary::from_records(&records);
    report_summary(&summary);

    Ok(ImportOutcome {
        source: SourceInfo::from_parse(&parse, file_name),
        records,
        summary,
        mapping,
    })
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

fn report_source(parse: &ParseResult) {
    match parse.format {
        SourceFormat::Workbook => {
            log_success(format!(
                "Workbook sheet: {}",
                parse.sheet_name.as_deref().unwrap_or("?")
            ));
        }
        SourceFormat::Delimited => {
            log_success(format!(
                "Delimited text, encoding {}, separator '{}'",
                parse.encoding.as_deref().unwrap_or("?"),
                parse.delimiter.map(format_delimiter).unwrap_or_default()
            ));
        }
    }
    log_success(format!("Read {} rows, {} columns", parse.rows.len(), parse.headers.len()));
}

fn report_mapping(mapping: &ColumnMapping) {
    log_info(format!("🗺️  Column mapping ({} of 29 fields found):", mapping.matched.len()));
    for (field, header) in &mapping.matched {
        log_info_indent(format!("{} → {}", header.trim(), field.key()), 1);
    }
    if !mapping.missing.is_empty() {
        let keys: Vec<&str> = mapping.missing.iter().map(|f| f.key()).collect();
        log_warning_indent(format!("No column for: {}", keys.join(", ")), 1);
    }
    if !mapping.unrecognized.is_empty() {
        log_warning_indent(format!("Ignored columns: {}", mapping.unrecognized.join(", ")), 1);
    }
}

fn report_summary(summary: &ValidationSummary) {
    if summary.flagged() == 0 {
        log_success(format!("All {} records valid!", summary.total));
    } else {
        log_success(format!("Valid: {}", summary.valid));
        log_warning(format!("Warnings: {}", summary.warnings));
        log_warning(format!("Errors: {}", summary.errors));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetError;
    use crate::models::{CellValue, ValidationStatus};
    use crate::validation::{MISSING_MANDATORY_MESSAGE, MISSING_RECOMMENDED_MESSAGE};
    use rust_xlsxwriter::Workbook;

    #[test]
    fn test_ids_dense_and_order_preserved() {
        let rows: Vec<RawRow> = ["A", "B", "C", "D"]
            .iter()
            .map(|n| RawRow::new().with("Nombre", *n))
            .collect();

        let records = import_rows(&rows);
        let ids: Vec<u32> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        let names: Vec<&str> = records.iter().map(|r| r.fields.nombre.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_missing_recommended_columns_warn() {
        let row = RawRow::new()
            .with("Nombre", "Ana")
            .with("RFC", "ABC123")
            .with("N° de Póliza", "P1");

        let record = build_record(1, &row);
        assert_eq!(record.validation_status, ValidationStatus::Warning);
        assert_eq!(record.validation_message.as_deref(), Some(MISSING_RECOMMENDED_MESSAGE));
    }

    #[test]
    fn test_blank_rfc_is_error_whatever_else() {
        let row = RawRow::new()
            .with("Nombre", "Ana")
            .with("RFC", "   ")
            .with("N° de Póliza", "P1")
            .with("Correo", "ana@example.com")
            .with("Aseguradora", "GNP");

        let record = build_record(1, &row);
        assert_eq!(record.validation_status, ValidationStatus::Error);
        assert_eq!(record.validation_message.as_deref(), Some(MISSING_MANDATORY_MESSAGE));
    }

    #[test]
    fn test_spaced_lowercase_header_resolves() {
        let row = RawRow::new()
            .with("Nombre", "Ana")
            .with(" rfc ", "ABC123")
            .with("Póliza", "P1")
            .with("Email", "ana@example.com")
            .with("Aseguradora", "GNP");

        let record = build_record(1, &row);
        assert_eq!(record.fields.rfc, "ABC123");
        assert_eq!(record.validation_status, ValidationStatus::Valid);
        assert!(record.validation_message.is_none());
    }

    #[test]
    fn test_import_csv_bytes() {
        let csv = "Nombre;RFC;N° de Póliza;Correo;Aseguradora;Sucursal\n\
                   Ana;ABC123;P1;ana@example.com;GNP;Centro\n\
                   Luis;;P2;luis@example.com;AXA;Norte\n";

        let outcome = import_bytes(csv.as_bytes(), Some("polizas.csv")).unwrap();
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.summary.valid, 1);
        assert_eq!(outcome.summary.errors, 1);
        assert_eq!(outcome.source.delimiter.as_deref(), Some(";"));
        assert_eq!(outcome.source.file_name.as_deref(), Some("polizas.csv"));
        assert_eq!(outcome.mapping.unrecognized, vec!["Sucursal".to_string()]);
    }

    #[test]
    fn test_import_workbook_bytes() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["Nombre", "RFC", "Número de Póliza", "Correo"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_string(1, 0, "Ana").unwrap();
        sheet.write_string(1, 1, "ABC123").unwrap();
        sheet.write_number(1, 2, 778899.0).unwrap();
        sheet.write_string(1, 3, "ana@example.com").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let outcome = import_bytes(&bytes, Some("polizas.xlsx")).unwrap();
        assert_eq!(outcome.source.format, SourceFormat::Workbook);
        assert_eq!(outcome.records[0].fields.numero_poliza, "778899");
        // No insurer column.
        assert_eq!(outcome.records[0].validation_status, ValidationStatus::Warning);
    }

    #[test]
    fn test_header_only_file_is_rejected() {
        let result = import_bytes(b"Nombre,RFC\n", None);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn test_unreadable_workbook_is_rejected() {
        let result = import_bytes(b"PK\x03\x04garbage", None);
        assert!(matches!(result, Err(PipelineError::Sheet(SheetError::Workbook(_)))));
    }

    #[test]
    fn test_import_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cartera.csv");
        std::fs::write(&path, "Nombre,RFC,Poliza\nAna,ABC123,P1\n").unwrap();

        let outcome = import_file(&path).unwrap();
        assert_eq!(outcome.source.file_name.as_deref(), Some("cartera.csv"));
        assert_eq!(outcome.records[0].fields.numero_poliza, "P1");
    }

    #[test]
    fn test_empty_cells_never_null() {
        let row = RawRow::new().with("Nombre", CellValue::Empty);
        let record = build_record(1, &row);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["nombre"], "");
        assert_eq!(json["telefono"], "");
    }
}
