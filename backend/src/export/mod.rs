//! Result export: split records by status and write them as one workbook.
//!
//! | Sheet                   | Rows                    | Columns               |
//! |-------------------------|-------------------------|-----------------------|
//! | `Registros Válidos`     | status `valid`          | 29 field keys         |
//! | `Registros con Errores` | status `warning`/`error`| 29 field keys + Error |
//!
//! A group with no rows produces no sheet. Record ids and statuses are not
//! exported.

use chrono::{Local, NaiveDate};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

use crate::config::EXPORT_FILE_STEM;
use crate::error::{ExportError, ExportResult};
use crate::models::{Field, PolicyFields, PolicyRecord};

pub const VALID_SHEET_NAME: &str = "Registros Válidos";

pub const INVALID_SHEET_NAME: &str = "Registros con Errores";

/// Header of the message column on the invalid sheet.
pub const ERROR_COLUMN: &str = "Error";

/// A flagged record as exported: its fields and the validation message.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedRow {
    pub fields: PolicyFields,
    pub error: String,
}

/// Records split by status, each group in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub valid: Vec<PolicyFields>,
    pub invalid: Vec<FlaggedRow>,
}

/// Split records into the valid group and the warning/error group.
pub fn partition(records: &[PolicyRecord]) -> Partition {
    let mut out = Partition::default();
    for record in records {
        if record.validation_status.is_valid() {
            out.valid.push(record.fields.clone());
        } else {
            out.invalid.push(FlaggedRow {
                fields: record.fields.clone(),
                error: record.validation_message.clone().unwrap_or_default(),
            });
        }
    }
    out
}

/// A sheet ready to be written: name, header row, data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSheet {
    pub name: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One sheet per non-empty group, valid first.
    pub fn sheets(&self) -> Vec<ExportSheet> {
        let mut sheets = Vec::with_capacity(2);
        let field_headers: Vec<&'static str> = Field::ALL.iter().map(|f| f.key()).collect();

        if !self.valid.is_empty() {
            sheets.push(ExportSheet {
                name: VALID_SHEET_NAME,
                headers: field_headers.clone(),
                rows: self.valid.iter().map(row_values).collect(),
            });
        }

        if !self.invalid.is_empty() {
            let mut headers = field_headers;
            headers.push(ERROR_COLUMN);
            sheets.push(ExportSheet {
                name: INVALID_SHEET_NAME,
                headers,
                rows: self
                    .invalid
                    .iter()
                    .map(|r| {
                        let mut values = row_values(&r.fields);
                        values.push(r.error.clone());
                        values
                    })
                    .collect(),
            });
        }

        sheets
    }
}

fn row_values(fields: &PolicyFields) -> Vec<String> {
    fields.values().map(String::from).collect()
}

/// Write records to an in-memory xlsx workbook.
pub fn write_workbook(records: &[PolicyRecord]) -> ExportResult<Vec<u8>> {
    let sheets = partition(records).sheets();
    if sheets.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for sheet in &sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name)?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }
        for (i, values) in sheet.rows.iter().enumerate() {
            let row = (i + 1) as u32;
            for (col, value) in values.iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(row, col as u16, value)?;
                }
            }
        }
        worksheet.set_freeze_panes(1, 0)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Write records to an xlsx file on disk.
pub fn save_workbook<P: AsRef<Path>>(records: &[PolicyRecord], path: P) -> ExportResult<()> {
    let bytes = write_workbook(records)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Download name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}_{}.xlsx", EXPORT_FILE_STEM, date.format("%Y-%m-%d"))
}

/// Download name for an export made today (local time).
pub fn export_file_name_today() -> String {
    export_file_name(Local::now().date_naive())
}
