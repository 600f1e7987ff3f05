//! Workbook (xlsx, xls, xlsb, ods) reading through calamine.
//!
//! Only the first worksheet is read. Its first row is the header row.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::Timelike;
use std::io::Cursor;

use crate::error::{SheetError, SheetResult};
use crate::models::{CellValue, RawRow};

/// Rows and headers read from the first worksheet.
#[derive(Debug, Clone)]
pub struct WorkbookSheet {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Read the first worksheet of an in-memory workbook.
pub fn parse_workbook_bytes(bytes: &[u8]) -> SheetResult<WorkbookSheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SheetError::NoSheets)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoSheets)??;

    let (headers, rows) = range_to_rows(&range)?;
    Ok(WorkbookSheet {
        sheet_name,
        headers,
        rows,
    })
}

/// Convert a cell range to header list and raw rows.
///
/// Blank header cells drop their column; rows with only empty cells are
/// skipped.
pub fn range_to_rows(range: &Range<Data>) -> SheetResult<(Vec<String>, Vec<RawRow>)> {
    let mut rows_iter = range.rows();

    let header_row = rows_iter.next().ok_or(SheetError::NoHeaders)?;
    let columns: Vec<(usize, String)> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| (i, convert_cell(cell).to_text()))
        .filter(|(_, h)| !h.trim().is_empty())
        .collect();

    if columns.is_empty() {
        return Err(SheetError::NoHeaders);
    }

    let mut rows = Vec::new();
    for cells in rows_iter {
        let row: RawRow = columns
            .iter()
            .map(|(i, header)| {
                let value = cells.get(*i).map(convert_cell).unwrap_or(CellValue::Empty);
                (header.clone(), value)
            })
            .collect();

        if !row.is_blank() {
            rows.push(row);
        }
    }

    let headers = columns.into_iter().map(|(_, h)| h).collect();
    Ok((headers, rows))
}

/// Map a calamine cell to a [`CellValue`].
///
/// Date cells become ISO text so they read as dates in the record fields
/// instead of Excel serial numbers. Error cells count as empty.
pub fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => {
                let text = if naive.hour() == 0 && naive.minute() == 0 && naive.second() == 0 {
                    naive.format("%Y-%m-%d").to_string()
                } else {
                    naive.format("%Y-%m-%dT%H:%M:%S").to_string()
                };
                CellValue::Text(text)
            }
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    fn sample_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Pólizas").unwrap();
        sheet.write_string(0, 0, "Nombre").unwrap();
        sheet.write_string(0, 1, " rfc ").unwrap();
        sheet.write_string(0, 3, "Prima Neta").unwrap();
        sheet.write_string(0, 4, "Inicio Vigencia").unwrap();

        sheet.write_string(1, 0, "Ana").unwrap();
        sheet.write_string(1, 1, "ABC123").unwrap();
        sheet.write_string(1, 2, "orphan").unwrap();
        sheet.write_number(1, 3, 12500.0).unwrap();
        let date = ExcelDateTime::from_ymd(2024, 3, 1).unwrap();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        sheet.write_datetime_with_format(1, 4, &date, &date_format).unwrap();

        // Row 2 left blank on purpose; row 3 has data again.
        sheet.write_string(3, 0, "Luis").unwrap();

        let second = workbook.add_worksheet();
        second.write_string(0, 0, "Ignored").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_reads_first_sheet_only() {
        let sheet = parse_workbook_bytes(&sample_workbook()).unwrap();
        assert_eq!(sheet.sheet_name, "Pólizas");
        assert_eq!(sheet.headers, vec!["Nombre", " rfc ", "Prima Neta", "Inicio Vigencia"]);
    }

    #[test]
    fn test_blank_rows_skipped_and_cells_converted() {
        let sheet = parse_workbook_bytes(&sample_workbook()).unwrap();
        assert_eq!(sheet.rows.len(), 2);

        let first = sheet.rows[0].cells();
        assert_eq!(first.len(), 4);
        assert_eq!(first[0].1, CellValue::Text("Ana".into()));
        assert_eq!(first[2].1.to_text(), "12500");
        assert_eq!(first[3].1, CellValue::Text("2024-03-01".into()));

        let second = sheet.rows[1].cells();
        assert_eq!(second[0].1, CellValue::Text("Luis".into()));
        assert!(second[1].1.is_empty());
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let result = parse_workbook_bytes(b"PK\x03\x04 definitely not a zip archive");
        assert!(matches!(result, Err(SheetError::Workbook(_))));
    }

    #[test]
    fn test_convert_cell_variants() {
        assert_eq!(convert_cell(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(convert_cell(&Data::Bool(false)), CellValue::Bool(false));
        assert_eq!(
            convert_cell(&Data::DateTimeIso("2024-01-31".into())),
            CellValue::Text("2024-01-31".into())
        );
        assert!(convert_cell(&Data::Error(calamine::CellErrorType::NA)).is_empty());
    }
}
