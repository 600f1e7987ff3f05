//! Uploaded file reading.
//!
//! Turns raw bytes into an ordered list of [`RawRow`]s, each mapping the
//! header text to the cell below it. Workbooks (xlsx, xls, ods) are detected
//! by their container signature; anything else is read as delimited text.
//! No policy-specific logic lives here.

pub mod delimited;
pub mod workbook;

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::error::{SheetError, SheetResult};
use crate::models::RawRow;

pub use delimited::{decode_content, detect_delimiter, detect_encoding, parse_delimited_bytes};
pub use workbook::parse_workbook_bytes;

/// ZIP local file header: xlsx, xlsm, xlsb and ods.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// OLE compound document: legacy xls.
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Container format of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Workbook,
    Delimited,
}

impl SourceFormat {
    /// Sniff the format from the leading bytes.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            SourceFormat::Workbook
        } else {
            SourceFormat::Delimited
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Workbook => f.write_str("workbook"),
            SourceFormat::Delimited => f.write_str("delimited text"),
        }
    }
}

/// Result of reading a file, with metadata about what was read.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Data rows in file order.
    pub rows: Vec<RawRow>,
    /// Header cells as written in the file (blank headers dropped).
    pub headers: Vec<String>,
    pub format: SourceFormat,
    /// Worksheet name, for workbooks.
    pub sheet_name: Option<String>,
    /// Detected encoding, for delimited text.
    pub encoding: Option<String>,
    /// Detected delimiter, for delimited text.
    pub delimiter: Option<char>,
}

/// Read uploaded bytes.
pub fn parse_bytes(bytes: &[u8]) -> SheetResult<ParseResult> {
    if bytes.is_empty() {
        return Err(SheetError::EmptyFile);
    }

    match SourceFormat::detect(bytes) {
        SourceFormat::Workbook => {
            let sheet = parse_workbook_bytes(bytes)?;
            Ok(ParseResult {
                rows: sheet.rows,
                headers: sheet.headers,
                format: SourceFormat::Workbook,
                sheet_name: Some(sheet.sheet_name),
                encoding: None,
                delimiter: None,
            })
        }
        SourceFormat::Delimited => {
            let sheet = parse_delimited_bytes(bytes)?;
            Ok(ParseResult {
                rows: sheet.rows,
                headers: sheet.headers,
                format: SourceFormat::Delimited,
                sheet_name: None,
                encoding: Some(sheet.encoding),
                delimiter: Some(sheet.delimiter),
            })
        }
    }
}

/// Read a file from disk.
pub fn parse_file<P: AsRef<Path>>(path: P) -> SheetResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(SourceFormat::detect(b"PK\x03\x04rest"), SourceFormat::Workbook);
        assert_eq!(SourceFormat::detect(OLE_MAGIC), SourceFormat::Workbook);
        assert_eq!(SourceFormat::detect(b"Nombre;RFC\n"), SourceFormat::Delimited);
    }

    #[test]
    fn test_empty_bytes() {
        assert!(matches!(parse_bytes(b""), Err(SheetError::EmptyFile)));
    }

    #[test]
    fn test_delimited_metadata() {
        let result = parse_bytes("Nombre;RFC\nAna;ABC123".as_bytes()).unwrap();
        assert_eq!(result.format, SourceFormat::Delimited);
        assert_eq!(result.delimiter, Some(';'));
        assert_eq!(result.encoding.as_deref(), Some("utf-8"));
        assert!(result.sheet_name.is_none());
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn test_parse_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polizas.csv");
        std::fs::write(&path, "Nombre,RFC\nAna,ABC123\n").unwrap();

        let result = parse_file(&path).unwrap();
        assert_eq!(result.headers, vec!["Nombre", "RFC"]);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(parse_file("/nonexistent/polizas.xlsx"), Err(SheetError::Io(_))));
    }
}
