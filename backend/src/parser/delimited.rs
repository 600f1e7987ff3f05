//! Delimited text (CSV/TSV) reading with encoding and delimiter auto-detection.
//!
//! Spreadsheet exports from Mexican CRMs and insurers often arrive as
//! Windows-1252 or ISO-8859-1 text with `;` separators, so both are sniffed
//! before parsing.

use crate::error::{SheetError, SheetResult};
use crate::models::{CellValue, RawRow};

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is taken as such; otherwise chardet decides.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding label.
///
/// Unknown labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);

    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Pick the delimiter that occurs most often in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for sep in [',', ';', '\t', '|'] {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Rows and headers read from delimited text.
#[derive(Debug, Clone)]
pub struct DelimitedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub encoding: String,
    pub delimiter: char,
}

/// Parse raw bytes, detecting encoding and delimiter.
pub fn parse_delimited_bytes(bytes: &[u8]) -> SheetResult<DelimitedSheet> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    let (headers, rows) = parse_delimited_str(&content, delimiter)?;
    Ok(DelimitedSheet {
        headers,
        rows,
        encoding,
        delimiter,
    })
}

/// Parse decoded text with an explicit delimiter.
///
/// Blank header cells drop their column; blank lines are skipped; short
/// lines leave the trailing columns empty.
pub fn parse_delimited_str(content: &str, delimiter: char) -> SheetResult<(Vec<String>, Vec<RawRow>)> {
    if content.trim().is_empty() {
        return Err(SheetError::EmptyFile);
    }

    let delimiter = u8::try_from(delimiter)
        .map_err(|_| SheetError::Encoding(format!("unsupported delimiter '{}'", delimiter)))?;

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let header_record = match records.next() {
        Some(r) => r?,
        None => return Err(SheetError::NoHeaders),
    };

    let columns: Vec<(usize, String)> = header_record
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.trim().is_empty())
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    if columns.is_empty() {
        return Err(SheetError::NoHeaders);
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record?;

        let row: RawRow = columns
            .iter()
            .map(|(i, header)| {
                let value = match record.get(*i) {
                    Some(v) if !v.is_empty() => CellValue::Text(v.to_string()),
                    _ => CellValue::Empty,
                };
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
