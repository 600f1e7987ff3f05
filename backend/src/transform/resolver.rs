//! Column resolution: find the cell for a field among arbitrary headers.
//!
//! Headers and aliases compare after trimming surrounding whitespace and
//! lower-casing. Aliases are tried in order; within one alias, columns are
//! tried left to right, and the first non-empty cell wins. A field with no
//! matching cell resolves to the empty string.

use std::collections::HashMap;

use crate::models::{Field, PolicyFields, RawRow};

/// Normalized form used for header/alias comparison.
pub fn normalize_header(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Normalized header text to column positions (left to right), built once
/// per row.
#[derive(Debug)]
pub struct HeaderIndex<'a> {
    row: &'a RawRow,
    positions: HashMap<String, Vec<usize>>,
}

impl<'a> HeaderIndex<'a> {
    pub fn new(row: &'a RawRow) -> Self {
        let mut positions: HashMap<String, Vec<usize>> = HashMap::with_capacity(row.len());
        for (i, (header, _)) in row.cells().iter().enumerate() {
            positions.entry(normalize_header(header)).or_default().push(i);
        }
        Self { row, positions }
    }

    /// Trimmed text of the first alias that has a non-empty cell, or `""`.
    pub fn resolve(&self, aliases: &[&str]) -> String {
        self.matching_column(aliases)
            .map(|i| self.row.cells()[i].1.to_text().trim().to_string())
            .unwrap_or_default()
    }

    /// Position of the column [`HeaderIndex::resolve`] would read.
    pub fn matching_column(&self, aliases: &[&str]) -> Option<usize> {
        debug_assert!(!aliases.is_empty(), "alias list must not be empty");

        aliases.iter().find_map(|alias| {
            self.positions
                .get(&normalize_header(alias))?
                .iter()
                .copied()
                .find(|&i| !self.row.cells()[i].1.is_empty())
        })
    }

    /// Resolve all 29 fields.
    pub fn resolve_fields(&self) -> PolicyFields {
        let mut fields = PolicyFields::default();
        for field in Field::ALL {
            fields.set(field, self.resolve(field.aliases()));
        }
        fields
    }
}

/// Resolve one field value from a row. See [`HeaderIndex::resolve`].
pub fn resolve(row: &RawRow, aliases: &[&str]) -> String {
    HeaderIndex::new(row).resolve(aliases)
}

/// Resolve every field of a row.
pub fn resolve_fields(row: &RawRow) -> PolicyFields {
    HeaderIndex::new(row).resolve_fields()
}

// =============================================================================
// Column mapping report
// =============================================================================

/// Which header each field is read from, given a header row.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    /// Field key and the header it resolves from.
    pub matched: Vec<(Field, String)>,
    /// Fields with no matching header.
    pub missing: Vec<Field>,
    /// Headers no field uses.
    pub unrecognized: Vec<String>,
}

impl ColumnMapping {
    /// Match a header row against the field table, alias priority first.
    ///
    /// Cell values are not consulted, so a field whose preferred column is
    /// empty in some rows may still read from a lower-priority alias there.
    pub fn from_headers(headers: &[String]) -> Self {
        let mut mapping = ColumnMapping::default();
        let mut used = vec![false; headers.len()];

        for field in Field::ALL {
            let hit = field.aliases().iter().find_map(|alias| {
                let wanted = normalize_header(alias);
                headers.iter().position(|h| normalize_header(h) == wanted)
            });
            match hit {
                Some(i) => {
                    used[i] = true;
                    mapping.matched.push((field, headers[i].clone()));
                }
                None => mapping.missing.push(field),
            }
        }

        mapping.unrecognized = headers
            .iter()
            .zip(used)
            .filter(|(_, used)| !used)
            .map(|(h, _)| h.clone())
            .collect();

        mapping
    }

    pub fn header_for(&self, field: Field) -> Option<&str> {
        self.matched
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, h)| h.as_str())
    }
}
