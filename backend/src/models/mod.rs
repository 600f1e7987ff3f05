//! Domain models for the policy import pipeline.
//!
//! - [`RawRow`] - one spreadsheet row, header text to cell value
//! - [`CellValue`] - a single cell as read from the file
//! - [`PolicyFields`] - the 29 resolved business fields
//! - [`PolicyRecord`] - fields plus id and validation outcome
//! - [`ValidationStatus`] - `valid`, `warning` or `error`
//! - [`fields`] - the field table and header aliases

pub mod fields;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use fields::{Field, FieldSpec, Section, FIELD_SPECS, MANDATORY_FIELDS, RECOMMENDED_FIELDS};

// =============================================================================
// Raw input
// =============================================================================

/// A cell value as produced by the spreadsheet reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl CellValue {
    /// True for cells that count as missing (no value at all).
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// String representation used when a cell is resolved into a field.
    ///
    /// Integral numbers print without a fractional part.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One data row: header text exactly as it appears in the file, paired with
/// the cell below it. Column order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn push(&mut self, header: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.push((header.into(), value.into()));
    }

    /// Builder form of [`RawRow::push`].
    pub fn with(mut self, header: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.push(header, value);
        self
    }

    pub fn cells(&self) -> &[(String, CellValue)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is empty or blank text.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| match v {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        })
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// =============================================================================
// Validation status
// =============================================================================

/// Outcome of the row validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Warning,
    Error,
}

impl ValidationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationStatus::Valid)
    }

    /// Badge text shown in the results table.
    pub fn label(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "Válido",
            ValidationStatus::Warning => "Advertencia",
            ValidationStatus::Error => "Error",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Warning => "warning",
            ValidationStatus::Error => "error",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Policy fields
// =============================================================================

/// The 29 business fields of a policy. An unresolved field is the empty
/// string, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyFields {
    // Personal
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
    pub rfc: String,
    pub genero: String,
    pub correo: String,
    pub telefono: String,
    // Policy
    pub numero_poliza: String,
    pub aseguradora: String,
    pub ramo: String,
    pub sub_ramo: String,
    pub producto: String,
    pub plan: String,
    // Dates
    pub inicio_vigencia: String,
    pub fin_vigencia: String,
    pub fecha_emision: String,
    pub fecha_ultimo_pago: String,
    // Financial
    pub prima_neta: String,
    pub recargo: String,
    pub derecho_poliza: String,
    pub iva: String,
    pub porcentaje_iva: String,
    pub monto_prima_anual: String,
    // Other
    pub temporalidad: String,
    pub dia_compromiso_pago: String,
    pub moneda: String,
    pub forma_pago: String,
    pub metodo_pago: String,
    pub forma_pago_derecho_poliza: String,
}

impl PolicyFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Nombre => &self.nombre,
            Field::ApellidoPaterno => &self.apellido_paterno,
            Field::ApellidoMaterno => &self.apellido_materno,
            Field::Rfc => &self.rfc,
            Field::Genero => &self.genero,
            Field::Correo => &self.correo,
            Field::Telefono => &self.telefono,
            Field::NumeroPoliza => &self.numero_poliza,
            Field::Aseguradora => &self.aseguradora,
            Field::Ramo => &self.ramo,
            Field::SubRamo => &self.sub_ramo,
            Field::Producto => &self.producto,
            Field::Plan => &self.plan,
            Field::InicioVigencia => &self.inicio_vigencia,
            Field::FinVigencia => &self.fin_vigencia,
            Field::FechaEmision => &self.fecha_emision,
            Field::FechaUltimoPago => &self.fecha_ultimo_pago,
            Field::PrimaNeta => &self.prima_neta,
            Field::Recargo => &self.recargo,
            Field::DerechoPoliza => &self.derecho_poliza,
            Field::Iva => &self.iva,
            Field::PorcentajeIva => &self.porcentaje_iva,
            Field::MontoPrimaAnual => &self.monto_prima_anual,
            Field::Temporalidad => &self.temporalidad,
            Field::DiaCompromisoPago => &self.dia_compromiso_pago,
            Field::Moneda => &self.moneda,
            Field::FormaPago => &self.forma_pago,
            Field::MetodoPago => &self.metodo_pago,
            Field::FormaPagoDerechoPoliza => &self.forma_pago_derecho_poliza,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Nombre => &mut self.nombre,
            Field::ApellidoPaterno => &mut self.apellido_paterno,
            Field::ApellidoMaterno => &mut self.apellido_materno,
            Field::Rfc => &mut self.rfc,
            Field::Genero => &mut self.genero,
            Field::Correo => &mut self.correo,
            Field::Telefono => &mut self.telefono,
            Field::NumeroPoliza => &mut self.numero_poliza,
            Field::Aseguradora => &mut self.aseguradora,
            Field::Ramo => &mut self.ramo,
            Field::SubRamo => &mut self.sub_ramo,
            Field::Producto => &mut self.producto,
            Field::Plan => &mut self.plan,
            Field::InicioVigencia => &mut self.inicio_vigencia,
            Field::FinVigencia => &mut self.fin_vigencia,
            Field::FechaEmision => &mut self.fecha_emision,
            Field::FechaUltimoPago => &mut self.fecha_ultimo_pago,
            Field::PrimaNeta => &mut self.prima_neta,
            Field::Recargo => &mut self.recargo,
            Field::DerechoPoliza => &mut self.derecho_poliza,
            Field::Iva => &mut self.iva,
            Field::PorcentajeIva => &mut self.porcentaje_iva,
            Field::MontoPrimaAnual => &mut self.monto_prima_anual,
            Field::Temporalidad => &mut self.temporalidad,
            Field::DiaCompromisoPago => &mut self.dia_compromiso_pago,
            Field::Moneda => &mut self.moneda,
            Field::FormaPago => &mut self.forma_pago,
            Field::MetodoPago => &mut self.metodo_pago,
            Field::FormaPagoDerechoPoliza => &mut self.forma_pago_derecho_poliza,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    /// Builder form of [`PolicyFields::set`].
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Values in [`Field::ALL`] order.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        Field::ALL.iter().map(move |f| self.get(*f))
    }
}

// =============================================================================
// Policy record
// =============================================================================

/// One imported row: id, the 29 fields, and the validation outcome.
///
/// `id` is the 1-based row position in the uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecord {
    pub id: u32,
    #[serde(flatten)]
    pub fields: PolicyFields,
    pub validation_status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
}

impl PolicyRecord {
    /// Title used by the edit dialog: the policy number, or the id when the
    /// number is missing.
    pub fn display_title(&self) -> String {
        if self.fields.numero_poliza.is_empty() {
            format!("Editar Registro - Póliza {}", self.id)
        } else {
            format!("Editar Registro - Póliza {}", self.fields.numero_poliza)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_to_text() {
        assert_eq!(CellValue::Number(42.0).to_text(), "42");
        assert_eq!(CellValue::Number(1234.5).to_text(), "1234.5");
        assert_eq!(CellValue::Number(-3.0).to_text(), "-3");
        assert_eq!(CellValue::Bool(true).to_text(), "true");
        assert_eq!(CellValue::Empty.to_text(), "");
    }

    #[test]
    fn test_blank_row() {
        let row = RawRow::new().with("Nombre", "  ").with("RFC", CellValue::Empty);
        assert!(row.is_blank());

        let row = RawRow::new().with("Prima", 0.0);
        assert!(!row.is_blank());
    }

    #[test]
    fn test_field_accessors_cover_all_fields() {
        let mut fields = PolicyFields::default();
        for (i, field) in Field::ALL.iter().enumerate() {
            fields.set(*field, format!("v{}", i));
        }
        let values: Vec<&str> = fields.values().collect();
        assert_eq!(values.len(), 29);
        for (i, v) in values.iter().enumerate() {
            assert_eq!(*v, format!("v{}", i));
        }
    }

    #[test]
    fn test_record_json_shape() {
        let record = PolicyRecord {
            id: 3,
            fields: PolicyFields::default()
                .with(Field::Nombre, "Ana")
                .with(Field::NumeroPoliza, "P1"),
            validation_status: ValidationStatus::Warning,
            validation_message: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["nombre"], "Ana");
        assert_eq!(value["numeroPoliza"], "P1");
        assert_eq!(value["formaPagoDerechoPoliza"], "");
        assert_eq!(value["validationStatus"], "warning");
        assert!(value.get("validationMessage").is_none());
    }

    #[test]
    fn test_record_from_partial_json() {
        let value = json!({
            "id": 1,
            "nombre": "Luis",
            "validationStatus": "error",
            "validationMessage": "Faltan campos"
        });
        let record: PolicyRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.fields.nombre, "Luis");
        assert_eq!(record.fields.rfc, "");
        assert_eq!(record.validation_status, ValidationStatus::Error);
    }

    #[test]
    fn test_display_title_falls_back_to_id() {
        let mut record = PolicyRecord {
            id: 9,
            fields: PolicyFields::default(),
            validation_status: ValidationStatus::Error,
            validation_message: None,
        };
        assert!(record.display_title().ends_with("Póliza 9"));
        record.fields.numero_poliza = "AX-77".into();
        assert!(record.display_title().ends_with("Póliza AX-77"));
    }
}
