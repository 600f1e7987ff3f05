//! The fixed table of policy fields and the header aliases accepted for each.
//!
//! Alias order is a priority: the resolver tries aliases front to back and
//! stops at the first one present in the row. Matching is case- and
//! surrounding-whitespace-insensitive, so aliases only list spelling
//! variants (accents, abbreviations), never case variants.

use serde::{Deserialize, Serialize};

/// Group a field belongs to in the edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Personal,
    Policy,
    Dates,
    Financial,
    Other,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Personal,
        Section::Policy,
        Section::Dates,
        Section::Financial,
        Section::Other,
    ];

    /// Heading shown above the section.
    pub fn title(&self) -> &'static str {
        match self {
            Section::Personal => "Datos Personales",
            Section::Policy => "Datos de la Póliza",
            Section::Dates => "Fechas",
            Section::Financial => "Datos Financieros",
            Section::Other => "Otros Datos",
        }
    }
}

/// One of the 29 business fields of a policy record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    // Personal
    Nombre,
    ApellidoPaterno,
    ApellidoMaterno,
    Rfc,
    Genero,
    Correo,
    Telefono,
    // Policy
    NumeroPoliza,
    Aseguradora,
    Ramo,
    SubRamo,
    Producto,
    Plan,
    // Dates
    InicioVigencia,
    FinVigencia,
    FechaEmision,
    FechaUltimoPago,
    // Financial
    PrimaNeta,
    Recargo,
    DerechoPoliza,
    Iva,
    PorcentajeIva,
    MontoPrimaAnual,
    // Other
    Temporalidad,
    DiaCompromisoPago,
    Moneda,
    FormaPago,
    MetodoPago,
    FormaPagoDerechoPoliza,
}

impl Field {
    /// All fields in export column order.
    pub const ALL: [Field; 29] = [
        Field::Nombre,
        Field::ApellidoPaterno,
        Field::ApellidoMaterno,
        Field::Rfc,
        Field::Genero,
        Field::Correo,
        Field::Telefono,
        Field::NumeroPoliza,
        Field::Aseguradora,
        Field::Ramo,
        Field::SubRamo,
        Field::Producto,
        Field::Plan,
        Field::InicioVigencia,
        Field::FinVigencia,
        Field::FechaEmision,
        Field::FechaUltimoPago,
        Field::PrimaNeta,
        Field::Recargo,
        Field::DerechoPoliza,
        Field::Iva,
        Field::PorcentajeIva,
        Field::MontoPrimaAnual,
        Field::Temporalidad,
        Field::DiaCompromisoPago,
        Field::Moneda,
        Field::FormaPago,
        Field::MetodoPago,
        Field::FormaPagoDerechoPoliza,
    ];

    /// camelCase key used in JSON and as export column header.
    pub fn key(&self) -> &'static str {
        self.spec().key
    }

    /// Human label used by the edit form.
    pub fn label(&self) -> &'static str {
        self.spec().label
    }

    pub fn section(&self) -> Section {
        self.spec().section
    }

    /// Ordered header aliases for this field.
    pub fn aliases(&self) -> &'static [&'static str] {
        self.spec().aliases
    }

    /// Table entry for this field.
    pub fn spec(&self) -> &'static FieldSpec {
        // FIELD_SPECS is laid out in the same order as `Field::ALL`.
        &FIELD_SPECS[*self as usize]
    }

    /// Look up a field by its camelCase key.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }
}

/// A target field with its accepted header aliases.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub field: Field,
    pub key: &'static str,
    pub label: &'static str,
    pub section: Section,
    pub aliases: &'static [&'static str],
}

/// Fields whose absence makes a row an `error`.
pub const MANDATORY_FIELDS: [Field; 3] = [Field::Nombre, Field::Rfc, Field::NumeroPoliza];

/// Fields whose absence makes an otherwise complete row a `warning`.
pub const RECOMMENDED_FIELDS: [Field; 2] = [Field::Correo, Field::Aseguradora];

macro_rules! spec {
    ($field:ident, $key:literal, $label:literal, $section:ident, [$($alias:literal),+ $(,)?]) => {
        FieldSpec {
            field: Field::$field,
            key: $key,
            label: $label,
            section: Section::$section,
            aliases: &[$($alias),+, $key],
        }
    };
}

/// The field table. Every alias list ends with the field's own key so an
/// exported workbook can be imported again as-is.
pub static FIELD_SPECS: [FieldSpec; 29] = [
    spec!(Nombre, "nombre", "Nombre", Personal,
        ["Nombre", "Nombres", "Nombre(s)", "Nombre del Asegurado", "Nombre Cliente", "Cliente"]),
    spec!(ApellidoPaterno, "apellidoPaterno", "Apellido Paterno", Personal,
        ["Apellido Paterno", "Ap. Paterno", "Ap Paterno", "Primer Apellido"]),
    spec!(ApellidoMaterno, "apellidoMaterno", "Apellido Materno", Personal,
        ["Apellido Materno", "Ap. Materno", "Ap Materno", "Segundo Apellido"]),
    spec!(Rfc, "rfc", "RFC", Personal,
        ["RFC", "R.F.C.", "RFC Cliente"]),
    spec!(Genero, "genero", "Género", Personal,
        ["Género", "Genero", "Sexo"]),
    spec!(Correo, "correo", "Correo", Personal,
        ["Correo", "Correo Electrónico", "Correo Electronico", "Email", "E-mail", "Mail"]),
    spec!(Telefono, "telefono", "Teléfono", Personal,
        ["Teléfono", "Telefono", "Tel", "Tel.", "Celular", "Móvil", "Movil"]),
    spec!(NumeroPoliza, "numeroPoliza", "N° de Póliza", Policy,
        ["N° de Póliza", "N° Póliza", "No. de Póliza", "No. Póliza", "Número de Póliza",
         "Numero de Poliza", "Núm. Póliza", "Num. Poliza", "Póliza", "Poliza"]),
    spec!(Aseguradora, "aseguradora", "Aseguradora", Policy,
        ["Aseguradora", "Compañía", "Compania", "Compañía Aseguradora", "Insurer"]),
    spec!(Ramo, "ramo", "Ramo", Policy,
        ["Ramo"]),
    spec!(SubRamo, "subRamo", "Sub-Ramo", Policy,
        ["Sub-Ramo", "Sub Ramo", "Subramo"]),
    spec!(Producto, "producto", "Producto", Policy,
        ["Producto"]),
    spec!(Plan, "plan", "Plan", Policy,
        ["Plan"]),
    spec!(InicioVigencia, "inicioVigencia", "Inicio Vigencia", Dates,
        ["Inicio Vigencia", "Inicio de Vigencia", "Fecha Inicio Vigencia", "Vigencia Desde"]),
    spec!(FinVigencia, "finVigencia", "Fin Vigencia", Dates,
        ["Fin Vigencia", "Fin de Vigencia", "Fecha Fin Vigencia", "Vigencia Hasta"]),
    spec!(FechaEmision, "fechaEmision", "Fecha Emisión", Dates,
        ["Fecha Emisión", "Fecha de Emisión", "Fecha Emision", "Fecha de Emision", "Emisión"]),
    spec!(FechaUltimoPago, "fechaUltimoPago", "Fecha Último Pago", Dates,
        ["Fecha Último Pago", "Fecha de Último Pago", "Fecha Ultimo Pago", "Último Pago", "Ultimo Pago"]),
    spec!(PrimaNeta, "primaNeta", "Prima Neta Anual", Financial,
        ["Prima Neta Anual", "Prima Neta"]),
    spec!(Recargo, "recargo", "Recargo", Financial,
        ["Recargo", "Recargos", "Recargo Fraccionado"]),
    spec!(DerechoPoliza, "derechoPoliza", "Derecho de Póliza", Financial,
        ["Derecho de Póliza", "Derecho de Poliza", "Derecho Póliza", "Derechos de Póliza"]),
    spec!(Iva, "iva", "IVA", Financial,
        ["IVA", "I.V.A."]),
    spec!(PorcentajeIva, "porcentajeIva", "% IVA", Financial,
        ["% IVA", "%IVA", "Porcentaje IVA", "Porcentaje de IVA", "Tasa IVA"]),
    spec!(MontoPrimaAnual, "montoPrimaAnual", "Monto Prima Anual", Financial,
        ["Monto Prima Anual", "Prima Total Anual", "Prima Total", "Monto"]),
    spec!(Temporalidad, "temporalidad", "Temporalidad", Other,
        ["Temporalidad", "Periodicidad"]),
    spec!(DiaCompromisoPago, "diaCompromisoPago", "Día Compromiso de Pago", Other,
        ["Día Compromiso de Pago", "Dia Compromiso de Pago", "Día de Pago", "Dia de Pago"]),
    spec!(Moneda, "moneda", "Moneda", Other,
        ["Moneda", "Divisa"]),
    spec!(FormaPago, "formaPago", "Forma de Pago", Other,
        ["Forma de Pago", "Forma Pago"]),
    spec!(MetodoPago, "metodoPago", "Método de Pago", Other,
        ["Método de Pago", "Metodo de Pago", "Método Pago", "Metodo Pago"]),
    spec!(FormaPagoDerechoPoliza, "formaPagoDerechoPoliza", "Forma de Pago Derecho de Póliza", Other,
        ["Forma de Pago Derecho de Póliza", "Forma de Pago Derecho de Poliza", "Forma Pago Derecho Póliza"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_matches_field_order() {
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(FIELD_SPECS[i].field, *field, "entry {} out of order", i);
            assert_eq!(field.spec().field, *field);
        }
    }

    #[test]
    fn test_aliases_non_empty_and_end_with_key() {
        for spec in FIELD_SPECS.iter() {
            assert!(!spec.aliases.is_empty());
            assert_eq!(spec.aliases.last(), Some(&spec.key));
            assert!(spec.aliases.iter().all(|a| !a.trim().is_empty()));
        }
    }

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<_> = FIELD_SPECS.iter().map(|s| s.key).collect();
        assert_eq!(keys.len(), 29);
    }

    #[test]
    fn test_no_alias_shared_between_fields() {
        let mut seen: HashSet<String> = HashSet::new();
        for spec in FIELD_SPECS.iter() {
            let own: HashSet<String> = spec.aliases.iter().map(|a| a.trim().to_lowercase()).collect();
            for alias in own {
                assert!(seen.insert(alias.clone()), "alias '{}' used twice", alias);
            }
        }
    }

    #[test]
    fn test_key_serialization_matches_table() {
        for field in Field::ALL {
            let json = serde_json::to_value(field).unwrap();
            assert_eq!(json, field.key());
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
    }

    #[test]
    fn test_section_sizes() {
        let count = |s: Section| Field::ALL.iter().filter(|f| f.section() == s).count();
        assert_eq!(count(Section::Personal), 7);
        assert_eq!(count(Section::Policy), 6);
        assert_eq!(count(Section::Dates), 4);
        assert_eq!(count(Section::Financial), 6);
        assert_eq!(count(Section::Other), 6);
    }
}
