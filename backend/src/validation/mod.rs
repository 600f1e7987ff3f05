//! Row validation for policy records.
//!
//! A two-level cascade, not an accumulation of violations:
//!
//! 1. any mandatory field (`nombre`, `rfc`, `numeroPoliza`) empty → `error`
//! 2. otherwise any recommended field (`correo`, `aseguradora`) empty → `warning`
//! 3. otherwise → `valid`
//!
//! Only the first rule that fires contributes a message.
//!
//! # Example
//!
//! ```rust,ignore
//! use polizas::models::{Field, PolicyFields, ValidationStatus};
//! use polizas::validation::validate;
//!
//! let fields = PolicyFields::default()
//!     .with(Field::Nombre, "Ana")
//!     .with(Field::Rfc, "ABC123")
//!     .with(Field::NumeroPoliza, "P1");
//!
//! let outcome = validate(&fields);
//! assert_eq!(outcome.status, ValidationStatus::Warning);
//! ```

use serde::Serialize;

use crate::models::{PolicyFields, PolicyRecord, ValidationStatus, MANDATORY_FIELDS, RECOMMENDED_FIELDS};

/// Message for rows missing a mandatory field.
pub const MISSING_MANDATORY_MESSAGE: &str = "Faltan campos obligatorios: Nombre, RFC, N° Póliza";

/// Message for rows missing a recommended field.
pub const MISSING_RECOMMENDED_MESSAGE: &str = "Faltan campos recomendados: Correo, Aseguradora";

/// Status and optional message for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub status: ValidationStatus,
    pub message: Option<String>,
}

impl Validation {
    fn valid() -> Self {
        Self {
            status: ValidationStatus::Valid,
            message: None,
        }
    }

    fn flagged(status: ValidationStatus, message: &str) -> Self {
        Self {
            status,
            message: Some(message.to_string()),
        }
    }
}

/// Validate one resolved field set.
pub fn validate(fields: &PolicyFields) -> Validation {
    if MANDATORY_FIELDS.iter().any(|f| fields.get(*f).is_empty()) {
        return Validation::flagged(ValidationStatus::Error, MISSING_MANDATORY_MESSAGE);
    }

    if RECOMMENDED_FIELDS.iter().any(|f| fields.get(*f).is_empty()) {
        return Validation::flagged(ValidationStatus::Warning, MISSING_RECOMMENDED_MESSAGE);
    }

    Validation::valid()
}

/// Counts shown in the summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl ValidationSummary {
    pub fn from_records(records: &[PolicyRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            acc.total += 1;
            match r.validation_status {
                ValidationStatus::Valid => acc.valid += 1,
                ValidationStatus::Warning => acc.warnings += 1,
                ValidationStatus::Error => acc.errors += 1,
            }
            acc
        })
    }

    /// Records that need attention (warnings plus errors).
    pub fn flagged(&self) -> usize {
        self.warnings + self.errors
    }

    /// Share of valid records, 0.0 for an empty set.
    pub fn valid_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.valid as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;

    fn complete() -> PolicyFields {
        PolicyFields::default()
            .with(Field::Nombre, "Ana")
            .with(Field::Rfc, "ABC123")
            .with(Field::NumeroPoliza, "P1")
            .with(Field::Correo, "ana@example.com")
            .with(Field::Aseguradora, "GNP")
    }

    #[test]
    fn test_complete_row_is_valid() {
        let outcome = validate(&complete());
        assert_eq!(outcome.status, ValidationStatus::Valid);
        assert!(outcome.message.is_none());
    }

    #[test]
    fn test_each_mandatory_field_forces_error() {
        for field in MANDATORY_FIELDS {
            let fields = complete().with(field, "");
            let outcome = validate(&fields);
            assert_eq!(outcome.status, ValidationStatus::Error, "{:?}", field);
            assert_eq!(outcome.message.as_deref(), Some(MISSING_MANDATORY_MESSAGE));
        }
    }

    #[test]
    fn test_each_recommended_field_forces_warning() {
        for field in RECOMMENDED_FIELDS {
            let outcome = validate(&complete().with(field, ""));
            assert_eq!(outcome.status, ValidationStatus::Warning, "{:?}", field);
            assert_eq!(outcome.message.as_deref(), Some(MISSING_RECOMMENDED_MESSAGE));
        }
    }

    #[test]
    fn test_error_takes_precedence_over_warning() {
        let fields = PolicyFields::default().with(Field::Nombre, "Ana");
        let outcome = validate(&fields);
        assert_eq!(outcome.status, ValidationStatus::Error);
        assert_eq!(outcome.message.as_deref(), Some(MISSING_MANDATORY_MESSAGE));
    }

    #[test]
    fn test_only_named_fields_matter() {
        // Every other field empty: still valid.
        let outcome = validate(&complete());
        assert_eq!(outcome.status, ValidationStatus::Valid);

        let mut everything = PolicyFields::default();
        for field in Field::ALL {
            everything.set(field, "x");
        }
        let outcome = validate(&everything.with(Field::Rfc, ""));
        assert_eq!(outcome.status, ValidationStatus::Error);
    }

    #[test]
    fn test_summary_counts() {
        let record = |id, status| PolicyRecord {
            id,
            fields: PolicyFields::default(),
            validation_status: status,
            validation_message: None,
        };
        let records = vec![
            record(1, ValidationStatus::Valid),
            record(2, ValidationStatus::Error),
            record(3, ValidationStatus::Warning),
            record(4, ValidationStatus::Valid),
        ];

        let summary = ValidationSummary::from_records(&records);
        assert_eq!(
            summary,
            ValidationSummary { total: 4, valid: 2, warnings: 1, errors: 1 }
        );
        assert_eq!(summary.flagged(), 2);
        assert!((summary.valid_ratio() - 0.5).abs() < f64::EPSILON);
        assert_eq!(ValidationSummary::from_records(&[]).valid_ratio(), 0.0);
    }
}
