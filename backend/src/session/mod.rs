//! Wizard session: the current step and the owned record collection.
//!
//! The collection is an immutable snapshot (`Arc<[PolicyRecord]>`). Every
//! write builds a new snapshot and swaps it in, so a reader holding the old
//! one (a summary view, an export in progress) keeps a consistent picture.
//!
//! ```text
//! Upload ──import──▶ Validate ──edit──▶ Correct ──export──▶ Confirm
//!   ▲                                                         │
//!   └──────────────────────── restart ◀───────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::PolicyRecord;
use crate::transform::pipeline::{ImportOutcome, SourceInfo};
use crate::transform::resolver::ColumnMapping;
use crate::validation::ValidationSummary;

/// The four wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Upload,
    Validate,
    Correct,
    Confirm,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Upload,
        WizardStep::Validate,
        WizardStep::Correct,
        WizardStep::Confirm,
    ];

    /// 1-based position shown by the stepper.
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Upload => 1,
            WizardStep::Validate => 2,
            WizardStep::Correct => 3,
            WizardStep::Confirm => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Upload => "Cargar archivo",
            WizardStep::Validate => "Validar datos",
            WizardStep::Correct => "Corregir errores",
            WizardStep::Confirm => "Confirmar",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WizardStep::Upload => "Excel con datos",
            WizardStep::Validate => "Revisar registros",
            WizardStep::Correct => "Editar si necesario",
            WizardStep::Confirm => "Descargar resultados",
        }
    }
}

/// Replace the record whose id matches `updated.id` with `updated`.
///
/// The record is stored as given; it is not validated again. Unknown ids
/// return the collection unchanged.
pub fn update_record(records: &[PolicyRecord], updated: &PolicyRecord) -> Vec<PolicyRecord> {
    records
        .iter()
        .map(|r| if r.id == updated.id { updated.clone() } else { r.clone() })
        .collect()
}

/// Details of the currently loaded import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedImport {
    pub import_id: Uuid,
    pub imported_at: DateTime<Utc>,
    pub source: SourceInfo,
    pub mapping: ColumnMapping,
}

/// Wizard state owned by one user session.
#[derive(Debug, Clone)]
pub struct Session {
    step: WizardStep,
    records: Arc<[PolicyRecord]>,
    loaded: Option<LoadedImport>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Upload,
            records: Arc::from(Vec::new()),
            loaded: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Snapshot of the current records.
    pub fn records(&self) -> Arc<[PolicyRecord]> {
        Arc::clone(&self.records)
    }

    pub fn record(&self, id: u32) -> Option<&PolicyRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn loaded(&self) -> Option<&LoadedImport> {
        self.loaded.as_ref()
    }

    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary::from_records(&self.records)
    }

    /// Replace the collection with a fresh import and move to validation.
    pub fn install(&mut self, outcome: ImportOutcome) -> Uuid {
        let import_id = Uuid::new_v4();
        self.records = Arc::from(outcome.records);
        self.loaded = Some(LoadedImport {
            import_id,
            imported_at: Utc::now(),
            source: outcome.source,
            mapping: outcome.mapping,
        });
        self.step = WizardStep::Validate;
        import_id
    }

    /// Store an edited record. Returns false when no record has that id.
    pub fn update(&mut self, updated: PolicyRecord) -> bool {
        if self.record(updated.id).is_none() {
            return false;
        }
        self.records = Arc::from(update_record(&self.records, &updated));
        self.step = WizardStep::Correct;
        true
    }

    /// Note that results were downloaded.
    pub fn mark_exported(&mut self) {
        if !self.records.is_empty() {
            self.step = WizardStep::Confirm;
        }
    }

    /// Back to the upload step. Records stay until the next import.
    pub fn restart(&mut self) {
        self.step = WizardStep::Upload;
    }
}
