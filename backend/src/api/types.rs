//! REST API types for the wizard frontend.
//!
//! Records travel in the same camelCase shape they are exported with, so the
//! edit form can send a record back unchanged.

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{FieldSpec, PolicyRecord, Section, FIELD_SPECS};
use crate::session::{LoadedImport, Session, WizardStep};
use crate::transform::pipeline::{ImportOutcome, SourceInfo};
use crate::transform::resolver::ColumnMapping;
use crate::validation::ValidationSummary;

/// Response sent after a successful upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Identifier of this import
    pub import_id: Uuid,

    /// "ready" when every record is valid, "review" otherwise
    pub status: &'static str,

    pub records: Vec<PolicyRecord>,

    pub summary: ValidationSummary,

    pub source: SourceInfo,

    pub mapping: ColumnMapping,
}

impl UploadResponse {
    pub fn new(import_id: Uuid, outcome: ImportOutcome) -> Self {
        let status = if outcome.summary.flagged() == 0 { "ready" } else { "review" };
        Self {
            import_id,
            status,
            records: outcome.records,
            summary: outcome.summary,
            source: outcome.source,
            mapping: outcome.mapping,
        }
    }
}

/// Step description for the stepper.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInfo {
    pub step: WizardStep,
    pub number: u8,
    pub title: &'static str,
    pub description: &'static str,
}

impl From<WizardStep> for StepInfo {
    fn from(step: WizardStep) -> Self {
        Self {
            step,
            number: step.number(),
            title: step.title(),
            description: step.description(),
        }
    }
}

/// Current wizard state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub current: StepInfo,
    pub steps: Vec<StepInfo>,
    pub summary: ValidationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<LoadedImport>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            current: session.step().into(),
            steps: WizardStep::ALL.iter().copied().map(StepInfo::from).collect(),
            summary: session.summary(),
            import: session.loaded().cloned(),
        }
    }
}

/// All records with their counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsResponse {
    pub records: Vec<PolicyRecord>,
    pub summary: ValidationSummary,
}

impl RecordsResponse {
    pub fn new(records: &[PolicyRecord]) -> Self {
        Self {
            records: records.to_vec(),
            summary: ValidationSummary::from_records(records),
        }
    }
}

/// Result of a record edit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    /// False when no record had the given id
    pub updated: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<PolicyRecord>,

    pub summary: ValidationSummary,
}

/// Fields of one edit form section.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionFields {
    pub section: Section,
    pub title: &'static str,
    pub fields: Vec<&'static FieldSpec>,
}

/// The field table, grouped by section in form order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsResponse {
    pub total: usize,
    pub sections: Vec<SectionFields>,
}

impl FieldsResponse {
    pub fn build() -> Self {
        let sections = Section::ALL
            .iter()
            .map(|&section| SectionFields {
                section,
                title: section.title(),
                fields: FIELD_SPECS.iter().filter(|s| s.section == section).collect(),
            })
            .collect();

        Self {
            total: FIELD_SPECS.len(),
            sections,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str, detail: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
        "detail": detail,
    })
}
