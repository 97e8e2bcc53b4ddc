//! Medication normalisation.
//!
//! Both medication sources of an authorization record end up as an ordered list of
//! [`CanonicalMedicationEntry`] values, which only live for the duration of one render.

mod normalizer;
mod parser;

pub use normalizer::{normalize_medications, split_free_text};
pub use parser::parse_medication_line;

use authorization::StructuredMedication;
use onkhos_types::NonEmptyText;
use serde::Serialize;

/// Normalised per-drug structure derived from either source format.
///
/// `name` is empty only for display-only entries, which instead carry the original line in
/// `raw_line`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalMedicationEntry {
    pub name: String,
    pub dose: String,
    pub unit: String,
    pub route: String,
    pub administration_days: String,
    pub frequency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_line: Option<String>,
}

impl CanonicalMedicationEntry {
    /// Entry for a line the parser could not structure.
    pub fn display_only(line: impl Into<String>) -> Self {
        Self {
            raw_line: Some(line.into()),
            ..Self::default()
        }
    }

    pub fn is_display_only(&self) -> bool {
        self.raw_line.is_some()
    }

    /// Dose with its unit, as printed (`75mg`).
    pub fn dose_with_unit(&self) -> String {
        format!("{}{}", self.dose, self.unit)
    }
}

impl From<StructuredMedication> for CanonicalMedicationEntry {
    fn from(medication: StructuredMedication) -> Self {
        Self {
            name: medication.name,
            dose: medication.dose,
            unit: medication.unit,
            route: medication.route,
            administration_days: medication.administration_days,
            frequency: medication.frequency,
            notes: medication.notes.map(NonEmptyText::into_inner),
            raw_line: None,
        }
    }
}

/// Medication section content for one record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedMedications {
    /// Protocol the structured list came from; `None` for free text.
    pub protocol_label: Option<NonEmptyText>,
    pub entries: Vec<CanonicalMedicationEntry>,
}
