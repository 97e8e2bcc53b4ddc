//! Medication source of an authorization record.
//!
//! A request carries its antineoplastic prescription in one of two shapes:
//! - a structured list picked from the protocol catalogue, stored as a JSON string
//! - a single free-text field typed by the clinician
//!
//! [`MedicationSource`] makes the choice explicit. The structured list wins whenever it is
//! present; an empty structured list is treated as absent.

use crate::flexible;
use crate::{path_and_message, AuthorizationError, AuthorizationResult};
use onkhos_types::NonEmptyText;
use serde::de::IgnoredAny;
use serde::Deserialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Authoritative medication source of one authorization record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MedicationSource {
    /// Serialised list of catalogue medications, with the protocol it came from.
    Structured {
        protocol_name: Option<NonEmptyText>,
        serialized: String,
    },
    /// Clinician-entered prescription text, possibly empty.
    FreeText(String),
}

impl Default for MedicationSource {
    fn default() -> Self {
        MedicationSource::FreeText(String::new())
    }
}

impl MedicationSource {
    /// Applies the precedence rule between the two wire columns.
    ///
    /// The structured column is authoritative when it is non-blank and is not a
    /// well-formed empty array. Undecodable structured data still counts as present.
    pub fn from_columns(
        structured: Option<String>,
        protocol_name: Option<String>,
        free_text: Option<String>,
    ) -> Self {
        match structured {
            Some(serialized) if !is_absent_list(&serialized) => MedicationSource::Structured {
                protocol_name: NonEmptyText::from_optional(protocol_name),
                serialized,
            },
            _ => MedicationSource::FreeText(free_text.unwrap_or_default()),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, MedicationSource::Structured { .. })
    }
}

fn is_absent_list(serialized: &str) -> bool {
    if serialized.trim().is_empty() {
        return true;
    }
    matches!(
        serde_json::from_str::<Vec<IgnoredAny>>(serialized),
        Ok(items) if items.is_empty()
    )
}

/// One medication of a structured protocol list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructuredMedication {
    pub name: String,
    pub dose: String,
    pub unit: String,
    pub route: String,
    pub administration_days: String,
    pub frequency: String,
    pub notes: Option<NonEmptyText>,
}

// ============================================================================
// Wire model
// ============================================================================

#[derive(Deserialize)]
struct StructuredMedicationWire {
    #[serde(default, deserialize_with = "flexible::text")]
    nome: String,
    #[serde(default, deserialize_with = "flexible::text")]
    dose: String,
    #[serde(default, deserialize_with = "flexible::text")]
    unidade_medida: String,
    #[serde(default, deserialize_with = "flexible::text")]
    via_adm: String,
    #[serde(default, deserialize_with = "flexible::text")]
    dias_adm: String,
    #[serde(default, deserialize_with = "flexible::text")]
    frequencia: String,
    #[serde(default, deserialize_with = "flexible::optional_text")]
    observacoes: Option<String>,
}

impl From<StructuredMedicationWire> for StructuredMedication {
    fn from(wire: StructuredMedicationWire) -> Self {
        Self {
            name: wire.nome,
            dose: wire.dose,
            unit: wire.unidade_medida,
            route: wire.via_adm,
            administration_days: wire.dias_adm,
            frequency: wire.frequencia,
            notes: NonEmptyText::from_optional(wire.observacoes),
        }
    }
}

/// Decodes the serialised structured list, preserving list order.
///
/// # Errors
///
/// Returns [`AuthorizationError::MedicationSchema`] naming the failing path when the text
/// is not a JSON array of medication objects.
pub fn decode_structured_list(serialized: &str) -> AuthorizationResult<Vec<StructuredMedication>> {
    let mut deserializer = serde_json::Deserializer::from_str(serialized);
    let wire: Vec<StructuredMedicationWire> =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
            let (path, message) = path_and_message(err);
            AuthorizationError::MedicationSchema { path, message }
        })?;

    Ok(wire.into_iter().map(StructuredMedication::from).collect())
}
