use super::{parse_medication_line, CanonicalMedicationEntry, NormalizedMedications};
use authorization::{decode_structured_list, AuthorizationRecord, MedicationSource};
use std::collections::HashSet;

/// Produces the medication section content of a record.
///
/// Structured lists are copied entry by entry. A structured list that cannot be decoded is
/// logged and yields no entries; the rest of the document is unaffected. Free text goes
/// through [`split_free_text`] and the line parser.
pub fn normalize_medications(record: &AuthorizationRecord) -> NormalizedMedications {
    match &record.medications {
        MedicationSource::Structured {
            protocol_name,
            serialized,
        } => {
            let entries = match decode_structured_list(serialized) {
                Ok(list) => list.into_iter().map(CanonicalMedicationEntry::from).collect(),
                Err(err) => {
                    tracing::warn!(
                        record_id = ?record.id,
                        "ignoring structured medication list: {}",
                        err
                    );
                    Vec::new()
                }
            };

            NormalizedMedications {
                protocol_label: protocol_name.clone(),
                entries,
            }
        }
        MedicationSource::FreeText(text) => NormalizedMedications {
            protocol_label: None,
            entries: split_free_text(text)
                .into_iter()
                .map(parse_medication_line)
                .collect(),
        },
    }
}

/// Splits a free-text prescription block into distinct lines.
///
/// Semicolons separate drugs first, then line breaks; lines are trimmed, empty lines
/// dropped and repeated lines kept only at their first occurrence.
pub fn split_free_text(text: &str) -> Vec<&str> {
    let mut seen = HashSet::new();

    text.split(';')
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .collect()
}
