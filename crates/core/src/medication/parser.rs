//! Heuristic parser for one free-text prescription line.
//!
//! There is no grammar for clinician-typed prescriptions. The parser looks for a known
//! administration route and a `<number><unit>` dose token, and reads the rest of the line
//! positionally:
//!
//! ```text
//! Cisplatina 75mg EV 1 21 dias
//! └─ name ─┘ dose  │  │ └freq┘
//!                route days
//! ```
//!
//! Anything it cannot structure is kept verbatim as a display-only entry.

use super::CanonicalMedicationEntry;
use crate::constants::{DOSE_UNIT_VOCABULARY, ROUTE_VOCABULARY};
use regex::Regex;
use std::sync::LazyLock;

static DOSE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    let units = DOSE_UNIT_VOCABULARY
        .iter()
        .map(|unit| regex::escape(unit))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"^([0-9]+(?:\.[0-9]+)?)({units})$")).expect("dose pattern is valid")
});

/// Extracts a canonical entry from one prescription line.
///
/// Never fails: lines without a recognised route, without a dose token, or whose name
/// would be empty come back as [`CanonicalMedicationEntry::display_only`] with the line
/// preserved exactly.
pub fn parse_medication_line(line: &str) -> CanonicalMedicationEntry {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let Some(route_idx) = tokens
        .iter()
        .position(|token| ROUTE_VOCABULARY.contains(token))
    else {
        return CanonicalMedicationEntry::display_only(line);
    };

    let Some((dose_idx, dose, unit)) = tokens.iter().enumerate().find_map(|(idx, token)| {
        DOSE_TOKEN
            .captures(token)
            .map(|caps| (idx, caps[1].to_string(), caps[2].to_string()))
    }) else {
        return CanonicalMedicationEntry::display_only(line);
    };

    let name = tokens[..dose_idx].join(" ");
    if name.is_empty() {
        return CanonicalMedicationEntry::display_only(line);
    }

    let rest = &tokens[route_idx + 1..];
    let administration_days = rest.first().map(|t| t.to_string()).unwrap_or_default();
    let frequency = rest.get(1..).map(|t| t.join(" ")).unwrap_or_default();

    CanonicalMedicationEntry {
        name,
        dose,
        unit,
        route: tokens[route_idx].to_string(),
        administration_days,
        frequency,
        notes: None,
        raw_line: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_prescription() {
        let entry = parse_medication_line("Cisplatina 75mg EV 1 21 dias");
        assert_eq!(
            entry,
            CanonicalMedicationEntry {
                name: "Cisplatina".into(),
                dose: "75".into(),
                unit: "mg".into(),
                route: "EV".into(),
                administration_days: "1".into(),
                frequency: "21 dias".into(),
                notes: None,
                raw_line: None,
            }
        );
    }

    #[test]
    fn name_is_every_token_before_the_dose() {
        let entry = parse_medication_line("Acido Folinico Calcico 400mg/m² EV D1 14/14 dias");
        assert_eq!(entry.name, "Acido Folinico Calcico");
        assert_eq!(entry.dose, "400");
        assert_eq!(entry.unit, "mg/m²");
        assert_eq!(entry.administration_days, "D1");
        assert_eq!(entry.frequency, "14/14 dias");
    }

    #[test]
    fn longest_unit_wins_over_prefix() {
        let entry = parse_medication_line("Ciclofosfamida 600mg/kg EV D1");
        assert_eq!(entry.unit, "mg/kg");
        assert_eq!(entry.dose, "600");
    }

    #[test]
    fn decimal_doses_are_accepted() {
        let entry = parse_medication_line("Carboplatina 5.5AUC EV D1 21/21");
        assert_eq!(entry.dose, "5.5");
        assert_eq!(entry.unit, "AUC");
    }

    #[test]
    fn first_dose_candidate_wins() {
        let entry = parse_medication_line("Fluorouracil 400mg EV 2400mg D1 46h");
        assert_eq!(entry.name, "Fluorouracil");
        assert_eq!(entry.dose, "400");
        assert_eq!(entry.unit, "mg");
        assert_eq!(entry.administration_days, "2400mg");
        assert_eq!(entry.frequency, "D1 46h");
    }

    #[test]
    fn single_trailing_token_leaves_frequency_empty() {
        let entry = parse_medication_line("Trastuzumabe 6mg/kg EV D1");
        assert_eq!(entry.administration_days, "D1");
        assert_eq!(entry.frequency, "");
    }

    #[test]
    fn nothing_after_route_leaves_schedule_empty() {
        let entry = parse_medication_line("Cisplatina 75mg EV");
        assert!(!entry.is_display_only());
        assert_eq!(entry.administration_days, "");
        assert_eq!(entry.frequency, "");
    }

    #[test]
    fn missing_route_degrades_to_display_only() {
        let line = "Paclitaxel 175mg/m2 intravenoso";
        let entry = parse_medication_line(line);
        assert!(entry.is_display_only());
        assert_eq!(entry.raw_line.as_deref(), Some(line));
        assert_eq!(entry.name, "");
        assert_eq!(entry.dose, "");
        assert_eq!(entry.route, "");
    }

    #[test]
    fn route_without_dose_degrades_to_display_only() {
        let entry = parse_medication_line("Capecitabina VO 2x ao dia");
        assert!(entry.is_display_only());
        assert_eq!(entry.raw_line.as_deref(), Some("Capecitabina VO 2x ao dia"));
    }

    #[test]
    fn dose_first_line_has_no_name_and_degrades() {
        let entry = parse_medication_line("75mg EV 1");
        assert!(entry.is_display_only());
    }

    #[test]
    fn route_match_is_case_sensitive() {
        assert!(parse_medication_line("Cisplatina 75mg ev 1").is_display_only());
    }

    #[test]
    fn raw_line_is_preserved_exactly() {
        let line = "  Etoposideo  <b>100</b> ";
        let entry = parse_medication_line(line);
        assert_eq!(entry.raw_line.as_deref(), Some(line));
    }
}
