//! Section renderer.
//!
//! Each function returns a self-contained markup fragment. Numbered sections are returned
//! as [`Section`] values and numbered by the composer in emission order; conditional
//! sections return `None` when their field is empty so nothing at all is emitted for them.

use super::format::{escape_html, format_date, with_unit};
use crate::constants::{AWAITING_AUTHORIZATION, NOT_PERFORMED};
use crate::medication::{CanonicalMedicationEntry, NormalizedMedications};
use authorization::AuthorizationRecord;
use onkhos_types::{AuthorizationStatus, NonEmptyText};

/// Inline style of the bounded box around one medication.
const MEDICATION_BOX_STYLE: &str = "border: 2px solid #2c3e50; border-radius: 6px; padding: 8px; \
margin-bottom: 8px; background: #f8f9fa; page-break-inside: avoid; break-inside: avoid;";
const MEDICATION_HEADING_STYLE: &str = "font-weight: 700; color: #2c3e50; font-size: 10px; \
margin-bottom: 6px; padding-bottom: 4px; border-bottom: 1px solid #dee2e6; letter-spacing: 0.5px;";
const MEDICATION_GRID_STYLE: &str =
    "display: grid; grid-template-columns: 1fr 1fr; gap: 6px; font-size: 9px;";
const FIELD_STYLE: &str = "display: flex; flex-direction: column;";
const FIELD_WIDE_STYLE: &str = "display: flex; flex-direction: column; grid-column: 1 / -1;";
const FIELD_LABEL_STYLE: &str = "font-weight: 600; color: #495057; margin-bottom: 2px; \
text-transform: uppercase; font-size: 8px;";
const FIELD_VALUE_STYLE: &str = "background: white; padding: 4px 6px; border: 1px solid #ced4da; \
border-radius: 4px; min-height: 16px; font-weight: 500; white-space: pre-wrap; word-break: break-word;";

/// A numbered document section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub body: String,
}

impl Section {
    /// Renders the section with its number.
    pub fn render(&self, number: usize) -> String {
        format!(
            r#"<div class="section">
  <div class="section-header"><div class="section-title"><div class="section-number">{number}</div>{title}</div></div>
  <div class="section-content">
{body}
  </div>
</div>
"#,
            title = self.title,
            body = self.body,
        )
    }
}

/// Background and text colour of a status badge.
pub fn status_colors(status: AuthorizationStatus) -> (&'static str, &'static str) {
    match status {
        AuthorizationStatus::Pending => ("#fff3cd", "#856404"),
        AuthorizationStatus::Approved => ("#d4edda", "#155724"),
        AuthorizationStatus::Rejected => ("#f8d7da", "#721c24"),
        AuthorizationStatus::UnderReview => ("#d1ecf1", "#0c5460"),
    }
}

/// Coloured status badge with inline styling, usable in the body and in page templates.
pub fn status_badge(status: AuthorizationStatus) -> String {
    let (background, color) = status_colors(status);
    format!(
        r#"<span class="status-badge status-{wire}" style="display: inline-block; padding: 3px 10px; border-radius: 12px; font-size: 9px; font-weight: 700; text-transform: uppercase; letter-spacing: 0.5px; background: {background}; color: {color}; -webkit-print-color-adjust: exact; print-color-adjust: exact;">{label}</span>"#,
        wire = status.as_wire(),
        label = escape_html(status.label()),
    )
}

fn info_item(label: &str, value: &str) -> String {
    format!(
        r#"<div class="info-item"><span class="info-label">{label}</span><span class="info-value">{value}</span></div>"#,
        value = escape_html(value),
    )
}

fn text_item(label: &str, value: &str) -> String {
    format!(
        r#"<div class="info-item"><span class="info-label">{label}</span><div class="text-area-value">{value}</div></div>"#,
        value = escape_html(value),
    )
}

fn grid(class: &str, items: &[String]) -> String {
    format!(r#"<div class="{class}">{}</div>"#, items.join(""))
}

fn or_not_performed(value: &Option<NonEmptyText>) -> &str {
    value.as_ref().map_or(NOT_PERFORMED, NonEmptyText::as_str)
}

fn medication_field(label: &str, value: &str, wide: bool) -> String {
    format!(
        r#"<div style="{style}"><span style="{FIELD_LABEL_STYLE}">{label}:</span><div style="{FIELD_VALUE_STYLE}">{value}</div></div>"#,
        style = if wide { FIELD_WIDE_STYLE } else { FIELD_STYLE },
        value = escape_html(value),
    )
}

/// Renders one medication into its own non-splittable block.
///
/// `index` is zero-based; the heading shows `MEDICAMENTO {index + 1}`.
pub fn medication_block(index: usize, entry: &CanonicalMedicationEntry) -> String {
    let content = match entry.raw_line.as_deref() {
        Some(raw) => medication_field("Prescrição Completa", raw, true),
        None => {
            let mut fields = vec![
                medication_field("Nome do Medicamento", &entry.name, false),
                medication_field("Dose", &entry.dose_with_unit(), false),
                medication_field("Via de Administração", &entry.route, false),
                medication_field("Dias de Administração", &entry.administration_days, false),
                medication_field("Frequência", &entry.frequency, false),
            ];
            if let Some(notes) = entry.notes.as_deref() {
                fields.push(medication_field("Observações", notes, true));
            }
            format!(r#"<div style="{MEDICATION_GRID_STYLE}">{}</div>"#, fields.join(""))
        }
    };

    format!(
        r#"<div class="medication-dedicated-space" style="{MEDICATION_BOX_STYLE}"><div style="{MEDICATION_HEADING_STYLE}">MEDICAMENTO {number}</div>{content}</div>"#,
        number = index + 1,
    )
}

pub fn identity_section(record: &AuthorizationRecord) -> Section {
    let patient = &record.patient;
    let first = grid(
        "info-grid",
        &[
            info_item("Instituição Solicitante", &record.institution.name),
            info_item("Código da Instituição", &record.institution.code),
            info_item("Nome Completo do Paciente", &patient.name),
            info_item("Registro do Paciente", &patient.registry_code),
        ],
    );
    let second = grid(
        "info-grid-4",
        &[
            info_item("Sexo", patient.sex.map_or("", |sex| sex.label())),
            info_item("Data de Nascimento", &format_date(&patient.birth_date)),
            info_item("Idade", &with_unit(&patient.age, "anos")),
            info_item("Data da Solicitação", &format_date(&record.request_date)),
        ],
    );

    Section {
        title: "Identificação da Instituição e Paciente",
        body: format!("{first}\n{second}"),
    }
}

pub fn diagnosis_section(record: &AuthorizationRecord) -> Section {
    let diagnosis = &record.diagnosis;
    let staging = &diagnosis.staging;

    let coding = grid(
        "info-grid",
        &[
            info_item("Classificação CID-10", &diagnosis.cid_code),
            info_item("Descrição do Diagnóstico", &diagnosis.description),
        ],
    );
    let metastasis = diagnosis
        .metastasis_sites
        .as_ref()
        .map(|sites| text_item("Localização de Metástases", sites.as_str()))
        .unwrap_or_default();
    let tnm = grid(
        "staging-grid",
        &[
            info_item("Tumor (T)", &staging.tumor),
            info_item("Linfonodos (N)", &staging.nodes),
            info_item("Metástase (M)", &staging.metastasis),
            info_item("Estágio Clínico", &staging.clinical_stage),
        ],
    );

    Section {
        title: "Diagnóstico Oncológico e Estadiamento TNM",
        body: format!("{coding}\n{metastasis}<div class=\"highlight-clinical\">{tnm}</div>"),
    }
}

pub fn prior_treatment_section(record: &AuthorizationRecord) -> Section {
    let prior = &record.prior_treatment;
    Section {
        title: "Histórico de Tratamentos Oncológicos Prévios",
        body: grid(
            "treatment-grid",
            &[
                text_item(
                    "Cirurgia/Radioterapia",
                    or_not_performed(&prior.surgery_or_radiotherapy),
                ),
                text_item(
                    "Quimioterapia Adjuvante",
                    or_not_performed(&prior.adjuvant_chemotherapy),
                ),
                text_item(
                    "Quimioterapia 1ª Linha",
                    or_not_performed(&prior.first_line_chemotherapy),
                ),
                text_item(
                    "Quimioterapia ≥2ª Linha",
                    or_not_performed(&prior.later_line_chemotherapy),
                ),
            ],
        ),
    }
}

pub fn protocol_section(record: &AuthorizationRecord) -> Section {
    let protocol = &record.protocol;
    let intent = grid(
        "info-grid",
        &[
            info_item("Finalidade Terapêutica", &protocol.intent),
            info_item("Performance Status (ECOG)", &protocol.performance_status),
        ],
    );
    let cycles = grid(
        "info-grid-4",
        &[
            info_item("Protocolo/Sigla", &protocol.acronym),
            info_item("Ciclos Previstos", &protocol.planned_cycles),
            info_item("Ciclo Atual", &protocol.current_cycle),
            info_item("Superfície Corporal", &with_unit(&protocol.body_surface_area, "m²")),
        ],
    );
    let anthropometrics = grid(
        "info-grid",
        &[
            info_item("Peso Corporal", &with_unit(&protocol.weight, "kg")),
            info_item("Altura", &with_unit(&protocol.height, "cm")),
        ],
    );

    Section {
        title: "Protocolo Quimioterápico Proposto",
        body: format!("{intent}\n{cycles}\n{anthropometrics}"),
    }
}

pub fn prescription_section(
    record: &AuthorizationRecord,
    medications: &NormalizedMedications,
) -> Section {
    let label = medications
        .protocol_label
        .as_ref()
        .map(|name| {
            format!(
                r#"<span class="info-label">Protocolo: {}</span>"#,
                escape_html(name.as_str())
            )
        })
        .unwrap_or_default();
    let blocks = medications
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| medication_block(index, entry))
        .collect::<Vec<_>>()
        .join("\n");
    let dosing = &record.dosing;
    let dose_grid = grid(
        "info-grid-3",
        &[
            info_item("Dosagem por m²", &dosing.dose_per_m2),
            info_item("Dose Total Calculada", &dosing.total_dose),
            info_item("Via de Administração", &dosing.route),
        ],
    );
    let schedule = info_item("Esquema Posológico (Dias e Intervalos)", &dosing.schedule);

    Section {
        title: "Prescrição de Agentes Antineoplásicos",
        body: format!(
            r#"<div class="medication-section">
<div class="medication-title">Medicamentos Antineoplásicos Prescritos</div>
<div class="medication-list">{label}
{blocks}
</div>
{dose_grid}
{schedule}
</div>"#
        ),
    }
}

pub fn coadjuvant_section(record: &AuthorizationRecord) -> Option<Section> {
    record.coadjuvant_medications.as_ref().map(|text| Section {
        title: "Medicações Coadjuvantes e Suporte",
        body: format!(
            r#"<div class="text-area-value">{}</div>"#,
            escape_html(text.as_str())
        ),
    })
}

pub fn clinical_notes_section(record: &AuthorizationRecord) -> Option<Section> {
    record.clinical_notes.as_ref().map(|text| Section {
        title: "Observações Clínicas Adicionais",
        body: format!(
            r#"<div class="text-area-value">{}</div>"#,
            escape_html(text.as_str())
        ),
    })
}

/// Physician responsibility and authorization block, closing the document.
pub fn signature_section(record: &AuthorizationRecord) -> String {
    let approved = record.status.is_approved();
    let number = record
        .authorization_number
        .as_ref()
        .map_or(AWAITING_AUTHORIZATION, NonEmptyText::as_str);
    let box_class = if approved {
        "authorization-box authorization-approved"
    } else {
        "authorization-box"
    };
    let approval_note = if approved {
        r#"<div class="clinical-note approval-indicator">✓ AUTORIZAÇÃO MÉDICA APROVADA<br><small>Documento válido para execução do protocolo prescrito</small></div>"#
    } else {
        ""
    };

    format!(
        r#"<div class="signature-section">
  <div class="signature-title">Responsabilidade Médica e Autorização</div>
  <div class="signature-grid">
    <div>
      {physician}
      <div class="signature-box"><div class="signature-label">Assinatura e Carimbo do Médico Responsável</div></div>
    </div>
    <div>
      <div class="info-item"><span class="info-label">Situação da Solicitação</span>{badge}</div>
      <div class="info-item"><span class="info-label">Número da Autorização</span><div class="{box_class}">{number}</div></div>
      {approval_note}
    </div>
  </div>
</div>
"#,
        physician = info_item("Médico Oncologista Responsável", &record.signing_physician),
        badge = status_badge(record.status),
        number = escape_html(number),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use authorization::MedicationSource;

    #[test]
    fn structured_medication_block_keeps_route_and_dose_together() {
        let entry = CanonicalMedicationEntry {
            name: "Cisplatina".into(),
            dose: "75".into(),
            unit: "mg".into(),
            route: "EV".into(),
            administration_days: "1".into(),
            frequency: "21 dias".into(),
            notes: None,
            raw_line: None,
        };
        let block = medication_block(0, &entry);

        assert!(block.contains("MEDICAMENTO 1"));
        assert!(block.contains("page-break-inside: avoid"));
        assert!(block.contains(">75mg<"));
        assert!(block.contains(">EV<"));
        assert!(!block.contains("Observações"));
        assert!(!block.contains("Prescrição Completa"));
    }

    #[test]
    fn display_only_block_shows_complete_prescription() {
        let block = medication_block(2, &CanonicalMedicationEntry::display_only("Paclitaxel"));
        assert!(block.contains("MEDICAMENTO 3"));
        assert!(block.contains("Prescrição Completa"));
        assert!(block.contains(">Paclitaxel<"));
        assert!(!block.contains("Nome do Medicamento"));
    }

    #[test]
    fn notes_are_rendered_when_present() {
        let entry = CanonicalMedicationEntry {
            name: "Oxaliplatina".into(),
            notes: Some("infundir em 2h".into()),
            ..CanonicalMedicationEntry::default()
        };
        assert!(medication_block(0, &entry).contains("infundir em 2h"));
    }

    #[test]
    fn medication_text_is_escaped() {
        let block = medication_block(0, &CanonicalMedicationEntry::display_only("<img src=x>"));
        assert!(block.contains("&lt;img src=x&gt;"));
        assert!(!block.contains("<img src=x>"));
    }

    #[test]
    fn every_status_has_distinct_colors() {
        let statuses = [
            AuthorizationStatus::Pending,
            AuthorizationStatus::Approved,
            AuthorizationStatus::Rejected,
            AuthorizationStatus::UnderReview,
        ];
        let colors: std::collections::HashSet<_> =
            statuses.iter().map(|s| status_colors(*s)).collect();
        assert_eq!(colors.len(), statuses.len());
        assert!(status_badge(AuthorizationStatus::UnderReview).contains("Em Análise"));
    }

    #[test]
    fn prior_treatments_default_to_not_performed() {
        let section = prior_treatment_section(&AuthorizationRecord::default());
        assert_eq!(section.body.matches(NOT_PERFORMED).count(), 4);
    }

    #[test]
    fn metastasis_block_only_when_present() {
        let mut record = AuthorizationRecord::default();
        assert!(!diagnosis_section(&record).body.contains("Localização de Metástases"));

        record.diagnosis.metastasis_sites = NonEmptyText::from_optional(Some("Fígado, ossos"));
        assert!(diagnosis_section(&record).body.contains("Fígado, ossos"));
    }

    #[test]
    fn conditional_sections_absent_for_empty_fields() {
        let record = AuthorizationRecord::default();
        assert!(coadjuvant_section(&record).is_none());
        assert!(clinical_notes_section(&record).is_none());
    }

    #[test]
    fn signature_shows_pending_placeholder() {
        let signature = signature_section(&AuthorizationRecord::default());
        assert!(signature.contains(AWAITING_AUTHORIZATION));
        assert!(!signature.contains("AUTORIZAÇÃO MÉDICA APROVADA"));
    }

    #[test]
    fn prescription_section_labels_structured_protocol() {
        let record = AuthorizationRecord {
            medications: MedicationSource::FreeText(String::new()),
            ..AuthorizationRecord::default()
        };
        let medications = NormalizedMedications {
            protocol_label: NonEmptyText::from_optional(Some("FOLFOX <6>")),
            entries: vec![CanonicalMedicationEntry::display_only("Oxaliplatina")],
        };
        let section = prescription_section(&record, &medications);
        assert!(section.body.contains("Protocolo: FOLFOX &lt;6&gt;"));
        assert!(section.body.contains("MEDICAMENTO 1"));
    }
}
